mod lrclib;

use std::sync::Arc;

use crate::config::LookupConfig;
use crate::lyrics::LyricsProvider;
use tracing::info;

pub use lrclib::LrclibProvider;

/// 创建歌词提供者
pub fn build_provider(config: &LookupConfig) -> Arc<dyn LyricsProvider> {
    let provider: Arc<dyn LyricsProvider> = Arc::new(LrclibProvider::new(config.clone()));
    info!("启用歌词源 {}: {}", provider.name(), config.base_url);
    provider
}
