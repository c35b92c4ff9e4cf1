use std::time::Duration;

use tracing::info;

use super::RunTally;
use crate::config::ScanConfig;

/// 进度输出和限速
#[derive(Debug, Clone)]
pub struct Pacing {
    /// 每处理多少首输出一次进度，0 表示不输出
    pub progress_every: usize,
    /// 每处理多少首暂停一次，0 表示不暂停
    pub throttle_every: usize,
    pub throttle_delay: Duration,
}

impl Pacing {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            progress_every: config.progress_every,
            throttle_every: config.throttle_every,
            throttle_delay: Duration::from_millis(config.throttle_delay_ms),
        }
    }

    /// 每处理完一首歌调用一次
    pub async fn after_item(&self, processed: usize, total: usize, tally: &RunTally) {
        if self.progress_every > 0 && processed % self.progress_every == 0 {
            info!("进度: {}/{} 首歌曲已处理", processed, total);
            info!(
                "   • 下载: {}, 删除: {}, 保留: {}",
                tally.downloaded, tally.deleted, tally.skipped
            );
        }

        if self.throttle_every > 0
            && processed % self.throttle_every == 0
            && !self.throttle_delay.is_zero()
        {
            tokio::time::sleep(self.throttle_delay).await;
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

/// 一个媒体库的最终报告
pub fn library_report(library_name: &str, tally: &RunTally) -> String {
    format!("📈 媒体库 \"{}\" 汇总:\n{}", library_name, tally)
}
