use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use tracing::{debug, info};

use crate::config::LookupConfig;
use crate::lyrics::{first_synced, LookupQuery, LookupResult, LyricsProvider};

/// LRCLIB 歌词提供者
pub struct LrclibProvider {
    client: reqwest::Client,
    config: LookupConfig,
}

impl LrclibProvider {
    pub fn new(config: LookupConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn search_url(&self) -> String {
        format!("{}/api/search", self.config.base_url.trim_end_matches('/'))
    }

    /// 搜索歌曲，非 2xx 响应当作没有结果
    async fn search(&self, query: &LookupQuery) -> Result<Vec<LookupResult>> {
        debug!(
            "LRCLIB 搜索: '{}' - '{}'",
            query.track_name, query.artist_name
        );

        let resp = self
            .client
            .get(self.search_url())
            .query(&query.params())
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            debug!("LRCLIB 搜索返回 HTTP {}，视为未找到", status);
            return Ok(Vec::new());
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl LyricsProvider for LrclibProvider {
    fn name(&self) -> &'static str {
        "lrclib"
    }

    async fn search_synced(&self, query: &LookupQuery) -> Result<Option<LookupResult>> {
        if query.track_name.trim().is_empty() {
            debug!("歌曲标题为空，跳过 LRCLIB 搜索");
            return Ok(None);
        }

        let results = self.search(query).await?;
        debug!("LRCLIB 搜索结果数量: {}", results.len());

        let best = first_synced(results);
        if let Some(result) = &best {
            info!(
                "LRCLIB 匹配: {} - {} (ID: {})",
                result.artist_name, result.track_name, result.id
            );
        }
        Ok(best)
    }
}
