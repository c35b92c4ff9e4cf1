pub mod providers;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::jellyfin::LibraryItem;

/// 一次歌词查询的条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    /// 歌曲标题
    pub track_name: String,
    /// 艺术家，取第一个艺术家，没有时退回专辑艺术家
    pub artist_name: String,
    /// 专辑，空时不发送
    pub album_name: Option<String>,
    /// 时长（秒）
    pub duration_secs: Option<u64>,
}

impl LookupQuery {
    pub fn from_item(item: &LibraryItem) -> Self {
        let artist_name = item
            .artists
            .first()
            .filter(|a| !a.is_empty())
            .or(item.album_artist.as_ref())
            .cloned()
            .unwrap_or_default();

        Self {
            track_name: item.name.clone(),
            artist_name,
            album_name: item.album.clone().filter(|a| !a.is_empty()),
            duration_secs: item.duration_secs(),
        }
    }

    /// 查询参数，缺失的专辑和时长不出现
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("track_name", self.track_name.clone()),
            ("artist_name", self.artist_name.clone()),
        ];
        if let Some(album) = &self.album_name {
            params.push(("album_name", album.clone()));
        }
        if let Some(duration) = self.duration_secs {
            params.push(("duration", duration.to_string()));
        }
        params
    }
}

/// 歌词服务返回的一个候选结果
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LookupResult {
    pub id: u64,
    pub track_name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub duration: Option<f64>,
    pub plain_lyrics: Option<String>,
    pub synced_lyrics: Option<String>,
}

impl LookupResult {
    pub fn has_synced_lyrics(&self) -> bool {
        self.synced_lyrics
            .as_deref()
            .map_or(false, |lyrics| !lyrics.trim().is_empty())
    }
}

/// 按服务器顺序选出第一个带时间轴歌词的结果，纯文本结果忽略
pub fn first_synced(results: Vec<LookupResult>) -> Option<LookupResult> {
    results.into_iter().find(LookupResult::has_synced_lyrics)
}

/// 歌词提供者接口
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// 获取提供者名称
    fn name(&self) -> &'static str;

    /// 查找带时间轴的歌词，没有匹配时返回 None
    async fn search_synced(&self, query: &LookupQuery) -> Result<Option<LookupResult>>;
}
