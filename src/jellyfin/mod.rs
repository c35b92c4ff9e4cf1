mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use client::JellyfinClient;

/// Jellyfin 的时长单位，每秒 10,000,000 tick
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// 媒体库中的一个条目（歌曲或媒体库视图）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LibraryItem {
    pub id: String,
    pub name: String,
    pub path: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub artists: Vec<String>,
    pub run_time_ticks: Option<u64>,
    pub collection_type: Option<String>,
}

impl LibraryItem {
    /// 时长（秒，四舍五入），无时长或不足半秒时返回 None
    pub fn duration_secs(&self) -> Option<u64> {
        self.run_time_ticks
            .map(|ticks| (ticks + TICKS_PER_SECOND / 2) / TICKS_PER_SECOND)
            .filter(|&secs| secs > 0)
    }

    pub fn is_music_library(&self) -> bool {
        self.collection_type.as_deref() == Some("music")
    }
}

/// 分页查询的一页结果
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ItemsPage {
    pub items: Vec<LibraryItem>,
    pub total_record_count: usize,
}

/// 服务器上的一个会话
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SessionInfo {
    pub id: Option<String>,
    pub user_name: Option<String>,
    pub device_name: Option<String>,
    pub client: Option<String>,
}

/// 发送给会话的消息
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageCommand {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub timeout_ms: u64,
}

/// 媒体服务器接口
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// 当前用户可见的所有顶层视图
    async fn user_views(&self) -> Result<Vec<LibraryItem>>;

    /// 获取某个媒体库中从 start_index 开始的一页音频条目
    async fn audio_items_page(
        &self,
        library_id: &str,
        start_index: usize,
        limit: usize,
    ) -> Result<ItemsPage>;

    /// 当前所有会话
    async fn sessions(&self) -> Result<Vec<SessionInfo>>;

    /// 向指定会话发送消息
    async fn send_message(&self, session_id: &str, command: &MessageCommand) -> Result<()>;
}
