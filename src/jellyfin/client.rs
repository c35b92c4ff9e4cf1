use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{ItemsPage, LibraryItem, MediaServer, MessageCommand, SessionInfo};
use crate::config::ServerConfig;
use crate::error::{Error, Result};

const AUTH_HEADER: &str = "X-Emby-Authorization";
const ITEM_FIELDS: &str = "Path,MediaSources,Album,AlbumArtist,Artists,RunTimeTicks";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthUser {
    id: String,
}

/// 已认证的 Jellyfin 客户端
pub struct JellyfinClient {
    client: Client,
    base_url: String,
    user_id: String,
    auth_header: HeaderValue,
}

impl JellyfinClient {
    /// 使用用户名密码登录
    pub async fn authenticate(config: &ServerConfig) -> Result<Self> {
        let (username, password) = config.credentials()?;

        let client = Client::new();
        let base_url = config.url.trim_end_matches('/').to_string();
        let client_info = client_info(config);

        info!("正在登录 Jellyfin: {}", base_url);

        let resp = client
            .post(format!("{}/Users/AuthenticateByName", base_url))
            .header(AUTH_HEADER, &client_info)
            .json(&json!({ "Username": username, "Pw": password }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::AuthFailed(status.as_u16()));
        }

        let auth: AuthResponse = resp.json().await?;
        let auth_header = HeaderValue::from_str(&format!(
            "{}, Token=\"{}\"",
            client_info, auth.access_token
        ))
        .map_err(|e| Error::Config(format!("无效的认证头: {}", e)))?;

        info!("Jellyfin 登录成功");

        Ok(Self {
            client,
            base_url,
            user_id: auth.user.id,
            auth_header,
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header(AUTH_HEADER, self.auth_header.clone())
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header(AUTH_HEADER, self.auth_header.clone())
    }
}

fn client_info(config: &ServerConfig) -> String {
    format!(
        "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\"",
        config.client_name,
        config.device_name,
        config.device_id,
        env!("CARGO_PKG_VERSION")
    )
}

/// 非 2xx 响应转换为 RemoteFetch 错误
fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(Error::RemoteFetch {
            status: status.as_u16(),
            url: resp.url().to_string(),
        })
    }
}

#[async_trait]
impl MediaServer for JellyfinClient {
    async fn user_views(&self) -> Result<Vec<LibraryItem>> {
        let resp = self
            .get(&format!("/Users/{}/Views", self.user_id))
            .send()
            .await?;
        let page: ItemsPage = check_status(resp)?.json().await?;
        Ok(page.items)
    }

    async fn audio_items_page(
        &self,
        library_id: &str,
        start_index: usize,
        limit: usize,
    ) -> Result<ItemsPage> {
        debug!(
            "请求媒体库 {} 的歌曲, StartIndex={}, Limit={}",
            library_id, start_index, limit
        );

        let start_index = start_index.to_string();
        let limit = limit.to_string();
        let params = [
            ("ParentId", library_id),
            ("IncludeItemTypes", "Audio"),
            ("Recursive", "true"),
            ("Fields", ITEM_FIELDS),
            ("StartIndex", start_index.as_str()),
            ("Limit", limit.as_str()),
        ];

        let resp = self
            .get(&format!("/Users/{}/Items", self.user_id))
            .query(&params)
            .send()
            .await?;

        Ok(check_status(resp)?.json().await?)
    }

    async fn sessions(&self) -> Result<Vec<SessionInfo>> {
        let resp = self.get("/Sessions").send().await?;
        Ok(check_status(resp)?.json().await?)
    }

    async fn send_message(&self, session_id: &str, command: &MessageCommand) -> Result<()> {
        let resp = self
            .post(&format!("/Sessions/{}/Message", session_id))
            .json(command)
            .send()
            .await?;
        check_status(resp)?;
        Ok(())
    }
}
