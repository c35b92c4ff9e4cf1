use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

pub const ENV_SERVER_URL: &str = "JELLYFIN_SERVER_URL";
pub const ENV_USERNAME: &str = "JELLYFIN_SERVER_USERNAME";
pub const ENV_PASSWORD: &str = "JELLYFIN_SERVER_PASSWORD";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Jellyfin 服务器设置
    pub server: ServerConfig,

    /// 远程主机 SSH 设置
    pub ssh: SshConfig,

    /// 媒体库路径映射
    pub paths: PathsConfig,

    /// 扫描节奏设置
    pub scan: ScanConfig,

    /// 歌词查询服务设置
    pub lookup: LookupConfig,

    /// 会话消息设置
    pub notify: NotifyConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务器地址
    pub url: String,

    /// 用户名，环境变量优先
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// 密码，环境变量优先
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// 上报给服务器的客户端名称
    pub client_name: String,

    /// 上报给服务器的设备名称
    pub device_name: String,

    /// 上报给服务器的设备ID
    pub device_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SshConfig {
    pub host: String,
    pub user: String,
}

/// Jellyfin 看到的路径与远程主机上真实路径之间的映射
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    pub virtual_root: String,
    pub real_root: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ScanConfig {
    /// 分页大小
    pub page_size: usize,

    /// 每处理多少首歌输出一次进度
    pub progress_every: usize,

    /// 每处理多少首歌暂停一次，0 表示不暂停
    pub throttle_every: usize,

    /// 暂停时长（毫秒）
    pub throttle_delay_ms: u64,

    /// 判断 LRC 是否带时间轴时读取的行数
    pub timing_sample_lines: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub user_agent: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NotifyConfig {
    /// 不接收消息的设备名称
    pub excluded_devices: Vec<String>,

    /// 客户端显示消息的时长（毫秒）
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://192.168.7.211:8096".to_string(),
            username: None,
            password: None,
            client_name: "LyricsCleanup".to_string(),
            device_name: "Script".to_string(),
            device_id: "cleanup-script".to_string(),
        }
    }
}

impl ServerConfig {
    /// 用户名和密码，缺一不可
    pub fn credentials(&self) -> crate::error::Result<(&str, &str)> {
        let username = self
            .username
            .as_deref()
            .ok_or(crate::error::Error::MissingCredentials(ENV_USERNAME))?;
        let password = self
            .password
            .as_deref()
            .ok_or(crate::error::Error::MissingCredentials(ENV_PASSWORD))?;
        Ok((username, password))
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: "192.168.7.211".to_string(),
            user: "umbrel".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            virtual_root: "/downloads".to_string(),
            real_root: "/home/umbrel/umbrel/home/Downloads".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            progress_every: 50,
            throttle_every: 10,
            throttle_delay_ms: 100,
            timing_sample_lines: 20,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lrclib.net".to_string(),
            user_agent: "JellyfinLyricsCleanup/1.0.0".to_string(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            excluded_devices: ["SendMessageToAllActiveSessions", "Jellyfin-Wrapped", "Jellyseerr"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// 加载配置，支持从指定路径或默认路径加载，随后应用环境变量
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    fn load_file(path: Option<PathBuf>) -> Result<Self> {
        let pkg_name = env!("CARGO_PKG_NAME");
        let config_path = path.unwrap_or_else(|| {
            dirs::config_dir()
                .map(|p| p.join(pkg_name).join("config.toml"))
                .unwrap_or_else(|| PathBuf::from(format!("{}-config.toml", pkg_name)))
        });

        debug!("尝试从 {:?} 加载配置文件", config_path);

        if !config_path.exists() {
            debug!("配置文件 {:?} 不存在，将创建默认配置", config_path);
            let default_config = Config::default();
            let toml = toml::to_string_pretty(&default_config)?;

            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(&config_path, toml)?;
            info!("已创建默认配置文件: {:?}", config_path);
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path)?;
        let config = match Self::parse(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("解析配置文件 {:?} 失败: {}", config_path, e);
                warn!("由于解析错误，将加载默认配置");
                Config::default()
            }
        };

        debug!("已成功加载配置文件");
        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖服务器地址和凭据
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = non_empty(ENV_SERVER_URL) {
            self.server.url = url;
        }
        if let Some(username) = non_empty(ENV_USERNAME) {
            self.server.username = Some(username);
        }
        if let Some(password) = non_empty(ENV_PASSWORD) {
            self.server.password = Some(password);
        }
    }
}
