use thiserror::Error;

/// 库层错误
#[derive(Error, Debug)]
pub enum Error {
    #[error("缺少凭据: 请设置环境变量 {0}")]
    MissingCredentials(&'static str),

    #[error("Jellyfin 认证失败: HTTP {0}")]
    AuthFailed(u16),

    #[error("远程请求失败: HTTP {status} ({url})")]
    RemoteFetch { status: u16, url: String },

    #[error("HTTP 请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("远程命令 {program} 执行失败: {reason}")]
    RemoteCommand { program: String, reason: String },

    #[error("命令参数无法安全转义: {0}")]
    Quote(#[from] shlex::QuoteError),

    #[error("无法转换的媒体路径: {0}")]
    UntranslatablePath(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
