mod loader;

pub use loader::{
    Config, LookupConfig, NotifyConfig, PathsConfig, ScanConfig, ServerConfig, SshConfig,
    ENV_PASSWORD, ENV_SERVER_URL, ENV_USERNAME,
};
