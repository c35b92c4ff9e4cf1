use std::path::{Path, PathBuf};

use crate::config::PathsConfig;
use crate::error::{Error, Result};

/// 把 Jellyfin 看到的路径映射为远程主机上的真实路径
#[derive(Debug, Clone)]
pub struct PathMapper {
    virtual_root: PathBuf,
    real_root: PathBuf,
}

impl PathMapper {
    pub fn new(virtual_root: impl Into<PathBuf>, real_root: impl Into<PathBuf>) -> Self {
        Self {
            virtual_root: virtual_root.into(),
            real_root: real_root.into(),
        }
    }

    pub fn from_config(config: &PathsConfig) -> Self {
        Self::new(&config.virtual_root, &config.real_root)
    }

    /// 前缀按路径组件匹配，`/downloads2` 不会被当作 `/downloads` 下的路径
    pub fn translate(&self, catalog_path: &str) -> PathBuf {
        let path = Path::new(catalog_path);
        match path.strip_prefix(&self.virtual_root) {
            Ok(rest) if rest.as_os_str().is_empty() => self.real_root.clone(),
            Ok(rest) => self.real_root.join(rest),
            Err(_) => path.to_path_buf(),
        }
    }
}

/// 一首歌在远程主机上的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackLocation {
    /// 所在目录
    pub directory: String,
    /// 去掉扩展名的文件名
    pub base_name: String,
}

impl TrackLocation {
    pub fn resolve(mapper: &PathMapper, catalog_path: &str) -> Result<Self> {
        let untranslatable = || Error::UntranslatablePath(catalog_path.to_string());

        let system_path = mapper.translate(catalog_path);
        let directory = system_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .and_then(Path::to_str)
            .ok_or_else(untranslatable)?;
        let base_name = system_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(untranslatable)?;

        Ok(Self {
            directory: directory.to_string(),
            base_name: base_name.to_string(),
        })
    }

    /// 同名 .lrc 文件的路径
    pub fn lrc_path(&self) -> String {
        self.sidecar_path("lrc")
    }

    pub fn sidecar_path(&self, extension: &str) -> String {
        Path::new(&self.directory)
            .join(format!("{}.{}", self.base_name, extension))
            .to_string_lossy()
            .into_owned()
    }

    /// 名称是否以 `<base>.` 开头
    pub fn owns_prefix(&self, name: &str) -> bool {
        name.strip_prefix(self.base_name.as_str())
            .map_or(false, |rest| rest.starts_with('.'))
    }

    /// 文件名是否形如这首歌的歌词文件（`<base>.xxx.txt` 也算）
    ///
    /// 只看名称；同目录下另一首 `<base>.xxx` 歌曲的歌词需由调用方排除。
    pub fn owns_sidecar(&self, file_name: &str, extension: &str) -> bool {
        file_name
            .strip_prefix(self.base_name.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .map(|rest| rest == extension || rest.ends_with(&format!(".{}", extension)))
            .unwrap_or(false)
    }
}
