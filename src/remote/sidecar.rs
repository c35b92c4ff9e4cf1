use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::{ProbeOutcome, RemoteCommand, RemoteExecutor, TrackLocation};
use crate::error::Result;
use crate::utils::has_timestamp_tag;

/// 一首歌旁边的歌词文件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricFileSet {
    /// 旧的纯文本歌词
    pub txt_files: Vec<String>,
    /// 时间轴歌词
    pub lrc_files: Vec<String>,
}

impl LyricFileSet {
    pub fn is_empty(&self) -> bool {
        self.txt_files.is_empty() && self.lrc_files.is_empty()
    }
}

fn is_lyric_file(file_name: &str) -> bool {
    matches!(
        Path::new(file_name).extension().and_then(|e| e.to_str()),
        Some("txt" | "lrc")
    )
}

/// 通过远程执行器查找、检查、写入和删除歌词文件
#[derive(Clone)]
pub struct SidecarProbe {
    remote: Arc<dyn RemoteExecutor>,
    sample_lines: usize,
}

impl SidecarProbe {
    pub fn new(remote: Arc<dyn RemoteExecutor>, sample_lines: usize) -> Self {
        Self {
            remote,
            sample_lines,
        }
    }

    /// 列出歌曲所在目录中与其同名的 .txt 和 .lrc 文件
    pub async fn find_lyric_files(&self, location: &TrackLocation) -> ProbeOutcome<LyricFileSet> {
        let command = RemoteCommand::new(
            "find",
            [location.directory.as_str(), "-maxdepth", "1", "-type", "f"],
        );

        let output = match self.remote.run(&command).await {
            Ok(output) => output,
            Err(e) => return ProbeOutcome::Failed(e.to_string()),
        };

        let entries: Vec<(&str, &str)> = output
            .stdout
            .lines()
            .filter(|l| !l.is_empty())
            .filter_map(|path| {
                let file_name = Path::new(path).file_name()?.to_str()?;
                Some((path, file_name))
            })
            .collect();

        // 同目录下 `<base>.xxx.flac` 这样的歌曲拥有自己的 `<base>.xxx.*.txt`
        let siblings: Vec<TrackLocation> = entries
            .iter()
            .map(|&(_, name)| name)
            .filter(|name| !is_lyric_file(name))
            .filter_map(|name| Path::new(name).file_stem().and_then(|s| s.to_str()))
            .filter(|stem| *stem != location.base_name && location.owns_prefix(stem))
            .map(|stem| TrackLocation {
                directory: location.directory.clone(),
                base_name: stem.to_string(),
            })
            .collect();
        let owned = |file_name: &str, extension: &str| {
            location.owns_sidecar(file_name, extension)
                && !siblings.iter().any(|s| s.owns_sidecar(file_name, extension))
        };

        let mut files = LyricFileSet::default();
        for (path, file_name) in entries {
            if owned(file_name, "txt") {
                files.txt_files.push(path.to_string());
            } else if owned(file_name, "lrc") {
                files.lrc_files.push(path.to_string());
            }
        }
        files.txt_files.sort();
        files.lrc_files.sort();

        debug!(
            "{}: {} 个 .txt, {} 个 .lrc",
            location.base_name,
            files.txt_files.len(),
            files.lrc_files.len()
        );
        ProbeOutcome::Ok(files)
    }

    /// 文件开头若干行里是否有 `[mm:ss.xx]` 时间标签
    pub async fn has_timings(&self, lrc_path: &str) -> ProbeOutcome<bool> {
        let command = RemoteCommand::new(
            "head",
            ["-n".to_string(), self.sample_lines.to_string(), lrc_path.to_string()],
        );

        match self.remote.run(&command).await {
            Ok(output) => ProbeOutcome::Ok(has_timestamp_tag(&output.stdout, self.sample_lines)),
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }

    /// 写入 .lrc 文件，内容经标准输入传给远程 dd
    pub async fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let mut content = content.to_string();
        if !content.ends_with('\n') {
            content.push('\n');
        }

        let command =
            RemoteCommand::new("dd", [format!("of={}", path), "status=none".to_string()])
                .with_stdin(content);
        self.remote.run(&command).await?;
        Ok(())
    }

    pub async fn delete_file(&self, path: &str) -> Result<()> {
        self.remote.run(&RemoteCommand::new("rm", ["-f", path])).await?;
        Ok(())
    }
}
