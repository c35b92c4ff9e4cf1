//! 远程主机上的文件操作
//!
//! 所有命令都以 [`RemoteCommand`] 的形式表达（程序名 + 参数数组），
//! 由传输层负责转义，调用方从不拼接 shell 字符串。

mod paths;
mod sidecar;
mod ssh;

use async_trait::async_trait;

use crate::error::Result;

pub use paths::{PathMapper, TrackLocation};
pub use sidecar::{LyricFileSet, SidecarProbe};
pub use ssh::SshExecutor;

/// 一条远程命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub program: String,
    pub args: Vec<String>,
    /// 写入命令标准输入的内容
    pub stdin: Option<String>,
}

impl RemoteCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// 程序名和参数，按顺序
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

/// 成功执行的远程命令的输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteOutput {
    pub stdout: String,
}

/// 远程命令执行器
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// 执行命令；非零退出码视为错误
    async fn run(&self, command: &RemoteCommand) -> Result<RemoteOutput>;
}

/// 探测结果：成功拿到数据，或失败原因
///
/// 探测失败通常可以当作“什么都没有”处理，但由调用方决定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome<T> {
    Ok(T),
    Failed(String),
}
