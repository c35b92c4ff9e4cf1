use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::{RemoteCommand, RemoteExecutor, RemoteOutput};
use crate::config::SshConfig;
use crate::error::{Error, Result};

/// 通过系统 ssh 客户端执行远程命令
pub struct SshExecutor {
    destination: String,
}

impl SshExecutor {
    pub fn new(config: &SshConfig) -> Self {
        Self {
            destination: format!("{}@{}", config.user, config.host),
        }
    }

    /// 远程 shell 会重新解析命令行，所以每个参数都要单独转义
    fn remote_command_line(command: &RemoteCommand) -> Result<String> {
        Ok(shlex::try_join(command.argv())?)
    }

    /// 启动前确认 SSH 可用
    pub async fn check_connection(&self) -> Result<()> {
        info!("正在测试 SSH 连接: {}", self.destination);
        let output = self.run(&RemoteCommand::new("echo", ["ok"])).await?;
        if output.stdout.trim() != "ok" {
            return Err(Error::RemoteCommand {
                program: "echo".to_string(),
                reason: format!("意外输出: {:?}", output.stdout),
            });
        }
        info!("SSH 连接正常");
        Ok(())
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn run(&self, command: &RemoteCommand) -> Result<RemoteOutput> {
        let command_line = Self::remote_command_line(command)?;
        debug!("ssh {} {}", self.destination, command_line);

        let mut child = Command::new("ssh")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg(&self.destination)
            .arg(&command_line)
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(input) = &command.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(input.as_bytes()).await?;
                // 关闭管道，远程命令才能读到 EOF
                drop(stdin);
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(Error::RemoteCommand {
                program: command.program.clone(),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(RemoteOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
