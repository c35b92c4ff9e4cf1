use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::jellyfin::{JellyfinClient, LibraryItem, MediaServer};
use crate::library;
use crate::lyrics::providers;
use crate::notify;
use crate::reconcile::{library_report, Pacing, Reconciler, RunTally};
use crate::remote::{PathMapper, SidecarProbe, SshExecutor};

/// cleanup 子命令的选项
#[derive(Debug, Clone, Default)]
pub struct CleanupOptions {
    /// 只处理这些媒体库，空表示全部音乐媒体库
    pub library_ids: Vec<String>,
    /// 每个媒体库最多处理的歌曲数
    pub limit: Option<usize>,
}

pub struct App {
    config: Arc<Config>,
}

impl App {
    /// 创建新应用实例
    pub fn new(config: Arc<Config>) -> Result<Self> {
        Ok(Self { config })
    }

    /// 整理全部音乐媒体库的歌词文件
    pub async fn cleanup(&self, options: &CleanupOptions) -> Result<RunTally> {
        info!("🚀 开始整理 Jellyfin 歌词文件");
        self.config.server.credentials()?;

        let ssh = Arc::new(SshExecutor::new(&self.config.ssh));
        ssh.check_connection()
            .await
            .context("SSH 连接失败")?;

        let server = JellyfinClient::authenticate(&self.config.server)
            .await
            .context("Jellyfin 认证失败")?;

        let libraries = self.select_libraries(&server, &options.library_ids).await?;
        if libraries.is_empty() {
            warn!("⚠️  未找到音乐媒体库");
            return Ok(RunTally::default());
        }

        let reconciler = Reconciler::new(
            SidecarProbe::new(ssh, self.config.scan.timing_sample_lines),
            providers::build_provider(&self.config.lookup),
            PathMapper::from_config(&self.config.paths),
        );
        let pacing = Pacing::from_config(&self.config.scan);

        let mut grand_total = RunTally::default();
        for library in &libraries {
            info!("🎯 处理媒体库: {}", library.name);

            let mut items =
                library::fetch_all_items(&server, &library.id, self.config.scan.page_size)
                    .await
                    .with_context(|| format!("获取媒体库 \"{}\" 的歌曲失败", library.name))?;
            if let Some(limit) = options.limit {
                items.truncate(limit);
            }

            let tally = reconciler.run_library(&items, &pacing).await;
            println!("\n{}", library_report(&library.name, &tally));
            grand_total = grand_total.merge(tally);
        }

        if libraries.len() > 1 {
            println!("\n📊 全部媒体库汇总:\n{}", grand_total);
        }
        info!("🎉 整理完成");
        Ok(grand_total)
    }

    /// 向所有活跃会话发送消息
    pub async fn notify(&self, message: &str, header: Option<&str>) -> Result<usize> {
        let server = JellyfinClient::authenticate(&self.config.server)
            .await
            .context("Jellyfin 认证失败")?;

        let sent = notify::broadcast_message(&server, message, header, &self.config.notify)
            .await
            .context("发送消息失败")?;
        println!("已发送 {} 条消息", sent);
        Ok(sent)
    }

    async fn select_libraries(
        &self,
        server: &dyn MediaServer,
        requested: &[String],
    ) -> Result<Vec<LibraryItem>> {
        let libraries = library::music_libraries(server)
            .await
            .context("获取音乐媒体库失败")?;

        if requested.is_empty() {
            return Ok(libraries);
        }

        debug!("只处理指定的媒体库: {:?}", requested);
        for id in requested {
            if !libraries.iter().any(|l| &l.id == id) {
                warn!("未找到音乐媒体库: {}", id);
            }
        }
        Ok(libraries
            .into_iter()
            .filter(|l| requested.contains(&l.id))
            .collect())
    }
}
