use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use jellyfin_lyrics::app::{App, CleanupOptions};
use jellyfin_lyrics::config::Config;

#[derive(Parser, Debug)]
#[command(name = "jellyfin-lyrics-rs", version, about = "整理 Jellyfin 媒体库的歌词文件")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 下载时间轴歌词并删除被取代的 .txt 歌词
    Cleanup {
        /// 只处理指定ID的媒体库，可重复
        #[arg(long = "library")]
        libraries: Vec<String>,

        /// 每个媒体库最多处理的歌曲数
        #[arg(long)]
        limit: Option<usize>,
    },
    /// 向所有活跃会话发送消息
    Notify {
        message: String,

        #[arg(long)]
        header: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "jellyfin_lyrics={0},jellyfin_lyrics_rs={0}",
            default_level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Arc::new(Config::load(cli.config)?);
    debug!("配置: {:?}", config.ssh);

    let app = App::new(config)?;
    match cli.command {
        Command::Cleanup { libraries, limit } => {
            let options = CleanupOptions {
                library_ids: libraries,
                limit,
            };
            app.cleanup(&options).await?;
        }
        Command::Notify { message, header } => {
            app.notify(&message, header.as_deref()).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // 加载 .env
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("💥 运行失败: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
