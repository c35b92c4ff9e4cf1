//! 歌词文件整理
//!
//! 对每首歌：没有任何歌词文件则跳过；已有带时间轴的 .lrc 则直接清理
//! .txt；否则尝试从歌词服务下载时间轴歌词，下载并写入成功后才删除 .txt，
//! 失败则保留 .txt 并计入“保留”。

mod summary;
mod tally;

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::jellyfin::LibraryItem;
use crate::lyrics::{LookupQuery, LyricsProvider};
use crate::remote::{LyricFileSet, PathMapper, ProbeOutcome, SidecarProbe, TrackLocation};
use crate::utils::timed_line_count;

pub use summary::{library_report, Pacing};
pub use tally::{ItemOutcome, RunTally};

/// 歌词文件整理器
pub struct Reconciler {
    probe: SidecarProbe,
    provider: Arc<dyn LyricsProvider>,
    mapper: PathMapper,
}

impl Reconciler {
    pub fn new(probe: SidecarProbe, provider: Arc<dyn LyricsProvider>, mapper: PathMapper) -> Self {
        Self {
            probe,
            provider,
            mapper,
        }
    }

    /// 依次处理一个媒体库的全部歌曲，返回累计结果
    pub async fn run_library(&self, items: &[LibraryItem], pacing: &Pacing) -> RunTally {
        let total = items.len();
        let mut tally = RunTally::default();

        info!("开始处理 {} 首歌曲", total);

        for (i, item) in items.iter().enumerate() {
            let outcome = self.process_item(item, i + 1, total).await;
            tally = tally.record(outcome);
            pacing.after_item(i + 1, total, &tally).await;
        }

        tally
    }

    /// 处理一首歌，任何一步失败只影响这首歌
    pub async fn process_item(&self, item: &LibraryItem, index: usize, total: usize) -> ItemOutcome {
        match self.reconcile(item, index, total).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[{}/{}] 处理 \"{}\" 失败: {}", index, total, item.name, e);
                ItemOutcome::default()
            }
        }
    }

    async fn reconcile(&self, item: &LibraryItem, index: usize, total: usize) -> Result<ItemOutcome> {
        let catalog_path = item
            .path
            .as_deref()
            .ok_or_else(|| Error::UntranslatablePath(format!("\"{}\" 没有路径", item.name)))?;
        let location = TrackLocation::resolve(&self.mapper, catalog_path)?;

        let files = match self.probe.find_lyric_files(&location).await {
            ProbeOutcome::Ok(files) => files,
            ProbeOutcome::Failed(reason) => {
                debug!("查找 \"{}\" 的歌词文件失败，视为没有: {}", item.name, reason);
                LyricFileSet::default()
            }
        };

        let mut outcome = ItemOutcome::default();
        if files.is_empty() {
            return Ok(outcome);
        }

        let mut has_timed_lrc = self.any_timed(&files.lrc_files).await;

        if !has_timed_lrc && self.download(item, &location).await {
            has_timed_lrc = true;
            outcome.downloaded = 1;
            info!("📥 [{}/{}] 已下载时间轴歌词: \"{}\"", index, total, item.name);
        }

        if has_timed_lrc {
            for txt_file in &files.txt_files {
                match self.probe.delete_file(txt_file).await {
                    Ok(()) => outcome.deleted += 1,
                    Err(e) => warn!("删除 {} 失败: {}", txt_file, e),
                }
            }
            if outcome.deleted > 0 {
                info!(
                    "🗑️  [{}/{}] 已删除 {} 个 .txt 文件: \"{}\"",
                    index, total, outcome.deleted, item.name
                );
            }
        } else {
            outcome.skipped = files.txt_files.len();
        }

        Ok(outcome)
    }

    async fn any_timed(&self, lrc_files: &[String]) -> bool {
        for lrc_file in lrc_files {
            match self.probe.has_timings(lrc_file).await {
                ProbeOutcome::Ok(true) => return true,
                ProbeOutcome::Ok(false) => {}
                ProbeOutcome::Failed(reason) => {
                    debug!("读取 {} 失败，视为无时间轴: {}", lrc_file, reason)
                }
            }
        }
        false
    }

    /// 查找并写入时间轴歌词，写入成功返回 true
    async fn download(&self, item: &LibraryItem, location: &TrackLocation) -> bool {
        let query = LookupQuery::from_item(item);

        let synced = match self.provider.search_synced(&query).await {
            Ok(Some(result)) => result.synced_lyrics,
            Ok(None) => None,
            Err(e) => {
                warn!("查询 \"{}\" 的歌词失败: {}", item.name, e);
                None
            }
        };
        let Some(lyrics) = synced.filter(|l| !l.trim().is_empty()) else {
            debug!("未找到 \"{}\" 的时间轴歌词", item.name);
            return false;
        };

        let lrc_path = location.lrc_path();
        match self.probe.write_file(&lrc_path, &lyrics).await {
            Ok(()) => {
                debug!("写入 {} ({} 行)", lrc_path, timed_line_count(&lyrics));
                true
            }
            Err(e) => {
                warn!("写入 {} 失败: {}", lrc_path, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::tests::MockProvider;
    use crate::lyrics::LookupResult;
    use crate::remote::tests::MockRemote;
    use crate::remote::{RemoteCommand, RemoteOutput};
    use mockall::Sequence;
    use std::time::Duration;

    const DIR: &str = "/home/umbrel/umbrel/home/Downloads/Artist/Album";

    fn song() -> LibraryItem {
        LibraryItem {
            id: "s1".to_string(),
            name: "Song".to_string(),
            path: Some("/downloads/Artist/Album/Song.flac".to_string()),
            artists: vec!["Artist".to_string()],
            album: Some("Album".to_string()),
            run_time_ticks: Some(1_800_000_000),
            ..Default::default()
        }
    }

    fn reconciler(remote: MockRemote, provider: MockProvider) -> Reconciler {
        Reconciler::new(
            SidecarProbe::new(Arc::new(remote), 20),
            Arc::new(provider),
            PathMapper::new("/downloads", "/home/umbrel/umbrel/home/Downloads"),
        )
    }

    fn no_pause() -> Pacing {
        Pacing {
            progress_every: 0,
            throttle_every: 0,
            throttle_delay: Duration::ZERO,
        }
    }

    fn is(program: &'static str) -> impl Fn(&RemoteCommand) -> bool {
        move |c: &RemoteCommand| c.program == program
    }

    fn expect_listing(remote: &mut MockRemote, names: &'static [&'static str]) {
        remote
            .expect_run()
            .withf(|c| c.program == "find" && c.args[0] == DIR)
            .times(1)
            .returning(move |_| {
                Ok(RemoteOutput {
                    stdout: names
                        .iter()
                        .map(|n| format!("{}/{}\n", DIR, n))
                        .collect(),
                })
            });
    }

    fn synced(lyrics: &str) -> LookupResult {
        LookupResult {
            id: 7,
            track_name: "Song".to_string(),
            artist_name: "Artist".to_string(),
            synced_lyrics: Some(lyrics.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_library_has_zero_tally() {
        let reconciler = reconciler(MockRemote::new(), MockProvider::new());
        let tally = reconciler.run_library(&[], &no_pause()).await;
        assert_eq!(tally, RunTally::default());
    }

    #[tokio::test]
    async fn test_no_sidecars_only_lists_directory() {
        let mut remote = MockRemote::new();
        expect_listing(&mut remote, &["Song.flac", "cover.jpg"]);
        let mut provider = MockProvider::new();
        provider.expect_search_synced().times(0);

        let outcome = reconciler(remote, provider).process_item(&song(), 1, 1).await;
        assert_eq!(outcome, ItemOutcome::default());
    }

    #[tokio::test]
    async fn test_timed_lrc_deletes_txt_without_lookup() {
        let mut remote = MockRemote::new();
        expect_listing(&mut remote, &["Song.flac", "Song.txt", "Song.lrc"]);
        remote
            .expect_run()
            .withf(|c| c.program == "head" && c.args[2] == format!("{}/Song.lrc", DIR))
            .times(1)
            .returning(|_| {
                Ok(RemoteOutput {
                    stdout: "[ti:Song]\n[00:05.10]first\n".to_string(),
                })
            });
        remote
            .expect_run()
            .withf(|c| c.program == "rm" && c.args == ["-f".to_string(), format!("{}/Song.txt", DIR)])
            .times(1)
            .returning(|_| Ok(RemoteOutput::default()));
        let mut provider = MockProvider::new();
        provider.expect_search_synced().times(0);

        let outcome = reconciler(remote, provider).process_item(&song(), 1, 1).await;
        assert_eq!(
            outcome,
            ItemOutcome {
                downloaded: 0,
                deleted: 1,
                skipped: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_sibling_track_txt_is_left_alone() {
        let mut remote = MockRemote::new();
        expect_listing(
            &mut remote,
            &["Song.flac", "Song.live.flac", "Song.lrc", "Song.live.txt"],
        );
        remote
            .expect_run()
            .withf(|c| c.program == "head" && c.args[2] == format!("{}/Song.lrc", DIR))
            .times(1)
            .returning(|_| {
                Ok(RemoteOutput {
                    stdout: "[00:05.10]first\n".to_string(),
                })
            });
        remote.expect_run().withf(is("rm")).times(0);
        let mut provider = MockProvider::new();
        provider.expect_search_synced().times(0);

        let outcome = reconciler(remote, provider).process_item(&song(), 1, 1).await;
        assert_eq!(outcome, ItemOutcome::default());
    }

    #[tokio::test]
    async fn test_download_then_delete() {
        let mut remote = MockRemote::new();
        let mut seq = Sequence::new();
        expect_listing(&mut remote, &["Song.flac", "Song.txt"]);
        remote
            .expect_run()
            .withf(|c| {
                c.program == "dd"
                    && c.args == [format!("of={}/Song.lrc", DIR), "status=none".to_string()]
                    && c.stdin.as_deref() == Some("[00:01.00]hello\n")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(RemoteOutput::default()));
        remote
            .expect_run()
            .withf(is("rm"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(RemoteOutput::default()));

        let mut provider = MockProvider::new();
        provider
            .expect_search_synced()
            .withf(|q| {
                q.track_name == "Song"
                    && q.artist_name == "Artist"
                    && q.album_name.as_deref() == Some("Album")
                    && q.duration_secs == Some(180)
            })
            .times(1)
            .returning(|_| Ok(Some(synced("[00:01.00]hello"))));

        let outcome = reconciler(remote, provider).process_item(&song(), 1, 1).await;
        assert_eq!(
            outcome,
            ItemOutcome {
                downloaded: 1,
                deleted: 1,
                skipped: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_no_match_keeps_txt() {
        let mut remote = MockRemote::new();
        expect_listing(&mut remote, &["Song.flac", "Song.txt"]);
        let mut provider = MockProvider::new();
        provider
            .expect_search_synced()
            .times(1)
            .returning(|_| Ok(None));

        let outcome = reconciler(remote, provider).process_item(&song(), 1, 1).await;
        assert_eq!(
            outcome,
            ItemOutcome {
                downloaded: 0,
                deleted: 0,
                skipped: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_untimed_lrc_triggers_lookup() {
        let mut remote = MockRemote::new();
        expect_listing(&mut remote, &["Song.flac", "Song.lrc", "Song.txt", "Song.en.txt"]);
        remote
            .expect_run()
            .withf(is("head"))
            .times(1)
            .returning(|_| {
                Ok(RemoteOutput {
                    stdout: "plain words\n".to_string(),
                })
            });
        let mut provider = MockProvider::new();
        provider
            .expect_search_synced()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection reset")));

        let outcome = reconciler(remote, provider).process_item(&song(), 1, 1).await;
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(outcome.downloaded, 0);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_txt() {
        let mut remote = MockRemote::new();
        expect_listing(&mut remote, &["Song.flac", "Song.txt"]);
        remote.expect_run().withf(is("dd")).times(1).returning(|_| {
            Err(Error::RemoteCommand {
                program: "dd".to_string(),
                reason: "Permission denied".to_string(),
            })
        });
        let mut provider = MockProvider::new();
        provider
            .expect_search_synced()
            .times(1)
            .returning(|_| Ok(Some(synced("[00:01.00]hello"))));

        let outcome = reconciler(remote, provider).process_item(&song(), 1, 1).await;
        assert_eq!(
            outcome,
            ItemOutcome {
                downloaded: 0,
                deleted: 0,
                skipped: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_failed_delete_is_not_counted() {
        let mut remote = MockRemote::new();
        expect_listing(&mut remote, &["Song.flac", "Song.a.txt", "Song.b.txt", "Song.lrc"]);
        remote.expect_run().withf(is("head")).times(1).returning(|_| {
            Ok(RemoteOutput {
                stdout: "[00:00.50]x\n".to_string(),
            })
        });
        remote
            .expect_run()
            .withf(|c| c.program == "rm" && c.args[1].ends_with("Song.a.txt"))
            .times(1)
            .returning(|_| {
                Err(Error::RemoteCommand {
                    program: "rm".to_string(),
                    reason: "Read-only file system".to_string(),
                })
            });
        remote
            .expect_run()
            .withf(|c| c.program == "rm" && c.args[1].ends_with("Song.b.txt"))
            .times(1)
            .returning(|_| Ok(RemoteOutput::default()));

        let outcome = reconciler(remote, provider_never_called())
            .process_item(&song(), 1, 1)
            .await;
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.skipped, 0);
    }

    #[tokio::test]
    async fn test_failed_listing_is_treated_as_no_files() {
        let mut remote = MockRemote::new();
        remote.expect_run().withf(is("find")).times(1).returning(|_| {
            Err(Error::RemoteCommand {
                program: "find".to_string(),
                reason: "No such file or directory".to_string(),
            })
        });

        let outcome = reconciler(remote, provider_never_called())
            .process_item(&song(), 1, 1)
            .await;
        assert_eq!(outcome, ItemOutcome::default());
    }

    #[tokio::test]
    async fn test_item_without_path_makes_no_remote_calls() {
        let mut item = song();
        item.path = None;

        let outcome = reconciler(MockRemote::new(), provider_never_called())
            .process_item(&item, 1, 1)
            .await;
        assert_eq!(outcome, ItemOutcome::default());
    }

    #[tokio::test]
    async fn test_untranslated_path_is_used_as_is() {
        let mut item = song();
        item.path = Some("/media/music/Song.mp3".to_string());

        let mut remote = MockRemote::new();
        remote
            .expect_run()
            .withf(|c| c.program == "find" && c.args[0] == "/media/music")
            .times(1)
            .returning(|_| Ok(RemoteOutput::default()));

        let outcome = reconciler(remote, provider_never_called())
            .process_item(&item, 1, 1)
            .await;
        assert_eq!(outcome, ItemOutcome::default());
    }

    #[tokio::test]
    async fn test_run_library_folds_outcomes() {
        let mut remote = MockRemote::new();
        remote
            .expect_run()
            .withf(is("find"))
            .times(2)
            .returning(|_| {
                Ok(RemoteOutput {
                    stdout: format!("{}/Song.txt\n", DIR),
                })
            });
        let mut provider = MockProvider::new();
        provider
            .expect_search_synced()
            .times(2)
            .returning(|_| Ok(None));

        let tally = reconciler(remote, provider)
            .run_library(&[song(), song()], &no_pause())
            .await;
        assert_eq!(
            tally,
            RunTally {
                songs: 2,
                downloaded: 0,
                deleted: 0,
                skipped: 2,
            }
        );
    }

    fn provider_never_called() -> MockProvider {
        let mut provider = MockProvider::new();
        provider.expect_search_synced().times(0);
        provider
    }
}
