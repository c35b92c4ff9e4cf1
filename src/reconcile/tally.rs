use std::fmt;

/// 单首歌的处理结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemOutcome {
    /// 新下载的时间轴歌词（0 或 1）
    pub downloaded: usize,
    /// 删除的 .txt 文件
    pub deleted: usize,
    /// 因没有时间轴歌词而保留的 .txt 文件
    pub skipped: usize,
}

/// 一个媒体库的累计结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub songs: usize,
    pub downloaded: usize,
    pub deleted: usize,
    pub skipped: usize,
}

impl RunTally {
    /// 计入一首歌的结果
    pub fn record(self, outcome: ItemOutcome) -> Self {
        Self {
            songs: self.songs + 1,
            downloaded: self.downloaded + outcome.downloaded,
            deleted: self.deleted + outcome.deleted,
            skipped: self.skipped + outcome.skipped,
        }
    }

    /// 合并另一个媒体库的结果
    pub fn merge(self, other: RunTally) -> Self {
        Self {
            songs: self.songs + other.songs,
            downloaded: self.downloaded + other.downloaded,
            deleted: self.deleted + other.deleted,
            skipped: self.skipped + other.skipped,
        }
    }
}

impl fmt::Display for RunTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   • 已处理歌曲: {}", self.songs)?;
        writeln!(f, "   • 下载时间轴歌词: {}", self.downloaded)?;
        writeln!(f, "   • 删除 .txt 文件: {}", self.deleted)?;
        write!(f, "   • 保留 .txt 文件: {}", self.skipped)
    }
}
