use once_cell::sync::Lazy;
use regex::Regex;

// 匹配时间标签: [mm:ss.xx]
static TIMESTAMP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d{2}:\d{2}\.\d{2}\]").expect("invalid timestamp regex"));

/// 前 `sample_lines` 行中是否至少有一行带时间标签
///
/// 只看开头几行，时间轴从文件后部才开始的歌词会被判为无时间轴。
pub fn has_timestamp_tag(content: &str, sample_lines: usize) -> bool {
    content
        .lines()
        .take(sample_lines)
        .any(|line| TIMESTAMP_TAG.is_match(line))
}

/// 带时间标签的行数
pub fn timed_line_count(content: &str) -> usize {
    content
        .lines()
        .filter(|line| TIMESTAMP_TAG.is_match(line))
        .count()
}
