mod lrc;
#[cfg(test)]
pub(crate) mod http_stub;

pub use lrc::{has_timestamp_tag, timed_line_count};
