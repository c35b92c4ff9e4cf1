use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::jellyfin::{LibraryItem, MediaServer};

/// 列出服务器上所有音乐媒体库
pub async fn music_libraries(server: &dyn MediaServer) -> Result<Vec<LibraryItem>> {
    let libraries: Vec<LibraryItem> = server
        .user_views()
        .await?
        .into_iter()
        .filter(LibraryItem::is_music_library)
        .collect();

    info!("找到 {} 个音乐媒体库", libraries.len());
    Ok(libraries)
}

/// 分页拉取媒体库中的全部歌曲
///
/// 返回的页面条目数少于 `page_size` 时视为最后一页；恰好填满的一页之后
/// 总会再请求一次。任何一页失败都会放弃整个媒体库，不返回部分结果。
pub async fn fetch_all_items(
    server: &dyn MediaServer,
    library_id: &str,
    page_size: usize,
) -> Result<Vec<LibraryItem>> {
    if library_id.is_empty() {
        return Err(Error::Config("媒体库ID不能为空".to_string()));
    }
    if page_size == 0 {
        return Err(Error::Config("分页大小必须大于 0".to_string()));
    }

    info!("获取媒体库 {} 的全部歌曲", library_id);

    let mut all_items = Vec::new();
    let mut start_index = 0;
    let mut reported_total;

    loop {
        let page = server
            .audio_items_page(library_id, start_index, page_size)
            .await?;
        let page_len = page.items.len();
        reported_total = page.total_record_count;
        all_items.extend(page.items);

        if page_len < page_size {
            break;
        }

        start_index += page_size;
        debug!("已获取 {} 首歌曲", all_items.len());
    }

    if reported_total != all_items.len() {
        warn!(
            "媒体库 {} 报告共 {} 首歌曲，实际获取 {} 首",
            library_id,
            reported_total,
            all_items.len()
        );
    }

    info!("媒体库 {} 共 {} 首歌曲", library_id, all_items.len());
    Ok(all_items)
}
