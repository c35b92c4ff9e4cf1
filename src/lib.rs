// 应用核心库

// 模块导出
pub mod app;
pub mod config;
pub mod error;
pub mod jellyfin;
pub mod library;
pub mod lyrics;
pub mod notify;
pub mod reconcile;
pub mod remote;
pub mod utils;

pub use error::{Error, Result};
