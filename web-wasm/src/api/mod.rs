//! データ取得・永続化

pub mod loader;
pub mod storage;
