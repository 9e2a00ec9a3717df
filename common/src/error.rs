//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// `DataFetch` だけが起動時の致命的エラー。それ以外は利用者が
/// 入力し直せば回復できる。
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to fetch data files: {0}")]
    DataFetch(String),

    #[error("Store not found: {0}")]
    StoreNotFound(String),

    #[error("No items found for POG: {0}")]
    NoBaysForPlanogram(String),

    #[error("Item not found in current Planogram: {0}")]
    ScanNotFound(String),

    #[error("Camera error: {0}")]
    CameraAccess(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 起動を中断すべきエラーか
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::DataFetch(_))
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
