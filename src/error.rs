use thiserror::Error;

#[derive(Error, Debug)]
pub enum PegboardError {
    #[error(transparent)]
    Common(#[from] pegboard_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("引数エラー: {0}")]
    InvalidArgument(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("店舗が選択されていません。`pegboard select <店舗番号>` で選択してください")]
    NoStoreSelected,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl PegboardError {
    /// データ読み込みの失敗（起動中断）か
    pub fn is_fatal(&self) -> bool {
        matches!(self, PegboardError::Common(e) if e.is_fatal())
    }
}

pub type Result<T> = std::result::Result<T, PegboardError>;
