//! pegboard CLI
//!
//! データフォルダの読み込み・設定・ファイル一覧生成・チェックリスト出力。
//! 棚割りの計算は `pegboard_common` が持つ。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod file_list;
pub mod loader;
pub mod prompt;
