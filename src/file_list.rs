//! ファイル一覧（githubfiles.csv）の生成
//!
//! 商品画像・棚割りPDFを置いたフォルダを走査し、1行1パスの一覧にする。

use crate::error::{PegboardError, Result};
use std::path::Path;
use walkdir::WalkDir;

const ASSET_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "pdf"];

/// フォルダ以下の参照資料を相対パス（`/` 区切り）で列挙
pub fn scan_assets(folder: &Path) -> Result<Vec<String>> {
    if !folder.is_dir() {
        return Err(PegboardError::FolderNotFound(folder.display().to_string()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        if !is_asset(path) {
            continue;
        }

        let relative = path.strip_prefix(folder).unwrap_or(path);
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(name);
    }

    files.sort();
    tracing::debug!(folder = %folder.display(), count = files.len(), "assets scanned");

    Ok(files)
}

/// 一覧をファイルに書き出す
pub fn write_file_list(files: &[String], output: &Path) -> Result<()> {
    let mut content = files.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(output, content)?;
    Ok(())
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn is_asset(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            ASSET_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
