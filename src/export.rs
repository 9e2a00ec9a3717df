//! チェックリスト出力（CLI版）

use crate::error::{PegboardError, Result};
use pegboard_common::export::generate_checklist_buffer;
use pegboard_common::{CompletionTracker, Dataset, KeyValueStore};
use std::path::{Path, PathBuf};

/// 出力先パス。フォルダ・拡張子なしなら `checklist_<POG>.xlsx` を付ける
pub fn output_path(output: Option<&Path>, planogram_id: &str) -> PathBuf {
    let file_name = format!("checklist_{}.xlsx", planogram_id);
    match output {
        Some(path) if path.is_dir() || path.extension().is_none() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

/// チェックリストを書き出す
pub fn export_checklist<S: KeyValueStore>(
    dataset: &Dataset,
    planogram_id: &str,
    tracker: &CompletionTracker<S>,
    output_path: &Path,
) -> Result<()> {
    let buffer = generate_checklist_buffer(dataset, planogram_id, tracker)
        .map_err(PegboardError::ExcelGeneration)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, buffer)?;
    tracing::info!(path = %output_path.display(), "checklist written");
    Ok(())
}
