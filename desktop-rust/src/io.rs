use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use pegboard_common::{Dataset, FILE_INDEX_RESOURCE, PLACEMENTS_RESOURCE, STORE_MAP_RESOURCE};

use crate::model::DesktopSettings;

/// CLI と同じ ~/.config/pegboard を使う
fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("pegboard"))
}

pub fn state_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("state.json"))
}

fn settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("desktop.json"))
}

pub fn load_dataset(dir: &Path) -> Result<Dataset> {
    let read = |name: &str| {
        let path = dir.join(name);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    };
    let files = read(FILE_INDEX_RESOURCE)?;
    let placements = read(PLACEMENTS_RESOURCE)?;
    let store_map = read(STORE_MAP_RESOURCE)?;

    Dataset::from_sources(&files, &placements, &store_map)
        .with_context(|| format!("parse data in {}", dir.display()))
}

pub fn load_settings() -> DesktopSettings {
    settings_path()
        .and_then(|path| fs::read_to_string(path).ok())
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

pub fn save_settings(settings: &DesktopSettings) -> Result<()> {
    let path = settings_path().context("home directory not found")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dataset_missing_resource() {
        let dir = std::env::temp_dir().join("pegboard-desktop-missing");
        let err = load_dataset(&dir).unwrap_err();
        assert!(err.to_string().contains(FILE_INDEX_RESOURCE));
    }

    #[test]
    fn test_load_dataset() {
        let dir = std::env::temp_dir().join(format!("pegboard-desktop-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("一時フォルダ作成に失敗");
        fs::write(dir.join(FILE_INDEX_RESOURCE), "414123.jpg\n8386824.pdf\n").expect("書き込み失敗");
        fs::write(
            dir.join(PLACEMENTS_RESOURCE),
            "POG,Bay,Peg,Width,Height,UPC,ProductDescription\n8386824,2,R02 C03,2 in,4 in,414123,Utility Hook\n",
        )
        .expect("書き込み失敗");
        fs::write(dir.join(STORE_MAP_RESOURCE), "Store,POG\n1001,8386824\n").expect("書き込み失敗");

        let dataset = load_dataset(&dir).expect("読み込みに失敗");
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.planogram_for_store("1001").expect("店舗がない"), "8386824");

        let _ = fs::remove_dir_all(&dir);
    }
}
