//! 永続キー・バリューストア
//!
//! ブラウザでは localStorage、CLI・デスクトップでは JSON ファイルを使う。

use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// 完了済みUPC一覧のキー（JSON文字列配列）
pub const COMPLETION_KEY: &str = "harpa_complete";
/// 最後に選んだ店舗番号のキー（文字列そのまま）
pub const LAST_STORE_KEY: &str = "harpa_store";

/// 文字列キー・文字列値の永続ストア
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// メモリ上のストア（テスト・一時利用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// JSONファイルに全体を書き出すストア
///
/// 書き込みのたびにファイル全体を保存する。
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// ファイルを読み込む。存在しない・壊れている場合は空として扱う
    pub fn open(path: &Path) -> Self {
        let values = match File::open(path) {
            Ok(file) => match serde_json::from_reader(BufReader::new(file)) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "state file is corrupted, starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.values)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

/// 最後に選んだ店舗番号
pub fn load_last_store(store: &impl KeyValueStore) -> Option<String> {
    store
        .get(LAST_STORE_KEY)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn save_last_store(store: &mut impl KeyValueStore, store_id: &str) -> Result<()> {
    store.set(LAST_STORE_KEY, store_id.trim())
}

pub fn clear_last_store(store: &mut impl KeyValueStore) -> Result<()> {
    store.remove(LAST_STORE_KEY)
}

/// ストア実装用: 任意のエラーを `Error::Storage` に包む
pub fn storage_error(e: impl std::fmt::Display) -> Error {
    Error::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::default();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Some("v".to_string()));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_last_store_roundtrip() {
        let mut store = MemoryStore::default();
        assert_eq!(load_last_store(&store), None);
        save_last_store(&mut store, " 1001 ").unwrap();
        assert_eq!(store.get(LAST_STORE_KEY), Some("1001".to_string()));
        assert_eq!(load_last_store(&store), Some("1001".to_string()));
        clear_last_store(&mut store).unwrap();
        assert_eq!(load_last_store(&store), None);
    }

    #[test]
    fn test_blank_last_store_is_ignored() {
        let mut store = MemoryStore::default();
        store.set(LAST_STORE_KEY, "  ").unwrap();
        assert_eq!(load_last_store(&store), None);
    }

    #[test]
    fn test_json_file_store_persists() {
        let path = std::env::temp_dir().join(format!("pegboard-store-{}", std::process::id())).join("state.json");
        let _ = std::fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path);
        store.set(COMPLETION_KEY, "[\"414123\"]").unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get(COMPLETION_KEY), Some("[\"414123\"]".to_string()));

        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_json_file_store_corrupted_file_is_empty() {
        let dir = std::env::temp_dir().join(format!("pegboard-corrupt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get(COMPLETION_KEY), None);

        std::fs::remove_dir_all(&dir).ok();
    }
}
