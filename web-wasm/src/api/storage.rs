//! localStorage 版のキー・バリューストア
//!
//! 毎回 `window.localStorage` を引き直すので値は持たない。

use pegboard_common::storage::storage_error;
use pegboard_common::{KeyValueStore, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

fn local_storage() -> Result<web_sys::Storage> {
    web_sys::window()
        .ok_or_else(|| storage_error("no window"))?
        .local_storage()
        .map_err(|e| storage_error(super::loader::js_error_text(&e)))?
        .ok_or_else(|| storage_error("localStorage is not available"))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        local_storage().ok()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| storage_error(super::loader::js_error_text(&e)))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        local_storage()?
            .remove_item(key)
            .map_err(|e| storage_error(super::loader::js_error_text(&e)))
    }
}
