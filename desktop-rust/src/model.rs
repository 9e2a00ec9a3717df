use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use pegboard_common::{CompletionTracker, Dataset, JsonFileStore, Session};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesktopSettings {
    pub data_dir: Option<PathBuf>,
}

/// 強調中の商品と消す時刻
#[derive(Debug, Clone, Copy)]
pub struct HighlightTimer {
    pub ticket_id: u64,
    pub clear_at: Instant,
}

#[derive(Default)]
pub struct AppState {
    pub data_dir: Option<PathBuf>,
    pub dataset: Option<Arc<Dataset>>,
    pub session: Option<Session>,
    pub tracker: Option<CompletionTracker<JsonFileStore>>,
    pub store_input: String,
    pub store_error: Option<String>,
    pub locate_input: String,
    pub search_input: String,
    pub highlight: Option<HighlightTimer>,
}
