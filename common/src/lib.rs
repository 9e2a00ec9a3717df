//! Pegboard Restock Common Library
//!
//! CLI・Web(WASM)・デスクトップで共有するペグボード補充支援のコア。
//! 入出力（fetch・ファイル・カメラ）は各シェルが持ち、ここは状態と計算だけを扱う。

pub mod error;
pub mod upc;
pub mod types;
pub mod parser;
pub mod file_index;
pub mod dataset;
pub mod layout;
pub mod navigator;
pub mod locate;
pub mod search;
pub mod storage;
pub mod completion;
pub mod scanner;
pub mod session;
pub mod export;

pub use error::{Error, Result};
pub use upc::{normalize, normalize_search_term};
pub use types::{DataIssue, IssueKind, PlacementRecord, StoreMapping};
pub use parser::Table;
pub use file_index::FileIndex;
pub use dataset::{Dataset, FILE_INDEX_RESOURCE, PLACEMENTS_RESOURCE, STORE_MAP_RESOURCE};
pub use layout::{BayLayout, BoardSpec, LaidOutItem, PegGeometry, PointPx, RectPx, SizePx};
pub use navigator::{BayChange, BayNavigator};
pub use locate::{find_match, MatchResult};
pub use search::SearchFilter;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use completion::{CompletionTracker, Progress};
pub use scanner::{CameraFeed, CameraLease, ScannerGate};
pub use session::{Highlight, HighlightTicket, LocateOutcome, Session, SessionState, ViewConfig, HIGHLIGHT_DURATION_MS};
