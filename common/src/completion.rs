//! 補充済みチェックの管理
//!
//! 正規化UPCの集合を持ち、変更のたびに全体を永続化する。
//!
//! 集合は端末全体で1つ。店舗・棚割りごとに分けていないので、同じUPCを
//! 別の店舗で開くと完了済みとして表示される。仕様判断待ちのため現状維持。

use crate::error::Result;
use crate::storage::{KeyValueStore, COMPLETION_KEY};
use crate::types::PlacementRecord;
use crate::upc::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 進捗（完了数 / 総数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    /// 0.0〜1.0。総数0なら0.0
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }

    /// 四捨五入したパーセント。総数0なら0
    pub fn percent(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.done, self.total)
    }
}

/// 完了済み集合
#[derive(Debug, Clone)]
pub struct CompletionTracker<S: KeyValueStore> {
    store: S,
    done: BTreeSet<String>,
}

impl<S: KeyValueStore> CompletionTracker<S> {
    /// ストアから読み込む（壊れていれば空から始める）
    pub fn load(store: S) -> Self {
        let done = match store.get(COMPLETION_KEY) {
            Some(json) => match serde_json::from_str::<Vec<String>>(&json) {
                Ok(codes) => codes
                    .iter()
                    .map(|c| normalize(c))
                    .filter(|c| !c.is_empty())
                    .collect(),
                Err(e) => {
                    tracing::warn!(error = %e, "completion set is corrupted, starting empty");
                    BTreeSet::new()
                }
            },
            None => BTreeSet::new(),
        };

        Self { store, done }
    }

    pub fn is_done(&self, code: &str) -> bool {
        self.done.contains(&normalize(code))
    }

    /// 完了状態を反転して保存。反転後の状態を返す
    pub fn toggle(&mut self, code: &str) -> Result<bool> {
        let code = normalize(code);
        if code.is_empty() {
            return Ok(false);
        }
        let now_done = if self.done.remove(&code) {
            false
        } else {
            self.done.insert(code);
            true
        };
        self.persist()?;
        Ok(now_done)
    }

    /// 未完了なら完了にして保存。新たに完了にした場合 true
    pub fn mark_done(&mut self, code: &str) -> Result<bool> {
        let code = normalize(code);
        if code.is_empty() || self.done.contains(&code) {
            return Ok(false);
        }
        self.done.insert(code);
        self.persist()?;
        Ok(true)
    }

    /// レコード群のうち完了済みの数
    pub fn progress<'a>(&self, records: impl IntoIterator<Item = &'a PlacementRecord>) -> Progress {
        let mut progress = Progress::default();
        for r in records {
            progress.total += 1;
            if self.done.contains(&r.normalized_code) {
                progress.done += 1;
            }
        }
        progress
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.done.iter().map(|s| s.as_str())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn persist(&mut self) -> Result<()> {
        let codes: Vec<&str> = self.done.iter().map(|s| s.as_str()).collect();
        let json = serde_json::to_string(&codes)?;
        self.store.set(COMPLETION_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn record(code: &str) -> PlacementRecord {
        PlacementRecord {
            planogram_id: "8386824".into(),
            bay: 1,
            peg_row: 1,
            peg_col: 1,
            width_inches: None,
            height_inches: None,
            product_code: code.into(),
            normalized_code: normalize(code),
            description: String::new(),
        }
    }

    #[test]
    fn test_toggle_persists_and_survives_reload() {
        let mut tracker = CompletionTracker::load(MemoryStore::default());
        assert!(tracker.toggle("414123").unwrap());

        let reloaded = CompletionTracker::load(tracker.store().clone());
        assert!(reloaded.is_done("414123"));
        assert!(reloaded.is_done("00414123"));
    }

    #[test]
    fn test_toggle_twice_returns_to_absent() {
        let mut tracker = CompletionTracker::load(MemoryStore::default());
        assert!(tracker.toggle("X").unwrap());
        assert!(!tracker.toggle("X").unwrap());
        assert!(!tracker.is_done("X"));

        let reloaded = CompletionTracker::load(tracker.store().clone());
        assert!(!reloaded.is_done("X"));
        assert_eq!(tracker.store().get(COMPLETION_KEY), Some("[]".to_string()));
    }

    #[test]
    fn test_mark_done_is_idempotent() {
        let mut tracker = CompletionTracker::load(MemoryStore::default());
        assert!(tracker.mark_done("0071234").unwrap());
        assert!(!tracker.mark_done("71234").unwrap());
        assert_eq!(tracker.len(), 1);
        assert!(!tracker.mark_done("").unwrap());
    }

    #[test]
    fn test_load_normalizes_stored_codes() {
        let mut store = MemoryStore::default();
        store.set(COMPLETION_KEY, r#"["00414123", "555", ""]"#).unwrap();
        let tracker = CompletionTracker::load(store);
        assert_eq!(tracker.codes().collect::<Vec<_>>(), vec!["414123", "555"]);
    }

    #[test]
    fn test_load_corrupted_json_starts_empty() {
        let mut store = MemoryStore::default();
        store.set(COMPLETION_KEY, "not json").unwrap();
        let tracker = CompletionTracker::load(store);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_progress() {
        let mut tracker = CompletionTracker::load(MemoryStore::default());
        tracker.toggle("1").unwrap();
        let records = vec![record("1"), record("2"), record("3")];
        let progress = tracker.progress(&records);
        assert_eq!(progress, Progress { done: 1, total: 3 });
        assert_eq!(progress.percent(), 33);
        assert_eq!(progress.to_string(), "1 / 3");
    }

    #[test]
    fn test_progress_empty_is_zero_percent() {
        let tracker = CompletionTracker::load(MemoryStore::default());
        let progress = tracker.progress(std::iter::empty());
        assert_eq!(progress, Progress { done: 0, total: 0 });
        assert_eq!(progress.ratio(), 0.0);
        assert_eq!(progress.percent(), 0);
    }

    #[test]
    fn test_percent_rounds() {
        assert_eq!(Progress { done: 2, total: 3 }.percent(), 67);
        assert_eq!(Progress { done: 3, total: 3 }.percent(), 100);
    }

    #[test]
    fn test_completion_is_global_across_planograms() {
        // 店舗・棚割りで分けていない（既知の制限）
        let mut tracker = CompletionTracker::load(MemoryStore::default());
        tracker.toggle("555").unwrap();
        let mut other = record("555");
        other.planogram_id = "9000001".into();
        assert_eq!(tracker.progress([&other]).done, 1);
    }
}
