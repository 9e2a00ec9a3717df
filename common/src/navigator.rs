//! ベイ移動の状態機械
//!
//! 状態は棚割り内のベイ番号（昇順）。前後移動は端で止まる（巻き戻さない）。

use serde::{Deserialize, Serialize};

/// 遷移結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BayChange {
    /// 別のベイに移った
    Changed { from: u32, to: u32 },
    /// 端にいる・同じベイ・存在しないベイ
    Unchanged,
}

impl BayChange {
    pub fn is_changed(&self) -> bool {
        matches!(self, BayChange::Changed { .. })
    }
}

/// ベイナビゲーター
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BayNavigator {
    bays: Vec<u32>,
    index: usize,
}

impl BayNavigator {
    /// ベイ一覧から作成（並べ替え・重複除去する）。空なら None
    pub fn new(mut bays: Vec<u32>) -> Option<Self> {
        bays.sort_unstable();
        bays.dedup();
        if bays.is_empty() {
            return None;
        }
        Some(Self { bays, index: 0 })
    }

    pub fn current(&self) -> u32 {
        self.bays[self.index]
    }

    pub fn bays(&self) -> &[u32] {
        &self.bays
    }

    /// 現在位置（0始まり）
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.bays.len()
    }

    pub fn next(&mut self) -> BayChange {
        if self.is_last() {
            return BayChange::Unchanged;
        }
        self.move_to(self.index + 1)
    }

    pub fn prev(&mut self) -> BayChange {
        if self.is_first() {
            return BayChange::Unchanged;
        }
        self.move_to(self.index - 1)
    }

    /// 指定ベイへ直接移動（存在しなければ何もしない）
    pub fn go_to(&mut self, bay: u32) -> BayChange {
        match self.bays.binary_search(&bay) {
            Ok(i) => self.move_to(i),
            Err(_) => {
                tracing::debug!(bay, "go_to: bay not in planogram");
                BayChange::Unchanged
            }
        }
    }

    fn move_to(&mut self, index: usize) -> BayChange {
        let from = self.current();
        self.index = index;
        let to = self.current();
        if from == to {
            return BayChange::Unchanged;
        }
        tracing::debug!(from, to, "bay changed");
        BayChange::Changed { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_and_dedups() {
        let nav = BayNavigator::new(vec![12, 2, 5, 2]).unwrap();
        assert_eq!(nav.bays(), &[2, 5, 12]);
        assert_eq!(nav.current(), 2);
    }

    #[test]
    fn test_new_empty() {
        assert!(BayNavigator::new(vec![]).is_none());
    }

    #[test]
    fn test_next_and_prev() {
        let mut nav = BayNavigator::new(vec![1, 2, 3]).unwrap();
        assert_eq!(nav.next(), BayChange::Changed { from: 1, to: 2 });
        assert_eq!(nav.next(), BayChange::Changed { from: 2, to: 3 });
        assert_eq!(nav.prev(), BayChange::Changed { from: 3, to: 2 });
    }

    #[test]
    fn test_next_at_last_bay_is_noop() {
        let mut nav = BayNavigator::new(vec![1, 2]).unwrap();
        nav.next();
        assert!(nav.is_last());
        assert_eq!(nav.next(), BayChange::Unchanged);
        assert_eq!(nav.current(), 2);
    }

    #[test]
    fn test_prev_at_first_bay_is_noop() {
        let mut nav = BayNavigator::new(vec![1, 2]).unwrap();
        assert_eq!(nav.prev(), BayChange::Unchanged);
        assert_eq!(nav.current(), 1);
    }

    #[test]
    fn test_single_bay() {
        let mut nav = BayNavigator::new(vec![4]).unwrap();
        assert!(nav.is_first() && nav.is_last());
        assert_eq!(nav.next(), BayChange::Unchanged);
        assert_eq!(nav.prev(), BayChange::Unchanged);
    }

    #[test]
    fn test_go_to() {
        let mut nav = BayNavigator::new(vec![2, 5, 12]).unwrap();
        assert_eq!(nav.go_to(12), BayChange::Changed { from: 2, to: 12 });
        assert_eq!(nav.position(), 2);
        assert_eq!(nav.go_to(12), BayChange::Unchanged);
        assert_eq!(nav.go_to(7), BayChange::Unchanged);
        assert_eq!(nav.current(), 12);
    }
}
