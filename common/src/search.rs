//! 表示中ベイのテキスト検索
//!
//! スキャン照合と違いベイは移動しない。一致しない箱を薄く表示するだけ。

use crate::layout::BayLayout;
use crate::upc::normalize_search_term;
use std::collections::HashSet;

/// 検索フィルタ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    term: String,
    matches: HashSet<String>,
}

impl SearchFilter {
    /// 表示中の箱に検索語を当てる
    ///
    /// 正規化コードの部分一致、または小文字化した説明文の部分一致。
    /// 検索語が空（正規化後）ならフィルタなし。
    pub fn apply(layout: &BayLayout, raw_term: &str) -> Self {
        let term = normalize_search_term(raw_term.trim());
        if term.is_empty() {
            return Self::default();
        }

        let matches = layout
            .items
            .iter()
            .filter(|item| {
                item.record.normalized_code.to_lowercase().contains(&term)
                    || item.record.description_lower().contains(&term)
            })
            .map(|item| item.record.normalized_code.clone())
            .collect();

        Self { term, matches }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// 検索中か
    pub fn is_active(&self) -> bool {
        !self.term.is_empty()
    }

    /// 一致した（強調表示する）か
    pub fn is_match(&self, normalized_code: &str) -> bool {
        self.is_active() && self.matches.contains(normalized_code)
    }

    /// 薄く表示するか
    pub fn is_dimmed(&self, normalized_code: &str) -> bool {
        self.is_active() && !self.matches.contains(normalized_code)
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BoardSpec;
    use crate::types::PlacementRecord;

    fn layout() -> BayLayout {
        let records: Vec<PlacementRecord> = [("00414123", "Utility HOOK"), ("71234", "Zip Ties"), ("555", "Cable Clips")]
            .iter()
            .enumerate()
            .map(|(i, (code, desc))| PlacementRecord {
                planogram_id: "8386824".into(),
                bay: 1,
                peg_row: 1,
                peg_col: (i as i32) * 4 + 1,
                width_inches: None,
                height_inches: None,
                product_code: code.to_string(),
                normalized_code: crate::upc::normalize(code),
                description: desc.to_string(),
            })
            .collect();
        BayLayout::compute(&records, 1, &BoardSpec::default(), 16.0, 0)
    }

    #[test]
    fn test_search_by_code_substring() {
        let filter = SearchFilter::apply(&layout(), "4141");
        assert!(filter.is_active());
        assert!(filter.is_match("414123"));
        assert!(filter.is_dimmed("71234"));
        assert_eq!(filter.match_count(), 1);
    }

    #[test]
    fn test_search_by_description_case_insensitive() {
        let filter = SearchFilter::apply(&layout(), "hook");
        assert!(filter.is_match("414123"));
        let filter = SearchFilter::apply(&layout(), "ZIP");
        assert!(filter.is_match("71234"));
        assert!(filter.is_dimmed("555"));
    }

    #[test]
    fn test_search_term_leading_zeros_stripped() {
        let filter = SearchFilter::apply(&layout(), "00414");
        assert_eq!(filter.term(), "414");
        assert!(filter.is_match("414123"));
    }

    #[test]
    fn test_empty_search_clears_filter() {
        let filter = SearchFilter::apply(&layout(), "   ");
        assert!(!filter.is_active());
        assert!(!filter.is_dimmed("555"));
        assert!(!filter.is_match("555"));
    }

    #[test]
    fn test_search_without_match_dims_everything() {
        let filter = SearchFilter::apply(&layout(), "xyz");
        assert_eq!(filter.match_count(), 0);
        assert!(filter.is_dimmed("414123"));
        assert!(filter.is_dimmed("71234"));
    }
}
