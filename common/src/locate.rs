//! スキャン・入力コードの照合
//!
//! 表示中のベイだけでなく、棚割り全体から一致する商品を探す。

use crate::types::PlacementRecord;
use crate::upc::normalize;
use std::collections::HashMap;

/// 照合結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchResult<'a> {
    Found(&'a PlacementRecord),
    NotFound,
}

impl<'a> MatchResult<'a> {
    pub fn record(&self) -> Option<&'a PlacementRecord> {
        match self {
            MatchResult::Found(r) => Some(r),
            MatchResult::NotFound => None,
        }
    }
}

/// 入力コードを正規化し、レコード列から最初に一致したものを返す
///
/// 同じ棚割り内に同じコードが複数あった場合の優先順位は元データに
/// 定義がないため、読み込み順で最初のものを採用する。
pub fn find_match<'a>(
    records: impl IntoIterator<Item = &'a PlacementRecord>,
    raw_input: &str,
) -> MatchResult<'a> {
    let code = normalize(raw_input);
    if code.is_empty() {
        return MatchResult::NotFound;
    }

    records
        .into_iter()
        .find(|r| r.normalized_code == code)
        .map_or(MatchResult::NotFound, MatchResult::Found)
}

/// 2回以上現れる正規化コード（最初に現れた順）
pub fn duplicate_codes<'a>(records: impl IntoIterator<Item = &'a PlacementRecord>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();

    for r in records {
        if r.normalized_code.is_empty() {
            continue;
        }
        let count = counts.entry(r.normalized_code.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(r.normalized_code.clone());
        }
    }

    order
}
