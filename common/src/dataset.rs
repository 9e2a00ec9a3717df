//! 読み込み済みデータ一式
//!
//! ファイル一覧・棚割りデータ・店舗対応表の3リソースをまとめて保持する。
//! 読み込み後は変更しない。再読み込み時は作り直す。

use crate::error::{Error, Result};
use crate::file_index::FileIndex;
use crate::parser::{self, Table};
use crate::types::{DataIssue, PlacementRecord, StoreMapping};
use std::collections::BTreeSet;

/// ファイル一覧のリソース名
pub const FILE_INDEX_RESOURCE: &str = "githubfiles.csv";
/// 棚割りデータのリソース名
pub const PLACEMENTS_RESOURCE: &str = "allplanogramdata.csv";
/// 店舗対応表のリソース名
pub const STORE_MAP_RESOURCE: &str = "Store_POG_Mapping.csv";

/// 読み込み済みデータ
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub file_index: FileIndex,
    pub records: Vec<PlacementRecord>,
    pub stores: Vec<StoreMapping>,
    /// 読み込み時のデータ品質の問題
    pub issues: Vec<DataIssue>,
}

impl Dataset {
    /// 3リソースのテキストから構築
    pub fn from_sources(files_text: &str, placements_text: &str, store_map_text: &str) -> Result<Self> {
        Self::from_tables(
            parser::parse_file_list(files_text),
            &Table::from_csv_str(placements_text),
            &Table::from_csv_str(store_map_text),
        )
    }

    /// パース済みの表から構築
    pub fn from_tables(files: Vec<String>, placements: &Table, store_map: &Table) -> Result<Self> {
        let parsed = parser::parse_placements(placements)?;
        let stores = parser::parse_store_map(store_map)?;

        tracing::info!(
            files = files.len(),
            records = parsed.records.len(),
            stores = stores.len(),
            issues = parsed.issues.len(),
            "dataset loaded"
        );

        Ok(Self {
            file_index: FileIndex::new(files),
            records: parsed.records,
            stores,
            issues: parsed.issues,
        })
    }

    /// 店舗番号から棚割りIDを引く
    pub fn planogram_for_store(&self, store_id: &str) -> Result<&str> {
        let store_id = store_id.trim();
        self.stores
            .iter()
            .find(|s| s.store_id == store_id)
            .map(|s| s.planogram_id.as_str())
            .ok_or_else(|| Error::StoreNotFound(store_id.to_string()))
    }

    /// 棚割りに属する全レコード（読み込み順）
    pub fn records_for_planogram<'a>(
        &'a self,
        planogram_id: &'a str,
    ) -> impl Iterator<Item = &'a PlacementRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.planogram_id == planogram_id)
    }

    /// 棚割りの1ベイ分のレコード（読み込み順）
    pub fn records_for_bay<'a>(
        &'a self,
        planogram_id: &'a str,
        bay: u32,
    ) -> impl Iterator<Item = &'a PlacementRecord> + 'a {
        self.records_for_planogram(planogram_id)
            .filter(move |r| r.bay == bay)
    }

    /// 棚割りのベイ番号一覧（昇順・重複なし）
    ///
    /// レコードが1件もなければ `NoBaysForPlanogram`。
    pub fn bays_for_planogram(&self, planogram_id: &str) -> Result<Vec<u32>> {
        let bays: BTreeSet<u32> = self
            .records_for_planogram(planogram_id)
            .map(|r| r.bay)
            .collect();

        if bays.is_empty() {
            return Err(Error::NoBaysForPlanogram(planogram_id.to_string()));
        }
        Ok(bays.into_iter().collect())
    }

    /// 店舗番号一覧（対応表の順）
    pub fn store_ids(&self) -> Vec<&str> {
        self.stores.iter().map(|s| s.store_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILES: &str = "414123.jpg\n8386824.pdf\n";
    const PLACEMENTS: &str = "\
POG,Bay,Peg,Width,Height,UPC,ProductDescription
8386824,5,R02 C03,3 in,6 in,00414123,Utility Hook
8386824,2,R10 C05,2 in,4 in,71234,Zip Ties
8386824,12,R01 C01,3 in,6 in,555,Clips
9000001,1,R01 C01,3 in,6 in,777,Other Store Item
";
    const STORES: &str = "Store,POG\n1001,8386824\n1002,9000001\n1003,7777777\n";

    fn dataset() -> Dataset {
        Dataset::from_sources(FILES, PLACEMENTS, STORES).unwrap()
    }

    #[test]
    fn test_from_sources() {
        let ds = dataset();
        assert_eq!(ds.file_index.len(), 2);
        assert_eq!(ds.records.len(), 4);
        assert_eq!(ds.stores.len(), 3);
        assert!(ds.issues.is_empty());
    }

    #[test]
    fn test_planogram_for_store() {
        let ds = dataset();
        assert_eq!(ds.planogram_for_store("1001").unwrap(), "8386824");
        assert_eq!(ds.planogram_for_store(" 1002 ").unwrap(), "9000001");
        assert!(matches!(ds.planogram_for_store("4242"), Err(Error::StoreNotFound(_))));
    }

    #[test]
    fn test_bays_sorted_numerically() {
        let ds = dataset();
        assert_eq!(ds.bays_for_planogram("8386824").unwrap(), vec![2, 5, 12]);
    }

    #[test]
    fn test_bays_for_empty_planogram() {
        let ds = dataset();
        let err = ds.bays_for_planogram("7777777").unwrap_err();
        assert!(matches!(err, Error::NoBaysForPlanogram(ref p) if p == "7777777"));
    }

    #[test]
    fn test_records_for_bay() {
        let ds = dataset();
        let codes: Vec<&str> = ds
            .records_for_bay("8386824", 5)
            .map(|r| r.normalized_code.as_str())
            .collect();
        assert_eq!(codes, vec!["414123"]);
        assert_eq!(ds.records_for_planogram("9000001").count(), 1);
    }

    #[test]
    fn test_missing_column_is_parse_error() {
        let err = Dataset::from_sources(FILES, "POG,Bay\n1,1\n", STORES).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
