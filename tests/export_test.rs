//! チェックリスト出力の統合テスト

use pegboard_common::{CompletionTracker, Dataset, MemoryStore};
use pegboard_restock::export;
use tempfile::tempdir;

fn dataset() -> Dataset {
    Dataset::from_sources(
        "",
        "POG,Bay,Peg,Width,Height,UPC,ProductDescription\n\
         8386824,2,R02 C03,3 in,6 in,00414123,Utility Hook\n\
         8386824,5,R01 C01,,,555,Cable Clips\n",
        "Store,POG\n1001,8386824\n",
    )
    .expect("データ構築失敗")
}

#[test]
fn test_export_checklist() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = export::output_path(Some(dir.path()), "8386824");

    let mut tracker = CompletionTracker::load(MemoryStore::default());
    tracker.toggle("414123").unwrap();

    let result = export::export_checklist(&dataset(), "8386824", &tracker, &output_path);
    assert!(result.is_ok(), "Excel生成に失敗: {:?}", result.err());
    assert!(output_path.exists(), "Excelファイルが作成されていない");

    let metadata = std::fs::metadata(&output_path).expect("ファイルメタデータ取得失敗");
    assert!(metadata.len() > 0, "Excelファイルが空");
}

#[test]
fn test_export_creates_parent_dir() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("out").join("list.xlsx");
    let tracker = CompletionTracker::load(MemoryStore::default());

    export::export_checklist(&dataset(), "8386824", &tracker, &output_path).expect("出力失敗");
    assert!(output_path.exists());
}

#[test]
fn test_export_unknown_planogram() {
    let dir = tempdir().expect("Failed to create temp dir");
    let tracker = CompletionTracker::load(MemoryStore::default());
    let result = export::export_checklist(&dataset(), "0000", &tracker, &dir.path().join("x.xlsx"));
    assert!(matches!(result, Err(pegboard_restock::error::PegboardError::ExcelGeneration(_))));
}
