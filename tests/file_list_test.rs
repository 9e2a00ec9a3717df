//! ファイル一覧生成の統合テスト

use pegboard_common::FileIndex;
use pegboard_common::parser::parse_file_list;
use pegboard_restock::file_list;
use tempfile::tempdir;

#[test]
fn test_scan_assets_recursive_and_sorted() {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path();
    std::fs::create_dir_all(root.join("images")).unwrap();
    std::fs::create_dir_all(root.join(".git")).unwrap();

    std::fs::write(root.join("images/414123.jpg"), b"").unwrap();
    std::fs::write(root.join("images/71234.PNG"), b"").unwrap();
    std::fs::write(root.join("8386824.pdf"), b"").unwrap();
    std::fs::write(root.join("notes.txt"), b"").unwrap();
    std::fs::write(root.join(".git/config.png"), b"").unwrap();

    let files = file_list::scan_assets(root).expect("走査失敗");
    assert_eq!(
        files,
        vec![
            "8386824.pdf".to_string(),
            "images/414123.jpg".to_string(),
            "images/71234.PNG".to_string(),
        ]
    );
}

#[test]
fn test_written_list_feeds_file_index() {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path();
    std::fs::write(root.join("00414123_front.jpg"), b"").unwrap();
    std::fs::write(root.join("8386824.pdf"), b"").unwrap();

    let files = file_list::scan_assets(root).expect("走査失敗");
    let output = root.join("githubfiles.csv");
    file_list::write_file_list(&files, &output).expect("書き込み失敗");

    let content = std::fs::read_to_string(&output).unwrap();
    let index = FileIndex::new(parse_file_list(&content));
    assert_eq!(index.image_for("414123"), Some("00414123_front.jpg"));
    assert_eq!(index.pdf_for("8386824"), Some("8386824.pdf"));
}

#[test]
fn test_empty_folder_writes_empty_list() {
    let dir = tempdir().expect("Failed to create temp dir");
    let files = file_list::scan_assets(dir.path()).expect("走査失敗");
    assert!(files.is_empty());

    let output = dir.path().join("githubfiles.csv");
    file_list::write_file_list(&files, &output).unwrap();
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
}
