//! データフォルダからの読み込み
//!
//! 3リソースを並列に読み、1つでも欠ければ致命的エラーにする（部分的な
//! データでは起動しない）。棚割りデータは CSV のほか xlsx も受け付ける。

use calamine::{open_workbook_auto, Data, Reader};
use pegboard_common::dataset::{FILE_INDEX_RESOURCE, PLACEMENTS_RESOURCE, STORE_MAP_RESOURCE};
use pegboard_common::parser::{parse_file_list, Table};
use pegboard_common::{Dataset, Error};
use std::path::{Path, PathBuf};

/// xlsx 版の棚割りデータ
pub const PLACEMENTS_XLSX_RESOURCE: &str = "allplanogramdata.xlsx";

/// データフォルダを読み込む
pub async fn load_dataset(dir: &Path) -> pegboard_common::Result<Dataset> {
    let files_path = dir.join(FILE_INDEX_RESOURCE);
    let store_map_path = dir.join(STORE_MAP_RESOURCE);
    let placements_path = placements_path(dir);

    let (files_text, placements, store_map_text) = tokio::try_join!(
        read_text(&files_path),
        read_placements(&placements_path),
        read_text(&store_map_path),
    )?;

    tracing::debug!(dir = %dir.display(), placements = %placements_path.display(), "resources read");

    Dataset::from_tables(
        parse_file_list(&files_text),
        &placements,
        &Table::from_csv_str(&store_map_text),
    )
}

/// 棚割りデータのパス（CSV 優先、なければ xlsx）
pub fn placements_path(dir: &Path) -> PathBuf {
    let csv = dir.join(PLACEMENTS_RESOURCE);
    if csv.exists() {
        return csv;
    }
    let xlsx = dir.join(PLACEMENTS_XLSX_RESOURCE);
    if xlsx.exists() {
        return xlsx;
    }
    csv
}

async fn read_text(path: &Path) -> pegboard_common::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::DataFetch(format!("{}: {}", path.display(), e)))
}

async fn read_placements(path: &Path) -> pegboard_common::Result<Table> {
    let is_xlsx = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);

    if !is_xlsx {
        return Ok(Table::from_csv_str(&read_text(path).await?));
    }

    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_workbook_table(&owned))
        .await
        .map_err(|e| Error::DataFetch(format!("{}: {}", path.display(), e)))?
}

/// ブックの先頭シートを表として読む
pub fn read_workbook_table(path: &Path) -> pegboard_common::Result<Table> {
    let fetch_error = |e: &dyn std::fmt::Display| Error::DataFetch(format!("{}: {}", path.display(), e));

    let mut workbook = open_workbook_auto(path).map_err(|e| fetch_error(&e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| fetch_error(&"workbook has no sheets"))?
        .map_err(|e| fetch_error(&e))?;

    let cells = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(Table::from_cells(cells))
}

/// セルを文字列に（数値の UPC・ベイは整数表記）
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
