//! 表データパーサー
//!
//! 棚割りCSV・店舗対応CSVを読み、型付きレコードに変換する。
//! 区切りは単純なカンマ分割（引用符内のカンマには対応しない）。

use crate::error::{Error, Result};
use crate::types::{DataIssue, IssueKind, PlacementRecord, StoreMapping};
use crate::upc::normalize;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// "R02 C03" / "R2C3" 形式
    static ref PEG_RE: Regex = Regex::new(r"R(-?\d+)\s*C(-?\d+)").unwrap();
}

/// 棚割りデータの列名
pub mod columns {
    pub const POG: &str = "POG";
    pub const BAY: &str = "Bay";
    pub const PEG: &str = "Peg";
    pub const WIDTH: &str = "Width";
    pub const HEIGHT: &str = "Height";
    pub const UPC: &str = "UPC";
    pub const DESCRIPTION: &str = "ProductDescription";
    pub const STORE: &str = "Store";
}

/// ヘッダー付きの表
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    /// (元の行番号, セル)
    pub rows: Vec<(usize, Vec<String>)>,
}

impl Table {
    /// CSV文字列から読み込み
    ///
    /// 空行は無視する。行番号はヘッダーを1とした元テキストの行番号。
    pub fn from_csv_str(content: &str) -> Self {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let headers = match lines.next() {
            Some((_, header)) => split_cells(header.trim_start_matches('\u{feff}')),
            None => return Self::default(),
        };

        let rows = lines
            .map(|(i, line)| (i + 1, split_cells(line)))
            .collect();

        Self { headers, rows }
    }

    /// セルの二次元配列から読み込み（1行目がヘッダー）
    ///
    /// xlsx読み込みなどCSV以外の入力に使う。
    pub fn from_cells(cells: Vec<Vec<String>>) -> Self {
        let mut it = cells
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|c| !c.trim().is_empty()));

        let headers = match it.next() {
            Some((_, row)) => row.into_iter().map(|c| c.trim().to_string()).collect(),
            None => return Self::default(),
        };

        let rows = it
            .map(|(i, row)| (i + 1, row.into_iter().map(|c| c.trim().to_string()).collect()))
            .collect();

        Self { headers, rows }
    }

    /// 列名から列番号を取得
    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::Parse(format!("missing column: {}", name)))
    }
}

fn split_cells(line: &str) -> Vec<String> {
    line.split(',').map(|c| c.trim().to_string()).collect()
}

/// 棚割りデータの解析結果
#[derive(Debug, Clone, Default)]
pub struct ParsedPlacements {
    pub records: Vec<PlacementRecord>,
    pub issues: Vec<DataIssue>,
}

/// 棚割りデータをパース
///
/// 列数不足・Bay不正・Peg不正の行は捨てて [`DataIssue`] に記録する。
/// 幅・高さが読めない行は残し、既定値を使う旨を記録する。
pub fn parse_placements(table: &Table) -> Result<ParsedPlacements> {
    let pog_col = table.column(columns::POG)?;
    let bay_col = table.column(columns::BAY)?;
    let peg_col = table.column(columns::PEG)?;
    let width_col = table.column(columns::WIDTH)?;
    let height_col = table.column(columns::HEIGHT)?;
    let upc_col = table.column(columns::UPC)?;
    let desc_col = table.column(columns::DESCRIPTION)?;

    let mut parsed = ParsedPlacements::default();

    for (line, cells) in &table.rows {
        let line = *line;
        let upc = cells.get(upc_col).cloned().unwrap_or_default();

        if cells.len() < table.headers.len() {
            push_issue(&mut parsed.issues, line, IssueKind::ShortRow, &cells.join(","), &upc);
            continue;
        }

        let bay_raw = &cells[bay_col];
        let bay = match parse_bay(bay_raw) {
            Some(b) => b,
            None => {
                push_issue(&mut parsed.issues, line, IssueKind::UnparseableBay, bay_raw, &upc);
                continue;
            }
        };

        let peg_raw = &cells[peg_col];
        let (peg_row, peg_col_num) = match parse_peg(peg_raw) {
            Some(p) => p,
            None => {
                push_issue(&mut parsed.issues, line, IssueKind::UnparseablePeg, peg_raw, &upc);
                continue;
            }
        };

        let width_raw = &cells[width_col];
        let width_inches = parse_inches(width_raw);
        if width_inches.is_none() {
            push_issue(&mut parsed.issues, line, IssueKind::DefaultedWidth, width_raw, &upc);
        }

        let height_raw = &cells[height_col];
        let height_inches = parse_inches(height_raw);
        if height_inches.is_none() {
            push_issue(&mut parsed.issues, line, IssueKind::DefaultedHeight, height_raw, &upc);
        }

        parsed.records.push(PlacementRecord {
            planogram_id: cells[pog_col].clone(),
            bay,
            peg_row,
            peg_col: peg_col_num,
            width_inches,
            height_inches,
            normalized_code: normalize(&upc),
            product_code: upc,
            description: cells[desc_col].clone(),
        });
    }

    Ok(parsed)
}

fn push_issue(issues: &mut Vec<DataIssue>, line: usize, kind: IssueKind, value: &str, upc: &str) {
    tracing::warn!(line, %kind, value, upc, "placement data issue");
    issues.push(DataIssue {
        line,
        kind,
        value: value.to_string(),
        product_code: upc.to_string(),
    });
}

/// 店舗対応表をパース（列数不足の行は無視）
pub fn parse_store_map(table: &Table) -> Result<Vec<StoreMapping>> {
    let store_col = table.column(columns::STORE)?;
    let pog_col = table.column(columns::POG)?;

    Ok(table
        .rows
        .iter()
        .filter(|(_, cells)| cells.len() >= table.headers.len())
        .map(|(_, cells)| StoreMapping {
            store_id: cells[store_col].clone(),
            planogram_id: cells[pog_col].clone(),
        })
        .collect())
}

/// Peg文字列 "R02 C03" → (2, 3)
///
/// 0や負の値もそのまま返す（描画時に弾く）。
pub fn parse_peg(peg: &str) -> Option<(i32, i32)> {
    let caps = PEG_RE.captures(peg)?;
    let row = caps.get(1)?.as_str().parse().ok()?;
    let col = caps.get(2)?.as_str().parse().ok()?;
    Some((row, col))
}

/// 寸法文字列 "3.5 in" → 3.5
///
/// 空・数値でない・0以下は None。
pub fn parse_inches(value: &str) -> Option<f64> {
    let number = value.trim().trim_end_matches("in").trim();
    match number.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => None,
    }
}

/// Bay文字列 → ベイ番号（1以上）
///
/// 小数表記（"3.0"）はスプレッドシート出力でよくあるので整数に丸める。
pub fn parse_bay(value: &str) -> Option<u32> {
    let v = value.trim();
    if let Ok(n) = v.parse::<u32>() {
        return (n >= 1).then_some(n);
    }
    match v.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= 1.0 && f <= u32::MAX as f64 => Some(f as u32),
        _ => None,
    }
}

/// ファイル一覧（1行1ファイル名）をパース
pub fn parse_file_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEMENTS: &str = "\
POG,Bay,Peg,Width,Height,UPC,ProductDescription
8386824,1,R02 C03,3 in,6 in,00414123,Utility Hook
8386824,2,R10C5,2.5 in,,0071234,Zip Ties 8in

8386824,1,R03 C07,wide,4 in,555,Cable Clips
8386824,x,R01 C01,3 in,6 in,666,Bad Bay
8386824,1,top,3 in,6 in,777,Bad Peg
8386824,1
";

    #[test]
    fn test_parse_peg_formats() {
        assert_eq!(parse_peg("R02 C03"), Some((2, 3)));
        assert_eq!(parse_peg("R2C3"), Some((2, 3)));
        assert_eq!(parse_peg("R12   C40"), Some((12, 40)));
        assert_eq!(parse_peg("R00 C03"), Some((0, 3)));
        assert_eq!(parse_peg(""), None);
        assert_eq!(parse_peg("C03 R02"), None);
    }

    #[test]
    fn test_parse_inches() {
        assert_eq!(parse_inches("3 in"), Some(3.0));
        assert_eq!(parse_inches("2.75in"), Some(2.75));
        assert_eq!(parse_inches(" 4 "), Some(4.0));
        assert_eq!(parse_inches(""), None);
        assert_eq!(parse_inches("wide"), None);
        assert_eq!(parse_inches("0 in"), None);
        assert_eq!(parse_inches("-2 in"), None);
    }

    #[test]
    fn test_parse_bay() {
        assert_eq!(parse_bay("3"), Some(3));
        assert_eq!(parse_bay(" 12 "), Some(12));
        assert_eq!(parse_bay("4.0"), Some(4));
        assert_eq!(parse_bay("4.5"), None);
        assert_eq!(parse_bay("0"), None);
        assert_eq!(parse_bay("x"), None);
    }

    #[test]
    fn test_table_skips_blank_lines_and_tracks_line_numbers() {
        let table = Table::from_csv_str(PLACEMENTS);
        assert_eq!(table.headers.len(), 7);
        assert_eq!(table.rows.len(), 6);
        assert_eq!(table.rows[0].0, 2);
        // 空行を挟んだ後の行番号
        assert_eq!(table.rows[2].0, 5);
    }

    #[test]
    fn test_table_strips_bom() {
        let table = Table::from_csv_str("\u{feff}Store,POG\n1001,8386824\n");
        assert_eq!(table.column("Store").unwrap(), 0);
    }

    #[test]
    fn test_parse_placements() {
        let table = Table::from_csv_str(PLACEMENTS);
        let parsed = parse_placements(&table).unwrap();

        assert_eq!(parsed.records.len(), 3);
        let first = &parsed.records[0];
        assert_eq!(first.planogram_id, "8386824");
        assert_eq!(first.bay, 1);
        assert_eq!((first.peg_row, first.peg_col), (2, 3));
        assert_eq!(first.width_inches, Some(3.0));
        assert_eq!(first.product_code, "00414123");
        assert_eq!(first.normalized_code, "414123");
        assert_eq!(first.description, "Utility Hook");

        assert_eq!(parsed.records[1].height_inches, None);
        assert_eq!(parsed.records[2].width_inches, None);
    }

    #[test]
    fn test_parse_placements_reports_issues() {
        let table = Table::from_csv_str(PLACEMENTS);
        let parsed = parse_placements(&table).unwrap();
        let kinds: Vec<IssueKind> = parsed.issues.iter().map(|i| i.kind).collect();

        assert_eq!(
            kinds,
            vec![
                IssueKind::DefaultedHeight,
                IssueKind::DefaultedWidth,
                IssueKind::UnparseableBay,
                IssueKind::UnparseablePeg,
                IssueKind::ShortRow,
            ]
        );
        let width_issue = &parsed.issues[1];
        assert_eq!(width_issue.line, 5);
        assert_eq!(width_issue.value, "wide");
        assert_eq!(width_issue.product_code, "555");
    }

    #[test]
    fn test_parse_placements_missing_column() {
        let table = Table::from_csv_str("POG,Bay,UPC\n1,1,123\n");
        let err = parse_placements(&table).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("Peg"));
    }

    #[test]
    fn test_parse_store_map() {
        let table = Table::from_csv_str("Store,POG\n1001,8386824\n1002\n 1003 , 9000001 \n");
        let stores = parse_store_map(&table).unwrap();
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[1].store_id, "1003");
        assert_eq!(stores[1].planogram_id, "9000001");
    }

    #[test]
    fn test_table_from_cells() {
        let cells = vec![
            vec!["Store".to_string(), "POG".to_string()],
            vec![String::new(), String::new()],
            vec!["1001".to_string(), " 8386824".to_string()],
        ];
        let table = Table::from_cells(cells);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].0, 3);
        assert_eq!(table.rows[0].1[1], "8386824");
    }

    #[test]
    fn test_parse_file_list() {
        let files = parse_file_list("414123.jpg\r\n\n 8386824.pdf \n");
        assert_eq!(files, vec!["414123.jpg", "8386824.pdf"]);
    }
}
