//! 棚割りデータの型定義
//!
//! CLI・Web(WASM)・デスクトップで共有される型:
//! - PlacementRecord: 1商品がどのベイのどの穴に掛かるか
//! - StoreMapping: 店舗 → 棚割り(POG)
//! - DataIssue: 読み込み時に見つかったデータ品質の問題

use serde::{Deserialize, Serialize};

/// 幅が未指定・不正のときの既定値（インチ）
pub const DEFAULT_WIDTH_INCHES: f64 = 3.0;
/// 高さが未指定・不正のときの既定値（インチ）
pub const DEFAULT_HEIGHT_INCHES: f64 = 6.0;

/// 商品1件の掛け位置
///
/// 読み込み時に一度だけ作られ、以後変更しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRecord {
    pub planogram_id: String,
    /// ベイ番号（1始まり）
    pub bay: u32,
    /// フック左脚の穴の行（1始まり、上から）
    pub peg_row: i32,
    /// フック左脚の穴の列（1始まり、左から）
    pub peg_col: i32,
    /// 宣言された幅。未指定・不正なら None
    pub width_inches: Option<f64>,
    /// 宣言された高さ。未指定・不正なら None
    pub height_inches: Option<f64>,
    /// 元のUPC文字列（先頭ゼロ・空白を含みうる）
    pub product_code: String,
    /// 正規化済みUPC
    pub normalized_code: String,
    pub description: String,
}

impl PlacementRecord {
    /// 描画に使う幅（既定値適用済み）と、既定値を使ったかどうか
    pub fn width_or_default(&self) -> (f64, bool) {
        match self.width_inches {
            Some(w) => (w, false),
            None => (DEFAULT_WIDTH_INCHES, true),
        }
    }

    /// 描画に使う高さ（既定値適用済み）と、既定値を使ったかどうか
    pub fn height_or_default(&self) -> (f64, bool) {
        match self.height_inches {
            Some(h) => (h, false),
            None => (DEFAULT_HEIGHT_INCHES, true),
        }
    }

    /// 説明文の小文字版（テキスト検索用）
    pub fn description_lower(&self) -> String {
        self.description.to_lowercase()
    }
}

/// 店舗 → 棚割りの対応
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMapping {
    pub store_id: String,
    pub planogram_id: String,
}

/// データ品質の問題の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    /// 幅が読めず既定値を使う
    DefaultedWidth,
    /// 高さが読めず既定値を使う
    DefaultedHeight,
    /// Peg列が読めず行を捨てた
    UnparseablePeg,
    /// Bay列が読めず行を捨てた
    UnparseableBay,
    /// 列数不足で行を捨てた
    ShortRow,
    /// Peg座標が1未満で描画から除外した
    InvalidPeg,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::DefaultedWidth => write!(f, "width defaulted"),
            IssueKind::DefaultedHeight => write!(f, "height defaulted"),
            IssueKind::UnparseablePeg => write!(f, "unparseable peg"),
            IssueKind::UnparseableBay => write!(f, "unparseable bay"),
            IssueKind::ShortRow => write!(f, "short row"),
            IssueKind::InvalidPeg => write!(f, "invalid peg"),
        }
    }
}

/// 読み込み・描画時に記録するデータ品質の問題
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataIssue {
    /// データ行番号（ヘッダーを1行目とした行番号）。描画時の問題は 0
    pub line: usize,
    pub kind: IssueKind,
    /// 該当セルの生の値
    pub value: String,
    pub product_code: String,
}

impl std::fmt::Display for DataIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: {} ({:?}) UPC {}",
            self.line, self.kind, self.value, self.product_code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(width: Option<f64>, height: Option<f64>) -> PlacementRecord {
        PlacementRecord {
            planogram_id: "8386824".into(),
            bay: 1,
            peg_row: 1,
            peg_col: 1,
            width_inches: width,
            height_inches: height,
            product_code: "00414123".into(),
            normalized_code: "414123".into(),
            description: "Utility HOOK".into(),
        }
    }

    #[test]
    fn test_dimension_defaults_are_flagged() {
        let r = record(None, None);
        assert_eq!(r.width_or_default(), (DEFAULT_WIDTH_INCHES, true));
        assert_eq!(r.height_or_default(), (DEFAULT_HEIGHT_INCHES, true));
    }

    #[test]
    fn test_declared_dimensions_are_used() {
        let r = record(Some(4.5), Some(9.0));
        assert_eq!(r.width_or_default(), (4.5, false));
        assert_eq!(r.height_or_default(), (9.0, false));
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_string(&record(Some(3.0), None)).unwrap();
        assert!(json.contains("\"planogramId\":\"8386824\""));
        assert!(json.contains("\"normalizedCode\":\"414123\""));
        assert!(json.contains("\"heightInches\":null"));
    }

    #[test]
    fn test_issue_display() {
        let issue = DataIssue {
            line: 7,
            kind: IssueKind::DefaultedWidth,
            value: "wide".into(),
            product_code: "0123".into(),
        };
        assert_eq!(issue.to_string(), "line 7: width defaulted (\"wide\") UPC 0123");
    }
}
