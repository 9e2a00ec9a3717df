//! ペグボード座標レイアウトモジュール
//!
//! 棚割りレコードの穴座標（行・列）と寸法（インチ）を画面ピクセルに変換する。
//! 穴は1インチ間隔なので、1穴 = 1インチ = `scale` ピクセル。
//!
//! ## 変換の考え方
//! - 穴 (col, row) のセル左上: `((col-1)*scale, (row-1)*scale)`
//! - フック位置の印: セル中心
//! - フックは col と col+1 の2穴に掛かり、商品は2穴の中点を中心に
//!   行の中心から下へぶら下がる
//!
//! すべて `(record, scale, board)` の純関数。リサイズやベイ切替のたびに
//! 何度計算し直しても同じ結果になる。

use crate::types::{DataIssue, IssueKind, PlacementRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================
// 盤面の定数
// ============================================

/// 盤面の幅（穴数）既定値
pub const DEFAULT_BOARD_WIDTH_HOLES: u32 = 46;
/// 盤面の高さ（穴数）既定値
pub const DEFAULT_BOARD_HEIGHT_HOLES: u32 = 64;
/// ビューポート幅から差し引く余白（px）
pub const DEFAULT_VIEWPORT_MARGIN_PX: f64 = 20.0;
/// 極端に狭い画面でも潰れないための最小倍率（px/穴）
pub const MIN_SCALE_FACTOR: f64 = 1.0;

/// ペグボード盤面の大きさ（穴数）
///
/// データから求めず、設置環境ごとの定数として与える（46×64、48×72 など）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSpec {
    width_holes: u32,
    height_holes: u32,
}

impl Default for BoardSpec {
    fn default() -> Self {
        Self {
            width_holes: DEFAULT_BOARD_WIDTH_HOLES,
            height_holes: DEFAULT_BOARD_HEIGHT_HOLES,
        }
    }
}

impl BoardSpec {
    /// 0は1に切り上げる
    pub fn new(width_holes: u32, height_holes: u32) -> Self {
        Self {
            width_holes: width_holes.max(1),
            height_holes: height_holes.max(1),
        }
    }

    pub fn width_holes(&self) -> u32 {
        self.width_holes
    }

    pub fn height_holes(&self) -> u32 {
        self.height_holes
    }

    /// 盤面のピクセルサイズ
    pub fn board_size_px(&self, scale: f64) -> SizePx {
        SizePx {
            width: self.width_holes as f64 * scale,
            height: self.height_holes as f64 * scale,
        }
    }

    /// 盤面の幅が画面幅に収まる倍率（px/穴）
    ///
    /// `(viewport_width - margin) / width_holes`。下限は [`MIN_SCALE_FACTOR`]。
    pub fn scale_for_viewport(&self, viewport_width: f64, margin: f64) -> f64 {
        let usable = viewport_width - margin;
        let scale = usable / self.width_holes as f64;
        if scale.is_finite() {
            scale.max(MIN_SCALE_FACTOR)
        } else {
            MIN_SCALE_FACTOR
        }
    }
}

// ============================================
// ピクセル座標
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointPx {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SizePx {
    pub width: f64,
    pub height: f64,
}

/// 商品の箱（左上 + 大きさ）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectPx {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RectPx {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, p: PointPx) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }
}

/// 1レコード分の配置結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PegGeometry {
    /// フック位置の印（左脚の穴の中心）
    pub support: PointPx,
    /// 商品の箱
    pub rect: RectPx,
    /// 幅に既定値を使った
    pub used_default_width: bool,
    /// 高さに既定値を使った
    pub used_default_height: bool,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("peg R{row} C{col} is outside the board (holes start at 1)")]
    InvalidPeg { row: i32, col: i32 },
}

/// レコード1件をピクセル座標に変換
pub fn layout_record(record: &PlacementRecord, scale: f64) -> Result<PegGeometry, LayoutError> {
    if record.peg_row < 1 || record.peg_col < 1 {
        return Err(LayoutError::InvalidPeg {
            row: record.peg_row,
            col: record.peg_col,
        });
    }

    let (width_in, used_default_width) = record.width_or_default();
    let (height_in, used_default_height) = record.height_or_default();

    // 左脚の穴を含むセルの左上
    let origin_x = (record.peg_col - 1) as f64 * scale;
    let origin_y = (record.peg_row - 1) as f64 * scale;

    let support = PointPx {
        x: origin_x + scale / 2.0,
        y: origin_y + scale / 2.0,
    };

    // 2穴の中点 = 左脚セルの左端から1穴分右
    let center_x = origin_x + scale;
    let width = width_in * scale;
    let height = height_in * scale;

    let rect = RectPx {
        left: center_x - width / 2.0,
        top: origin_y + scale / 2.0,
        width,
        height,
    };

    Ok(PegGeometry {
        support,
        rect,
        used_default_width,
        used_default_height,
    })
}

// ============================================
// ベイ単位のレイアウト
// ============================================

/// 配置済み商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaidOutItem {
    pub record: PlacementRecord,
    pub geometry: PegGeometry,
}

/// 1ベイ分の描画データ
///
/// 描画側はこれだけを見て箱と印を置く。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BayLayout {
    pub bay: u32,
    /// ベイ切替・リサイズごとに増える世代番号
    pub generation: u64,
    pub scale: f64,
    pub board: SizePx,
    pub items: Vec<LaidOutItem>,
    /// 座標が不正で描画しなかったレコード
    pub skipped: Vec<DataIssue>,
}

impl BayLayout {
    /// レコード群をレイアウト（不正な座標は除外して記録）
    pub fn compute<'a>(
        records: impl IntoIterator<Item = &'a PlacementRecord>,
        bay: u32,
        board: &BoardSpec,
        scale: f64,
        generation: u64,
    ) -> Self {
        let mut items = Vec::new();
        let mut skipped = Vec::new();

        for record in records {
            match layout_record(record, scale) {
                Ok(geometry) => items.push(LaidOutItem {
                    record: record.clone(),
                    geometry,
                }),
                Err(err) => {
                    tracing::warn!(
                        bay,
                        upc = %record.product_code,
                        error = %err,
                        "skipping record with invalid peg"
                    );
                    skipped.push(DataIssue {
                        line: 0,
                        kind: IssueKind::InvalidPeg,
                        value: format!("R{} C{}", record.peg_row, record.peg_col),
                        product_code: record.product_code.clone(),
                    });
                }
            }
        }

        Self {
            bay,
            generation,
            scale,
            board: board.board_size_px(scale),
            items,
            skipped,
        }
    }

    /// 正規化コードで配置済み商品を探す
    pub fn item(&self, normalized_code: &str) -> Option<&LaidOutItem> {
        self.items
            .iter()
            .find(|i| i.record.normalized_code == normalized_code)
    }

    /// 座標にある商品（重なっていれば後に描いた方）
    pub fn hit_test(&self, p: PointPx) -> Option<&LaidOutItem> {
        self.items.iter().rev().find(|i| i.geometry.rect.contains(p))
    }

    /// 既定寸法を使った商品の数
    pub fn defaulted_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.geometry.used_default_width || i.geometry.used_default_height)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: i32, col: i32, width: Option<f64>, height: Option<f64>) -> PlacementRecord {
        PlacementRecord {
            planogram_id: "8386824".into(),
            bay: 1,
            peg_row: row,
            peg_col: col,
            width_inches: width,
            height_inches: height,
            product_code: format!("00{}{}", row, col),
            normalized_code: format!("{}{}", row, col),
            description: "Item".into(),
        }
    }

    #[test]
    fn test_board_size_px() {
        let board = BoardSpec::default();
        let size = board.board_size_px(16.0);
        assert_eq!(size.width, 736.0);
        assert_eq!(size.height, 1024.0);
    }

    #[test]
    fn test_scale_for_viewport() {
        let board = BoardSpec::default();
        assert_eq!(board.scale_for_viewport(756.0, 20.0), 16.0);
        let wide = BoardSpec::new(48, 72);
        assert_eq!(wide.scale_for_viewport(500.0, 20.0), 10.0);
    }

    #[test]
    fn test_scale_for_tiny_viewport_is_clamped() {
        let board = BoardSpec::default();
        assert_eq!(board.scale_for_viewport(10.0, 20.0), MIN_SCALE_FACTOR);
        assert_eq!(board.scale_for_viewport(f64::NAN, 20.0), MIN_SCALE_FACTOR);
    }

    #[test]
    fn test_board_spec_rejects_zero() {
        let board = BoardSpec::new(0, 0);
        assert_eq!(board.width_holes(), 1);
        assert_eq!(board.height_holes(), 1);
    }

    #[test]
    fn test_layout_geometry_example() {
        let geometry = layout_record(&record(2, 3, Some(3.0), Some(6.0)), 16.0).unwrap();
        assert_eq!(geometry.support, PointPx { x: 40.0, y: 24.0 });
        assert_eq!(
            geometry.rect,
            RectPx { left: 24.0, top: 24.0, width: 48.0, height: 96.0 }
        );
        assert!(!geometry.used_default_width);
        assert!(!geometry.used_default_height);
    }

    #[test]
    fn test_layout_top_left_hole() {
        let geometry = layout_record(&record(1, 1, Some(2.0), Some(4.0)), 10.0).unwrap();
        assert_eq!(geometry.support, PointPx { x: 5.0, y: 5.0 });
        // 中心 x = 10, 幅 20 → left = 0
        assert_eq!(geometry.rect.left, 0.0);
        assert_eq!(geometry.rect.top, 5.0);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let r = record(7, 11, Some(2.5), Some(5.5));
        let a = layout_record(&r, 13.7).unwrap();
        for _ in 0..10 {
            assert_eq!(layout_record(&r, 13.7).unwrap(), a);
        }
    }

    #[test]
    fn test_layout_defaults_are_flagged() {
        let geometry = layout_record(&record(2, 3, None, None), 16.0).unwrap();
        assert_eq!(geometry.rect.width, 48.0);
        assert_eq!(geometry.rect.height, 96.0);
        assert!(geometry.used_default_width);
        assert!(geometry.used_default_height);
    }

    #[test]
    fn test_layout_rejects_zero_and_negative_pegs() {
        assert_eq!(
            layout_record(&record(0, 3, None, None), 16.0),
            Err(LayoutError::InvalidPeg { row: 0, col: 3 })
        );
        assert!(layout_record(&record(2, -1, None, None), 16.0).is_err());
    }

    #[test]
    fn test_bay_layout_skips_invalid_records() {
        let records = vec![
            record(2, 3, Some(3.0), Some(6.0)),
            record(0, 0, Some(3.0), Some(6.0)),
            record(5, 5, None, Some(6.0)),
        ];
        let layout = BayLayout::compute(&records, 1, &BoardSpec::default(), 16.0, 7);

        assert_eq!(layout.generation, 7);
        assert_eq!(layout.board.width, 736.0);
        assert_eq!(layout.items.len(), 2);
        assert_eq!(layout.skipped.len(), 1);
        assert_eq!(layout.skipped[0].kind, IssueKind::InvalidPeg);
        assert_eq!(layout.skipped[0].value, "R0 C0");
        assert_eq!(layout.defaulted_count(), 1);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let records = vec![
            record(1, 1, Some(10.0), Some(10.0)),
            record(2, 2, Some(2.0), Some(2.0)),
        ];
        let layout = BayLayout::compute(&records, 1, &BoardSpec::default(), 10.0, 0);
        let hit = layout.hit_test(PointPx { x: 25.0, y: 20.0 }).unwrap();
        assert_eq!(hit.record.normalized_code, "22");
        let hit = layout.hit_test(PointPx { x: 2.0, y: 90.0 }).unwrap();
        assert_eq!(hit.record.normalized_code, "11");
        assert!(layout.hit_test(PointPx { x: 400.0, y: 400.0 }).is_none());
    }

    #[test]
    fn test_item_lookup() {
        let records = vec![record(3, 4, None, None)];
        let layout = BayLayout::compute(&records, 1, &BoardSpec::default(), 16.0, 0);
        assert!(layout.item("34").is_some());
        assert!(layout.item("99").is_none());
    }
}
