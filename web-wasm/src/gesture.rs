//! タッチスワイプでのベイ切替
//!
//! 横方向の移動が閾値以上かつ縦より大きいときだけスワイプとみなす。
//! 盤面の縦スクロールはベイ切替にしない。

/// スワイプと判定する最小移動量（px）
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// 右から左へ（次のベイ）
    Left,
    /// 左から右へ（前のベイ）
    Right,
}

/// タッチ開始から終了までの移動量を判定
pub fn swipe_direction(dx: f64, dy: f64, threshold: f64) -> Option<Swipe> {
    if dx.abs() < threshold || dx.abs() <= dy.abs() {
        return None;
    }
    if dx < 0.0 {
        Some(Swipe::Left)
    } else {
        Some(Swipe::Right)
    }
}
