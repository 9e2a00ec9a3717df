//! 出力モジュール（CLI・デスクトップ共通）

#[cfg(feature = "excel")]
pub mod checklist;

#[cfg(feature = "excel")]
pub use checklist::generate_checklist_buffer;
