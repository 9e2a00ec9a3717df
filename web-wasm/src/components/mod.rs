//! UIコンポーネント

pub mod bay_nav;
pub mod board;
pub mod header;
pub mod pdf_modal;
pub mod progress_bar;
pub mod scanner_modal;
pub mod search_bar;
pub mod store_modal;
