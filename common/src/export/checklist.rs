//! 補充チェックリストのExcel生成
//!
//! 先頭に集計シート、続けてベイごとに1シート。
//! 各シートは読み込み順の商品一覧で、完了済みには ✓ を付ける。

use crate::completion::CompletionTracker;
use crate::dataset::Dataset;
use crate::storage::KeyValueStore;
use crate::types::PlacementRecord;
use rust_xlsxwriter::*;

const HEADERS: [&str; 7] = ["Peg", "UPC", "Description", "Width (in)", "Height (in)", "Done", "Note"];
const COLUMN_WIDTHS: [f64; 7] = [10.0, 16.0, 44.0, 11.0, 11.0, 7.0, 20.0];

/// チェックリストをバッファに生成
///
/// # Arguments
/// * `dataset` - 読み込み済みデータ
/// * `planogram_id` - 対象の棚割り
/// * `tracker` - 完了状態
pub fn generate_checklist_buffer<S: KeyValueStore>(
    dataset: &Dataset,
    planogram_id: &str,
    tracker: &CompletionTracker<S>,
) -> Result<Vec<u8>, String> {
    let bays = dataset
        .bays_for_planogram(planogram_id)
        .map_err(|e| e.to_string())?;

    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_size(10.0)
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_font_size(11.0)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let done_format = Format::new()
        .set_font_size(11.0)
        .set_font_color(Color::RGB(0x2E7D32))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let percent_format = Format::new()
        .set_num_format("0%")
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    // 集計シート
    let summary = workbook.add_worksheet();
    summary
        .set_name("Summary")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;
    summary
        .write_string(0, 0, format!("POG {}", planogram_id))
        .map_err(|e| format!("書き込みエラー: {}", e))?;
    for (col, header) in ["Bay", "Items", "Done", "Progress"].iter().enumerate() {
        summary
            .write_string_with_format(2, col as u16, *header, &header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }

    for (i, bay) in bays.iter().enumerate() {
        let row = 3 + i as u32;
        let progress = tracker.progress(dataset.records_for_bay(planogram_id, *bay));
        summary
            .write_number_with_format(row, 0, *bay as f64, &value_format)
            .map_err(|e| format!("書き込みエラー: {}", e))?;
        summary
            .write_number_with_format(row, 1, progress.total as f64, &value_format)
            .map_err(|e| format!("書き込みエラー: {}", e))?;
        summary
            .write_number_with_format(row, 2, progress.done as f64, &value_format)
            .map_err(|e| format!("書き込みエラー: {}", e))?;
        summary
            .write_number_with_format(row, 3, progress.ratio(), &percent_format)
            .map_err(|e| format!("書き込みエラー: {}", e))?;
    }

    // ベイごとのシート
    for bay in &bays {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(format!("Bay {}", bay))
            .map_err(|e| format!("シート名設定エラー: {}", e))?;

        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            worksheet
                .set_column_width(col as u16, *width)
                .map_err(|e| format!("列幅設定エラー: {}", e))?;
        }
        for (col, header) in HEADERS.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *header, &header_format)
                .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
        }
        worksheet
            .set_freeze_panes(1, 0)
            .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;

        for (i, record) in dataset.records_for_bay(planogram_id, *bay).enumerate() {
            let row = 1 + i as u32;
            let done = tracker.is_done(&record.normalized_code);
            let cells = row_cells(record, done);

            for (col, value) in cells.iter().enumerate() {
                let format = if col == 5 { &done_format } else { &value_format };
                worksheet
                    .write_string_with_format(row, col as u16, value.as_str(), format)
                    .map_err(|e| format!("値書き込みエラー: {}", e))?;
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

/// 1行分のセル文字列
fn row_cells(record: &PlacementRecord, done: bool) -> [String; 7] {
    let (width, default_width) = record.width_or_default();
    let (height, default_height) = record.height_or_default();

    let note = match (default_width, default_height) {
        (true, true) => "default size",
        (true, false) => "default width",
        (false, true) => "default height",
        (false, false) => "",
    };

    [
        format!("R{:02} C{:02}", record.peg_row, record.peg_col),
        record.product_code.clone(),
        record.description.clone(),
        format_inches(width),
        format_inches(height),
        if done { "✓".to_string() } else { String::new() },
        note.to_string(),
    ]
}

fn format_inches(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::upc::normalize;

    fn record(width: Option<f64>, height: Option<f64>) -> PlacementRecord {
        PlacementRecord {
            planogram_id: "8386824".into(),
            bay: 2,
            peg_row: 2,
            peg_col: 3,
            width_inches: width,
            height_inches: height,
            product_code: "00414123".into(),
            normalized_code: normalize("00414123"),
            description: "Utility Hook".into(),
        }
    }

    #[test]
    fn test_row_cells() {
        let cells = row_cells(&record(Some(2.5), Some(6.0)), true);
        assert_eq!(cells[0], "R02 C03");
        assert_eq!(cells[1], "00414123");
        assert_eq!(cells[3], "2.5");
        assert_eq!(cells[4], "6");
        assert_eq!(cells[5], "✓");
        assert_eq!(cells[6], "");
    }

    #[test]
    fn test_row_cells_marks_defaulted_size() {
        let cells = row_cells(&record(None, None), false);
        assert_eq!(cells[3], "3");
        assert_eq!(cells[4], "6");
        assert_eq!(cells[5], "");
        assert_eq!(cells[6], "default size");
    }

    #[test]
    fn test_generate_checklist_buffer() {
        let dataset = Dataset::from_sources(
            "",
            "POG,Bay,Peg,Width,Height,UPC,ProductDescription\n\
             8386824,2,R02 C03,3 in,6 in,00414123,Utility Hook\n\
             8386824,5,R01 C01,,,555,Clips\n",
            "Store,POG\n1001,8386824\n",
        )
        .expect("データ構築失敗");
        let mut tracker = CompletionTracker::load(MemoryStore::default());
        tracker.toggle("414123").unwrap();

        let buffer = generate_checklist_buffer(&dataset, "8386824", &tracker).expect("Excel生成失敗");
        // xlsx は zip
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_unknown_planogram_is_error() {
        let dataset = Dataset::default();
        let tracker = CompletionTracker::load(MemoryStore::default());
        let err = generate_checklist_buffer(&dataset, "nope", &tracker).unwrap_err();
        assert!(err.contains("nope"));
    }
}
