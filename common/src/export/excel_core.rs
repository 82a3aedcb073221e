//! Excel生成（共通ライブラリ）
//!
//! layout.rs の列定義を使用して照合結果のExcelを生成

use crate::layout::{ResultColumn, RESULT_COLUMNS};
use crate::types::{ItemCount, MatchRow};
use rust_xlsxwriter::*;
use std::collections::BTreeMap;

const RESULTS_SHEET: &str = "Results";
const COUNTS_SHEET: &str = "Item Counts";

/// 照合結果と品目件数からExcelをバッファに生成
///
/// # Arguments
/// * `rows` - 照合結果（表示順）
/// * `item_counts` - 品目 → 件数
pub fn generate_results_buffer(
    rows: &[MatchRow],
    item_counts: &BTreeMap<String, usize>,
) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    // 結果シート
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(RESULTS_SHEET)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, column) in RESULT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, column.label(), &header_format)
            .map_err(|e| format!("見出し書き込みエラー: {}", e))?;
        worksheet
            .set_column_width(col as u16, 18)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let excel_row = (i + 1) as u32;
        for (col, column) in RESULT_COLUMNS.iter().enumerate() {
            let col = col as u16;
            match (column, row.item_count) {
                (ResultColumn::ItemCount, ItemCount::Count(n)) => {
                    worksheet
                        .write_number(excel_row, col, n as f64)
                        .map_err(|e| format!("値書き込みエラー: {}", e))?;
                }
                _ => {
                    worksheet
                        .write_string(excel_row, col, &*column.cell(row))
                        .map_err(|e| format!("値書き込みエラー: {}", e))?;
                }
            }
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;
    worksheet
        .autofilter(0, 0, rows.len() as u32, (RESULT_COLUMNS.len() - 1) as u16)
        .map_err(|e| format!("オートフィルタ設定エラー: {}", e))?;

    // 品目件数シート
    let counts_sheet = workbook.add_worksheet();
    counts_sheet
        .set_name(COUNTS_SHEET)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;
    counts_sheet
        .write_string_with_format(0, 0, ResultColumn::Item.label(), &header_format)
        .map_err(|e| format!("見出し書き込みエラー: {}", e))?;
    counts_sheet
        .write_string_with_format(0, 1, ResultColumn::ItemCount.label(), &header_format)
        .map_err(|e| format!("見出し書き込みエラー: {}", e))?;
    counts_sheet
        .set_column_width(0, 30)
        .map_err(|e| format!("列幅設定エラー: {}", e))?;

    for (i, (item, count)) in item_counts.iter().enumerate() {
        let excel_row = (i + 1) as u32;
        counts_sheet
            .write_string(excel_row, 0, item)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        counts_sheet
            .write_number(excel_row, 1, *count as f64)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
    }

    // バッファに書き出し
    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NOT_FOUND;

    #[test]
    fn test_generate_buffer_is_zip() {
        let rows = vec![
            MatchRow {
                serial: "A1".into(),
                item: "Laptop".into(),
                item_count: ItemCount::Count(1),
                ..Default::default()
            },
            MatchRow {
                serial: "ZZZ".into(),
                item: NOT_FOUND.into(),
                ..Default::default()
            },
        ];
        let mut counts = BTreeMap::new();
        counts.insert("Laptop".to_string(), 1);

        let buffer = generate_results_buffer(&rows, &counts).expect("Excel生成失敗");
        // xlsx は zip（PK ヘッダー）
        assert!(buffer.len() > 4);
        assert_eq!(&buffer[0..2], b"PK");
    }

    #[test]
    fn test_generate_buffer_empty_rows() {
        let buffer = generate_results_buffer(&[], &BTreeMap::new()).expect("Excel生成失敗");
        assert!(!buffer.is_empty());
    }
}
