//! 区切りテキスト読み込み（最後の手段）
//!
//! 1行目にタブがあればタブ区切り、なければカンマ区切りとして読む。

use super::{rows_to_table, FormatAdapter, SheetSelector};
use std::path::Path;
use stock_lookup_common::{CellValue, Table};

const UTF8_BOM: &str = "\u{feff}";

pub struct DelimitedAdapter;

impl FormatAdapter for DelimitedAdapter {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn load(&self, path: &Path, _sheet: &SheetSelector) -> Result<Table, String> {
        let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
        parse_delimited(&bytes)
    }
}

fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    if first_line.contains(&b'\t') {
        b'\t'
    } else {
        b','
    }
}

pub(crate) fn parse_delimited(bytes: &[u8]) -> Result<Table, String> {
    // バイナリ（壊れたxlsx等）はテキストとして扱わない
    if bytes.contains(&0) {
        return Err("テキストファイルではありません".to_string());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(bytes))
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| e.to_string())?;
        let row: Vec<CellValue> = record
            .iter()
            .map(|field| {
                let text = String::from_utf8_lossy(field);
                let text = text.trim_start_matches(UTF8_BOM);
                if text.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(text.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    rows_to_table(rows)
}
