//! Excel / ODS ブック読み込み（calamine）

use super::{rows_to_table, FormatAdapter, SheetSelector};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use stock_lookup_common::{CellValue, Table};

/// xlsx / xlsm / xlsb / xls / ods
pub struct WorkbookAdapter;

impl FormatAdapter for WorkbookAdapter {
    fn name(&self) -> &'static str {
        "workbook"
    }

    fn load(&self, path: &Path, sheet: &SheetSelector) -> Result<Table, String> {
        let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;

        let range = match sheet {
            SheetSelector::Index(index) => workbook
                .worksheet_range_at(*index)
                .ok_or_else(|| format!("シート {} がありません", sheet))?
                .map_err(|e| e.to_string())?,
            SheetSelector::Name(name) => workbook
                .worksheet_range(name)
                .map_err(|e| e.to_string())?,
        };

        rows_to_table(range_to_rows(&range))
    }
}

/// レンジを行に変換
///
/// calamine のレンジは最初の使用セルから始まるため、
/// 先頭の空き列を補って列位置をシートと一致させる。
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let leading_cols = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    range
        .rows()
        .map(|row| {
            let mut cells = vec![CellValue::Empty; leading_cols];
            cells.extend(row.iter().map(convert_cell));
            cells
        })
        .collect()
}

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(v) => CellValue::Int(*v),
        Data::Float(v) => CellValue::Float(*v),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("{}", e)),
    }
}
