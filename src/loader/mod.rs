//! 表ファイル読み込み
//!
//! 形式ごとのアダプタを決まった順に試し、最初に成功したものを使う。
//! 全アダプタが失敗した場合は各アダプタの失敗理由をまとめて返す。
//!
//! 優先順:
//! 1. Excel 2003 XML（先頭バイトで判定）
//! 2. Excel / ODS ブック（calamine）
//! 3. タブ・カンマ区切りテキスト

mod delimited;
mod spreadsheet_xml;
mod workbook;

pub use delimited::DelimitedAdapter;
pub use spreadsheet_xml::SpreadsheetXmlAdapter;
pub use workbook::WorkbookAdapter;

use crate::error::{LoadAttempt, LookupError, Result};
use std::path::Path;
use stock_lookup_common::{normalize, CellValue, Table};

/// 読み込むシートの指定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// 0始まりのシート番号
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl SheetSelector {
    /// 数字ならシート番号、それ以外はシート名
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.parse::<usize>() {
            Ok(index) => SheetSelector::Index(index),
            Err(_) => SheetSelector::Name(value.to_string()),
        }
    }
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "#{}", i),
            SheetSelector::Name(name) => write!(f, "{}", name),
        }
    }
}

/// 表ファイル形式アダプタ
pub trait FormatAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// 読み込みに失敗した場合は理由を返す
    fn load(&self, path: &Path, sheet: &SheetSelector) -> std::result::Result<Table, String>;
}

/// アダプタを優先順に試すローダー
pub struct TableLoader {
    adapters: Vec<Box<dyn FormatAdapter>>,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new(vec![
            Box::new(SpreadsheetXmlAdapter),
            Box::new(WorkbookAdapter),
            Box::new(DelimitedAdapter),
        ])
    }
}

impl TableLoader {
    pub fn new(adapters: Vec<Box<dyn FormatAdapter>>) -> Self {
        Self { adapters }
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn load(&self, path: &Path, sheet: &SheetSelector) -> Result<Table> {
        if !path.exists() {
            return Err(LookupError::FileNotFound(path.display().to_string()));
        }

        let mut attempts = Vec::new();

        for adapter in &self.adapters {
            tracing::debug!(adapter = adapter.name(), path = %path.display(), "読み込み試行");
            match adapter.load(path, sheet) {
                Ok(table) => {
                    tracing::info!(
                        adapter = adapter.name(),
                        rows = table.len(),
                        columns = table.width(),
                        "読み込み成功: {}",
                        path.display()
                    );
                    return Ok(table);
                }
                Err(reason) => {
                    tracing::debug!(adapter = adapter.name(), "読み込み失敗: {}", reason);
                    attempts.push(LoadAttempt {
                        adapter: adapter.name(),
                        reason,
                    });
                }
            }
        }

        Err(LookupError::LoadFailure {
            path: path.display().to_string(),
            attempts,
        })
    }
}

/// 既定のローダーで読み込む
pub fn load_table(path: &Path, sheet: &SheetSelector) -> Result<Table> {
    TableLoader::default().load(path, sheet)
}

/// 読み込んだ行から表を作る
///
/// 全セル空の行は除外し、最初の行を見出しにする。
pub(crate) fn rows_to_table(rows: Vec<Vec<CellValue>>) -> std::result::Result<Table, String> {
    let mut rows = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_blank()));

    let header = rows.next().ok_or_else(|| "データがありません".to_string())?;
    let columns = header.iter().map(header_text).collect();

    Ok(Table::from_ragged(columns, rows.collect()))
}

fn header_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.trim().to_string(),
        other => normalize(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing(&'static str);

    impl FormatAdapter for Failing {
        fn name(&self) -> &'static str {
            self.0
        }

        fn load(&self, _path: &Path, _sheet: &SheetSelector) -> std::result::Result<Table, String> {
            Err(format!("{} は非対応", self.0))
        }
    }

    #[test]
    fn test_sheet_selector_parse() {
        assert_eq!(SheetSelector::parse("2"), SheetSelector::Index(2));
        assert_eq!(SheetSelector::parse(" Stok "), SheetSelector::Name("Stok".into()));
        assert_eq!(SheetSelector::default(), SheetSelector::Index(0));
    }

    #[test]
    fn test_default_adapter_order() {
        assert_eq!(
            TableLoader::default().adapter_names(),
            vec!["spreadsheet-xml", "workbook", "delimited"]
        );
    }

    #[test]
    fn test_missing_file() {
        let result = load_table(Path::new("/nonexistent/stock/12345.xlsx"), &SheetSelector::default());
        assert!(matches!(result, Err(LookupError::FileNotFound(_))));
    }

    #[test]
    fn test_all_failures_are_accumulated() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let loader = TableLoader::new(vec![Box::new(Failing("a")), Box::new(Failing("b"))]);

        match loader.load(file.path(), &SheetSelector::default()) {
            Err(LookupError::LoadFailure { attempts, .. }) => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].adapter, "a");
                assert_eq!(attempts[1].reason, "b は非対応");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_rows_to_table_skips_blank_rows() {
        let rows = vec![
            vec![CellValue::Empty, CellValue::from("  ")],
            vec![CellValue::from(" Seri No "), CellValue::Float(2024.0)],
            vec![CellValue::Empty, CellValue::Empty],
            vec![CellValue::from("A1")],
        ];
        let table = rows_to_table(rows).unwrap();
        assert_eq!(table.columns(), &["Seri No", "2024"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0], vec![CellValue::from("A1"), CellValue::Empty]);
    }

    #[test]
    fn test_rows_to_table_empty() {
        assert!(rows_to_table(vec![]).is_err());
    }
}
