//! 照合データの型定義
//!
//! CLIとセッションで共有される型:
//! - CellValue / Table: ローダーが読み込んだ表データ
//! - MatchRow: 照合結果の1行
//! - ItemCount: 品目ごとの件数（未検出は NOT_FOUND）

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// 照合できなかったフィールドの値
pub const NOT_FOUND: &str = "NOT_FOUND";

/// セル値
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
}

impl CellValue {
    /// 空セル、または空白のみのテキスト
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Float(f) => f.is_nan(),
            CellValue::Int(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

/// 表データ（ヘッダー行 + データ行）
///
/// すべての行はヘッダーと同じ列数を持つ。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// 列数が揃っていない行があればエラー
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let expected = columns.len();
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(Error::TableShape {
                row,
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// 列数の揃っていない行を補正して作成
    ///
    /// 短い行は Empty で埋め、ヘッダーより長い行があればヘッダーに `COLUMN{n}` を追加する。
    pub fn from_ragged(mut columns: Vec<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(columns.len()))
            .max()
            .unwrap_or(0);

        while columns.len() < width {
            columns.push(format!("COLUMN{}", columns.len() + 1));
        }
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// データ行数（ヘッダー除く）
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    /// 指定列のセルを上から順に返す
    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |r| r.get(index))
    }
}

/// 品目の件数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemCount {
    #[default]
    NotFound,
    Count(usize),
}

impl fmt::Display for ItemCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemCount::NotFound => write!(f, "{}", NOT_FOUND),
            ItemCount::Count(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for ItemCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ItemCount::NotFound => serializer.serialize_str(NOT_FOUND),
            ItemCount::Count(n) => serializer.serialize_u64(*n as u64),
        }
    }
}

/// 照合結果の1行
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRow {
    pub serial: String,
    pub item: String,
    pub model: String,
    pub location: String,
    pub status: String,
    /// 品目 + " " + 型式
    pub combined: String,
    pub item_count: ItemCount,
    pub internal_id: String,
}

impl MatchRow {
    /// 品目が見つかった行か
    pub fn is_found(&self) -> bool {
        self.item != NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new_rejects_ragged_rows() {
        let result = Table::new(
            vec!["A".into(), "B".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        );
        match result {
            Err(Error::TableShape { row, expected, actual }) => {
                assert_eq!((row, expected, actual), (1, 2, 1));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_table_from_ragged_pads_rows_and_header() {
        let table = Table::from_ragged(
            vec!["A".into()],
            vec![vec!["1".into(), "2".into(), "3".into()], vec![]],
        );
        assert_eq!(table.columns(), &["A", "COLUMN2", "COLUMN3"]);
        assert_eq!(table.rows()[1], vec![CellValue::Empty; 3]);
        assert_eq!(table.width(), 3);
    }

    #[test]
    fn test_table_column_iterates_in_order() {
        let table = Table::new(
            vec!["A".into(), "B".into()],
            vec![vec![1i64.into(), "x".into()], vec![2i64.into(), "y".into()]],
        )
        .unwrap();
        let values: Vec<String> = table.column(1).map(|c| c.to_string()).collect();
        assert_eq!(values, vec!["x", "y"]);
    }

    #[test]
    fn test_cell_is_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::Text("   ".into()).is_blank());
        assert!(CellValue::Float(f64::NAN).is_blank());
        assert!(!CellValue::Int(0).is_blank());
        assert!(!CellValue::Text("0".into()).is_blank());
    }

    #[test]
    fn test_item_count_display_and_json() {
        assert_eq!(ItemCount::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ItemCount::Count(3).to_string(), "3");
        assert_eq!(serde_json::to_string(&ItemCount::Count(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&ItemCount::NotFound).unwrap(),
            "\"NOT_FOUND\""
        );
    }

    #[test]
    fn test_match_row_serializes_camel_case() {
        let row = MatchRow {
            serial: "A1".into(),
            internal_id: "77".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["internalId"], "77");
        assert_eq!(json["itemCount"], "NOT_FOUND");
    }
}
