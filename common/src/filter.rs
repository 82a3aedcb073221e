//! 結果表の絞り込みと並べ替え
//!
//! 照合結果そのものは変更せず、条件に合う行のコピーを返す。

use crate::layout::{ResultColumn, RESULT_COLUMNS};
use crate::types::MatchRow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// 表示用フィルタ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewFilter {
    /// 列ごとの許可値（空集合の列は条件なし扱い）
    pub columns: BTreeMap<ResultColumn, BTreeSet<String>>,
    /// 全列対象の部分一致（大文字小文字無視）
    pub text: Option<String>,
}

impl ViewFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 列の許可値を設定。値が空なら列フィルタを解除する
    pub fn set_column<I, S>(&mut self, column: ResultColumn, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.columns.remove(&column);
        } else {
            self.columns.insert(column, values);
        }
    }

    pub fn set_text(&mut self, text: &str) {
        let text = text.trim();
        self.text = if text.is_empty() { None } else { Some(text.to_lowercase()) };
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.text = None;
    }

    pub fn is_active(&self) -> bool {
        !self.columns.is_empty() || self.text.is_some()
    }

    /// 行が条件に合うか
    pub fn matches(&self, row: &MatchRow) -> bool {
        let columns_ok = self
            .columns
            .iter()
            .all(|(column, allowed)| allowed.contains(&*column.cell(row)));
        if !columns_ok {
            return false;
        }

        match &self.text {
            Some(needle) => {
                let needle = needle.to_lowercase();
                RESULT_COLUMNS
                    .iter()
                    .any(|c| c.cell(row).to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    /// 条件に合う行のコピー
    pub fn apply(&self, rows: &[MatchRow]) -> Vec<MatchRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// 列の値一覧（フィルタ候補表示用、重複なし・昇順）
pub fn distinct_values(rows: &[MatchRow], column: ResultColumn) -> Vec<String> {
    let set: BTreeSet<String> = rows.iter().map(|r| column.cell(r).into_owned()).collect();
    set.into_iter().collect()
}

/// 列で並べ替え（安定ソート）
///
/// 両方が数値なら数値比較、それ以外は文字列比較。数値は文字列より前。
pub fn sort_rows(rows: &mut [MatchRow], column: ResultColumn, descending: bool) {
    rows.sort_by(|a, b| {
        let ordering = compare_cells(&column.cell(a), &column.cell(b));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// 有限の数値として読めるセルだけを数値扱い（"nan" や "inf" は文字列）
fn as_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn compare_cells(a: &str, b: &str) -> Ordering {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemCount, NOT_FOUND};

    fn row(serial: &str, item: &str, status: &str, count: ItemCount) -> MatchRow {
        MatchRow {
            serial: serial.into(),
            item: item.into(),
            status: status.into(),
            item_count: count,
            ..Default::default()
        }
    }

    fn sample() -> Vec<MatchRow> {
        vec![
            row("100", "Laptop", "Active", ItemCount::Count(2)),
            row("20", "Monitor", "Broken", ItemCount::Count(1)),
            row("3", "Laptop", "Active", ItemCount::Count(2)),
            row("ZZZ", NOT_FOUND, NOT_FOUND, ItemCount::NotFound),
        ]
    }

    #[test]
    fn test_column_filter() {
        let mut filter = ViewFilter::new();
        filter.set_column(ResultColumn::Item, ["Laptop"]);
        let rows = filter.apply(&sample());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.item == "Laptop"));
    }

    #[test]
    fn test_empty_column_values_removes_filter() {
        let mut filter = ViewFilter::new();
        filter.set_column(ResultColumn::Item, ["Laptop"]);
        filter.set_column(ResultColumn::Item, Vec::<String>::new());
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&sample()).len(), 4);
    }

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let mut filter = ViewFilter::new();
        filter.set_text("  BROK ");
        let rows = filter.apply(&sample());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].serial, "20");
    }

    #[test]
    fn test_column_and_text_filters_combine() {
        let mut filter = ViewFilter::new();
        filter.set_column(ResultColumn::Status, ["Active", "Broken"]);
        filter.set_text("100");
        let rows = filter.apply(&sample());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].serial, "100");
    }

    #[test]
    fn test_sort_numeric_then_text() {
        let mut rows = sample();
        sort_rows(&mut rows, ResultColumn::Serial, false);
        let serials: Vec<&str> = rows.iter().map(|r| r.serial.as_str()).collect();
        assert_eq!(serials, vec!["3", "20", "100", "ZZZ"]);

        sort_rows(&mut rows, ResultColumn::Serial, true);
        assert_eq!(rows[0].serial, "ZZZ");
    }

    #[test]
    fn test_sort_is_stable() {
        let mut rows = sample();
        sort_rows(&mut rows, ResultColumn::Item, false);
        let serials: Vec<&str> = rows.iter().map(|r| r.serial.as_str()).collect();
        assert_eq!(serials, vec!["100", "3", "20", "ZZZ"]);
    }

    #[test]
    fn test_sort_with_nan_and_inf_cells() {
        let serials = ["5", "nan", "3", "NaN", "1", "inf", "4", "-inf", "2", "nan", "0", "Laptop"];
        let mut rows: Vec<MatchRow> = (0..48)
            .map(|i| row(serials[i % serials.len()], "x", "y", ItemCount::NotFound))
            .collect();

        sort_rows(&mut rows, ResultColumn::Serial, false);
        let sorted: Vec<&str> = rows.iter().map(|r| r.serial.as_str()).collect();
        assert_eq!(&sorted[..4], &["0"; 4]);
        assert_eq!(sorted[24], "-inf");
        assert_eq!(sorted[47], "nan");

        let numbers: Vec<&str> = sorted.iter().copied().filter(|s| as_number(s).is_some()).collect();
        assert_eq!(numbers.len(), 24);
        assert!(sorted[..24].iter().all(|s| as_number(s).is_some()));

        sort_rows(&mut rows, ResultColumn::Serial, true);
        assert_eq!(rows[0].serial, "nan");
        assert_eq!(rows[47].serial, "0");
    }

    #[test]
    fn test_distinct_values() {
        let values = distinct_values(&sample(), ResultColumn::Item);
        assert_eq!(values, vec!["Laptop", "Monitor", NOT_FOUND]);
    }
}
