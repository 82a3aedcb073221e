//! 品目ごとの件数集計

use crate::types::{ItemCount, MatchRow, NOT_FOUND};
use std::collections::BTreeMap;

/// NOT_FOUND 以外の品目の出現回数を数える
pub fn count_by_item(rows: &[MatchRow]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.item != NOT_FOUND) {
        *counts.entry(row.item.clone()).or_insert(0) += 1;
    }
    counts
}

/// 件数を各行の item_count に反映したコピーを返す
pub fn annotate(rows: &[MatchRow], counts: &BTreeMap<String, usize>) -> Vec<MatchRow> {
    let mut annotated = rows.to_vec();
    annotate_in_place(&mut annotated, counts);
    annotated
}

/// 件数を各行の item_count に反映する
pub fn annotate_in_place(rows: &mut [MatchRow], counts: &BTreeMap<String, usize>) {
    for row in rows {
        row.item_count = if row.item == NOT_FOUND {
            ItemCount::NotFound
        } else {
            ItemCount::Count(counts.get(&row.item).copied().unwrap_or(0))
        };
    }
}
