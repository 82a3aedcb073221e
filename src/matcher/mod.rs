//! シリアル番号照合エンジン
//!
//! 入力値を正規化してマスタの検索インデックスを引き、指定列の値を取り出す。
//! 出力の i 行目は入力の i 行目に対応する。

mod index;
mod pool;
mod types;

pub use index::LookupIndex;
pub use pool::{default_workers, WorkerPool};
pub use types::{EngineConfig, FieldSpecs, DEFAULT_CHUNK_SIZE, MASTER_KEY_COLUMN};

use stock_lookup_common::{normalize, CellValue, ItemCount, MatchRow, NOT_FOUND};

/// 1つの入力値を照合して各列の値を返す
///
/// キーがなければ全列 NOT_FOUND、行が短く列が範囲外ならその列だけ NOT_FOUND。
pub fn lookup_one(value: &CellValue, index: &LookupIndex, columns: &[usize]) -> (String, Vec<String>) {
    let key = normalize(value);
    let fields = match index.get(&key) {
        Some(row) => columns
            .iter()
            .map(|&col| {
                row.get(col)
                    .map(normalize)
                    .unwrap_or_else(|| NOT_FOUND.to_string())
            })
            .collect(),
        None => vec![NOT_FOUND.to_string(); columns.len()],
    };
    (key, fields)
}

/// 入力値を一括照合（チャンク並列、入力順を保持）
pub fn lookup_fields(
    keys: &[CellValue],
    index: &LookupIndex,
    columns: &[usize],
    pool: &WorkerPool,
    chunk_size: usize,
) -> Vec<Vec<String>> {
    pool.map_chunks(keys, chunk_size, |_, chunk| {
        chunk
            .iter()
            .map(|value| lookup_one(value, index, columns).1)
            .collect::<Vec<_>>()
    })
    .into_iter()
    .flatten()
    .collect()
}

/// シリアル番号を照合して結果行を作る
///
/// item_count はまだ集計前なので NOT_FOUND のまま。
pub fn match_serials(
    keys: &[CellValue],
    index: &LookupIndex,
    fields: &FieldSpecs,
    pool: &WorkerPool,
    chunk_size: usize,
) -> Vec<MatchRow> {
    let values = lookup_fields(keys, index, &fields.columns(), pool, chunk_size);

    let rows: Vec<MatchRow> = keys
        .iter()
        .zip(values)
        .map(|(key, values)| into_match_row(normalize(key), values))
        .collect();

    tracing::debug!(
        total = rows.len(),
        found = rows.iter().filter(|r| r.is_found()).count(),
        "照合完了"
    );

    rows
}

fn into_match_row(serial: String, values: Vec<String>) -> MatchRow {
    let mut values = values.into_iter();
    let mut next = || values.next().unwrap_or_else(|| NOT_FOUND.to_string());

    let item = next();
    let model = next();
    let location = next();
    let status = next();
    let internal_id = next();
    let combined = format!("{} {}", item, model);

    MatchRow {
        serial,
        item,
        model,
        location,
        status,
        combined,
        item_count: ItemCount::NotFound,
        internal_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stock_lookup_common::Table;

    fn cells(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    /// 13列のマスタ行（A..M）
    fn master_row(key: &str, item: &str, model: &str) -> Vec<CellValue> {
        let mut row = cells(&["", key, "", item, model, "", "Depot", "Active"]);
        row.extend(cells(&["", "", "", ""]));
        row.push(CellValue::Float(9001.0));
        row
    }

    fn index() -> LookupIndex {
        let columns = (0..13).map(|i| format!("C{}", i)).collect();
        let rows = vec![
            master_row("A1", "Laptop", "X1"),
            master_row("A2", "Monitor", "M27"),
        ];
        let table = Table::new(columns, rows).unwrap();
        LookupIndex::build(Arc::new(table), &WorkerPool::sequential(), 2048)
    }

    #[test]
    fn test_match_hits_and_misses_in_order() {
        let keys = cells(&["A1", "A2", "ZZZ"]);
        let rows = match_serials(&keys, &index(), &FieldSpecs::default(), &WorkerPool::sequential(), 2048);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].serial, "A1");
        assert_eq!(rows[0].item, "Laptop");
        assert_eq!(rows[0].combined, "Laptop X1");
        assert_eq!(rows[0].location, "Depot");
        assert_eq!(rows[0].status, "Active");
        assert_eq!(rows[0].internal_id, "9001");
        assert_eq!(rows[1].item, "Monitor");
        assert_eq!(rows[2].item, NOT_FOUND);
        assert_eq!(rows[2].internal_id, NOT_FOUND);
        assert_eq!(rows[2].combined, "NOT_FOUND NOT_FOUND");
    }

    #[test]
    fn test_out_of_range_column_is_not_found_for_that_field_only() {
        let fields = FieldSpecs {
            internal_id: 40,
            ..FieldSpecs::default()
        };
        let rows = match_serials(&cells(&["A1"]), &index(), &fields, &WorkerPool::sequential(), 8);
        assert_eq!(rows[0].item, "Laptop");
        assert_eq!(rows[0].internal_id, NOT_FOUND);
    }

    #[test]
    fn test_numeric_input_matches_text_key() {
        let columns = (0..5).map(|i| format!("C{}", i)).collect();
        let table = Table::new(
            columns,
            vec![cells(&["", "1001", "", "Router", "R1"])],
        )
        .unwrap();
        let index = LookupIndex::build(Arc::new(table), &WorkerPool::sequential(), 16);

        let (key, values) = lookup_one(&CellValue::Float(1001.0), &index, &[3, 4]);
        assert_eq!(key, "1001");
        assert_eq!(values, vec!["Router", "R1"]);
    }

    #[test]
    fn test_lookup_fields_parallel_matches_sequential() {
        let keys: Vec<CellValue> = (0..3000)
            .map(|i| CellValue::from(if i % 3 == 0 { "A1" } else if i % 3 == 1 { "A2" } else { "nope" }))
            .collect();
        let index = index();
        let columns = FieldSpecs::default().columns();

        let sequential = lookup_fields(&keys, &index, &columns, &WorkerPool::sequential(), 100);
        let parallel = lookup_fields(&keys, &index, &columns, &WorkerPool::new(4), 100);
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.len(), 3000);
        assert_eq!(parallel[2][0], NOT_FOUND);
    }

    #[test]
    fn test_match_serials_agrees_with_lookup_fields() {
        let keys = cells(&["A2", "nope", "A1"]);
        let pool = WorkerPool::new(2);
        let fields = FieldSpecs::default();

        let values = lookup_fields(&keys, &index(), &fields.columns(), &pool, 1);
        let rows = match_serials(&keys, &index(), &fields, &pool, 1);

        for (row, values) in rows.iter().zip(&values) {
            assert_eq!(
                vec![&row.item, &row.model, &row.location, &row.status, &row.internal_id],
                values.iter().collect::<Vec<_>>()
            );
        }
        assert_eq!(rows[1].serial, "nope");
    }

    #[test]
    fn test_match_is_repeatable() {
        let keys = cells(&["A2", "A1", "A2", "x"]);
        let pool = WorkerPool::new(3);
        let first = match_serials(&keys, &index(), &FieldSpecs::default(), &pool, 1);
        let second = match_serials(&keys, &index(), &FieldSpecs::default(), &pool, 1);
        assert_eq!(first, second);
    }
}
