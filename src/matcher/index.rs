//! マスタ表の検索インデックス
//!
//! B列（正規化済み）→ マスタ行の対応表。同じキーが複数行にあれば後の行が優先。

use super::pool::WorkerPool;
use super::types::MASTER_KEY_COLUMN;
use std::collections::HashMap;
use std::sync::Arc;
use stock_lookup_common::{normalize, CellValue, Table};

#[derive(Debug, Clone)]
pub struct LookupIndex {
    master: Arc<Table>,
    /// キー → マスタ行番号
    positions: HashMap<String, usize>,
}

impl LookupIndex {
    /// マスタ表からインデックスを作成
    ///
    /// 行を連続したチャンクに分けて並列にキーを作り、元の行順でマージする。
    pub fn build(master: Arc<Table>, pool: &WorkerPool, chunk_size: usize) -> Self {
        tracing::debug!(
            rows = master.len(),
            workers = pool.workers(),
            "検索インデックス作成中"
        );

        let partials: Vec<Vec<(String, usize)>> =
            pool.map_chunks(master.rows(), chunk_size, |offset, chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .filter_map(|(i, row)| {
                        let key = normalize(row.get(MASTER_KEY_COLUMN)?);
                        if key.is_empty() {
                            None
                        } else {
                            Some((key, offset + i))
                        }
                    })
                    .collect()
            });

        // チャンク順に挿入（後の行で上書き）
        let mut positions = HashMap::with_capacity(master.len());
        for partial in partials {
            for (key, position) in partial {
                positions.insert(key, position);
            }
        }

        tracing::info!(entries = positions.len(), "検索インデックス作成完了");

        Self { master, positions }
    }

    /// キーに対応するマスタ行
    pub fn get(&self, key: &str) -> Option<&[CellValue]> {
        self.positions
            .get(key)
            .and_then(|&position| self.master.row(position))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// 登録キー数
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn master(&self) -> &Table {
        &self.master
    }
}
