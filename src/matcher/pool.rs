//! チャンク並列処理用のワーカープール
//!
//! グローバルなrayonプールではなく、設定されたワーカー数でクレート専用のプールを作る。
//! プールを作れない場合やワーカー数1の場合は呼び出し元スレッドで逐次処理する。

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// 既定のワーカー数（CPU数-1、最低1）
///
/// 1つは操作側スレッド用に残す。
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

#[derive(Debug)]
pub struct WorkerPool {
    pool: Option<ThreadPool>,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        if workers == 1 {
            return Self::sequential();
        }

        let built = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("stock-lookup-{}", i))
            .build();

        match built {
            Ok(pool) => Self {
                pool: Some(pool),
                workers,
            },
            Err(e) => {
                tracing::warn!("ワーカープール作成失敗、逐次処理に切り替え: {}", e);
                Self::sequential()
            }
        }
    }

    pub fn sequential() -> Self {
        Self {
            pool: None,
            workers: 1,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// 連続したチャンクごとに `f(先頭位置, チャンク)` を実行し、チャンク順に結果を返す
    pub fn map_chunks<T, R, F>(&self, items: &[T], chunk_size: usize, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &[T]) -> R + Sync + Send,
    {
        let chunk_size = chunk_size.max(1);

        match &self.pool {
            Some(pool) if items.len() > chunk_size => pool.install(|| {
                items
                    .par_chunks(chunk_size)
                    .enumerate()
                    .map(|(i, chunk)| f(i * chunk_size, chunk))
                    .collect()
            }),
            _ => items
                .chunks(chunk_size)
                .enumerate()
                .map(|(i, chunk)| f(i * chunk_size, chunk))
                .collect(),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(default_workers())
    }
}
