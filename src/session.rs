//! 照合セッション
//!
//! マスタ表・データ表・直近の照合結果を1組だけ保持する。
//! 検索インデックスはマスタ表ごとに1回だけ構築し、照合はバックグラウンドでも実行できる。

use crate::error::{LookupError, Result};
use crate::loader::{SheetSelector, TableLoader};
use crate::matcher::{match_serials, EngineConfig, LookupIndex, WorkerPool};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use stock_lookup_common::{
    annotate_in_place, count_by_item, detect_serial_column, to_tsv, CellValue, MatchRow, Table,
    ViewFilter,
};

/// 1回の照合結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub rows: Vec<MatchRow>,
    pub item_counts: BTreeMap<String, usize>,
    /// 照合に使ったデータ表の列名
    pub serial_column: String,
    /// マスタに見つかった行数
    pub matched: usize,
}

impl MatchReport {
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn not_found(&self) -> usize {
        self.total() - self.matched
    }

    /// フィルタを通った行のコピー
    pub fn filtered(&self, filter: &ViewFilter) -> Vec<MatchRow> {
        filter.apply(&self.rows)
    }

    /// 行だけ差し替えた結果（品目件数は元の集計のまま）
    pub fn with_rows(&self, rows: Vec<MatchRow>) -> MatchReport {
        let matched = rows.iter().filter(|row| row.is_found()).count();
        MatchReport {
            rows,
            item_counts: self.item_counts.clone(),
            serial_column: self.serial_column.clone(),
            matched,
        }
    }

    pub fn to_tsv(&self) -> String {
        to_tsv(&self.rows)
    }
}

/// マスタ表と、そのインデックス（初回要求時に構築）
struct MasterSlot {
    table: Arc<Table>,
    index: OnceLock<Arc<LookupIndex>>,
}

impl MasterSlot {
    fn new(table: Table) -> Self {
        Self {
            table: Arc::new(table),
            index: OnceLock::new(),
        }
    }

    fn index(&self, pool: &WorkerPool, chunk_size: usize) -> Arc<LookupIndex> {
        self.index
            .get_or_init(|| Arc::new(LookupIndex::build(self.table.clone(), pool, chunk_size)))
            .clone()
    }
}

/// データ表と検出したシリアル番号列
struct InputSlot {
    table: Table,
    serial_column: Option<usize>,
    source: String,
}

/// バックグラウンド照合の結果
#[derive(Debug)]
pub struct RunOutcome {
    pub token: u64,
    pub result: Result<MatchReport>,
}

/// `accept` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    /// 最新の照合として保存した
    Current,
    /// より新しい照合が開始済みのため破棄した
    Stale,
}

/// 実行中の照合
pub struct RunHandle {
    token: u64,
    receiver: Receiver<RunOutcome>,
}

impl RunHandle {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// 完了まで待つ
    pub fn wait(self) -> RunOutcome {
        let token = self.token;
        self.receiver.recv().unwrap_or(RunOutcome {
            token,
            result: Err(LookupError::RunAborted),
        })
    }

    /// 指定時間だけ待つ。未完了なら `Ok(self)` を返す
    pub fn wait_timeout(self, timeout: Duration) -> std::result::Result<RunOutcome, RunHandle> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Ok(outcome),
            Err(RecvTimeoutError::Timeout) => Err(self),
            Err(RecvTimeoutError::Disconnected) => Ok(self.aborted()),
        }
    }

    /// 待たずに確認する（画面更新ループ向け）
    pub fn poll(&self) -> Option<RunOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.aborted()),
        }
    }

    fn aborted(&self) -> RunOutcome {
        RunOutcome {
            token: self.token,
            result: Err(LookupError::RunAborted),
        }
    }
}

pub struct LookupSession {
    config: EngineConfig,
    pool: Arc<WorkerPool>,
    loader: TableLoader,
    sheet: SheetSelector,
    master: Option<Arc<MasterSlot>>,
    input: Option<Arc<InputSlot>>,
    report: Option<MatchReport>,
    latest_token: AtomicU64,
}

impl LookupSession {
    pub fn new(config: EngineConfig) -> Self {
        let pool = Arc::new(WorkerPool::new(config.workers));
        Self {
            config,
            pool,
            loader: TableLoader::default(),
            sheet: SheetSelector::default(),
            master: None,
            input: None,
            report: None,
            latest_token: AtomicU64::new(0),
        }
    }

    pub fn with_loader(mut self, loader: TableLoader) -> Self {
        self.loader = loader;
        self
    }

    /// 以降の読み込みで使うシート
    pub fn set_sheet(&mut self, sheet: SheetSelector) {
        self.sheet = sheet;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// マスタ表をファイルから読み込む（失敗時は現在の状態を保持）
    pub fn load_master(&mut self, path: &Path) -> Result<()> {
        let table = self.loader.load(path, &self.sheet)?;
        self.set_master(table);
        Ok(())
    }

    pub fn set_master(&mut self, table: Table) {
        tracing::debug!(rows = table.len(), "マスタ表を設定");
        self.master = Some(Arc::new(MasterSlot::new(table)));
        self.bump_token();
    }

    /// データ表をファイルから読み込む（失敗時は現在の状態を保持）
    pub fn load_input(&mut self, path: &Path) -> Result<()> {
        let table = self.loader.load(path, &self.sheet)?;
        self.set_input_from(table, path.display().to_string());
        Ok(())
    }

    pub fn set_input(&mut self, table: Table) {
        self.set_input_from(table, "<memory>".to_string());
    }

    fn set_input_from(&mut self, table: Table, source: String) {
        let serial_column = detect_serial_column(table.columns());
        match serial_column {
            Some(col) => tracing::info!("シリアル番号列: {}", table.columns()[col]),
            None => tracing::warn!("シリアル番号列が見つかりません: {}", source),
        }
        self.input = Some(Arc::new(InputSlot {
            table,
            serial_column,
            source,
        }));
        self.bump_token();
    }

    /// 次の照合でインデックスを作り直す
    pub fn invalidate_index(&mut self) {
        if let Some(slot) = self.master.take() {
            let table = slot.table.clone();
            self.master = Some(Arc::new(MasterSlot {
                table,
                index: OnceLock::new(),
            }));
        }
    }

    /// 検索インデックス（未構築ならここで構築）
    pub fn index(&self) -> Result<Arc<LookupIndex>> {
        let master = self.master.as_ref().ok_or(LookupError::MasterNotLoaded)?;
        Ok(master.index(&self.pool, self.config.chunk_size))
    }

    /// 検出したシリアル番号列の位置
    pub fn serial_column(&self) -> Option<usize> {
        self.input.as_ref().and_then(|input| input.serial_column)
    }

    pub fn master_table(&self) -> Option<&Table> {
        self.master.as_deref().map(|slot| slot.table.as_ref())
    }

    pub fn input_table(&self) -> Option<&Table> {
        self.input.as_deref().map(|slot| &slot.table)
    }

    /// 照合を実行して結果を保存する
    pub fn run(&mut self) -> Result<MatchReport> {
        let (master, input) = self.prepare()?;
        self.bump_token();
        let report = execute(&master, &input, &self.config, &self.pool)?;
        self.report = Some(report.clone());
        Ok(report)
    }

    /// 別スレッドで照合を開始する
    ///
    /// 結果は `accept` に渡す。開始前に分かるエラーはここで返す。
    pub fn spawn_run(&self) -> Result<RunHandle> {
        let (master, input) = self.prepare()?;
        let token = self.bump_token();
        let config = self.config.clone();
        let pool = self.pool.clone();

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = execute(&master, &input, &config, &pool);
            let _ = tx.send(RunOutcome { token, result });
        });

        tracing::debug!(token, "照合を開始");
        Ok(RunHandle {
            token,
            receiver: rx,
        })
    }

    /// バックグラウンド照合の結果を受け取る
    ///
    /// 最新でない結果は破棄する。最新の照合が失敗していればそのエラーを返す。
    pub fn accept(&mut self, outcome: RunOutcome) -> Result<Accepted> {
        if outcome.token != self.latest_token.load(Ordering::SeqCst) {
            tracing::debug!(token = outcome.token, "古い照合結果を破棄");
            return Ok(Accepted::Stale);
        }
        self.report = Some(outcome.result?);
        Ok(Accepted::Current)
    }

    pub fn report(&self) -> Option<&MatchReport> {
        self.report.as_ref()
    }

    /// すべての状態を破棄する（実行中の照合も無効になる）
    pub fn clear(&mut self) {
        self.master = None;
        self.input = None;
        self.report = None;
        self.bump_token();
    }

    fn bump_token(&self) -> u64 {
        self.latest_token.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn prepare(&self) -> Result<(Arc<MasterSlot>, Arc<InputSlot>)> {
        let master = self.master.clone().ok_or(LookupError::MasterNotLoaded)?;
        let input = self.input.clone().ok_or(LookupError::InputNotLoaded)?;
        if input.serial_column.is_none() {
            return Err(LookupError::ColumnNotDetected(input.source.clone()));
        }
        Ok((master, input))
    }
}

fn execute(
    master: &MasterSlot,
    input: &InputSlot,
    config: &EngineConfig,
    pool: &WorkerPool,
) -> Result<MatchReport> {
    let column = input
        .serial_column
        .ok_or_else(|| LookupError::ColumnNotDetected(input.source.clone()))?;

    let index = master.index(pool, config.chunk_size);

    // 空セルは照合対象外
    let serials: Vec<CellValue> = input
        .table
        .column(column)
        .filter(|cell| !cell.is_blank())
        .cloned()
        .collect();
    tracing::info!("{} 件のシリアル番号を照合", serials.len());

    let mut rows = match_serials(&serials, &index, &config.fields, pool, config.chunk_size);
    let item_counts = count_by_item(&rows);
    annotate_in_place(&mut rows, &item_counts);
    let matched = rows.iter().filter(|row| row.is_found()).count();

    Ok(MatchReport {
        rows,
        item_counts,
        serial_column: input.table.columns()[column].clone(),
        matched,
    })
}
