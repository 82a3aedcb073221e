use thiserror::Error;

/// ローダー1つ分の失敗記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadAttempt {
    pub adapter: &'static str,
    pub reason: String,
}

impl std::fmt::Display for LoadAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.adapter, self.reason)
    }
}

fn join_attempts(attempts: &[LoadAttempt]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ファイルを読み込めませんでした: {path} ({})", join_attempts(.attempts))]
    LoadFailure {
        path: String,
        attempts: Vec<LoadAttempt>,
    },

    #[error("シリアル番号の列が見つかりません: {0}")]
    ColumnNotDetected(String),

    #[error("マスタファイルが読み込まれていません")]
    MasterNotLoaded,

    #[error("データファイルが読み込まれていません")]
    InputNotLoaded,

    #[error("照合処理が中断されました")]
    RunAborted,

    #[error("フィルタ指定が不正: {0}")]
    InvalidFilter(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] stock_lookup_common::Error),
}

pub type Result<T> = std::result::Result<T, LookupError>;
