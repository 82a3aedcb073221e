//! ログ初期化
//!
//! 標準出力は結果（TSV）用なので、ログは標準エラーに出す。

use tracing_subscriber::{fmt, EnvFilter};

/// ログ設定
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: false,
        }
    }
}

impl LoggingConfig {
    /// `--verbose` 指定時は debug
    pub fn from_verbose(verbose: bool) -> Self {
        Self {
            level: if verbose { "debug" } else { "info" }.to_string(),
            with_target: verbose,
        }
    }

    /// RUST_LOG が優先、なければ自クレートのみ指定レベル
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "stock_lookup_rust={level},stock_lookup={level},warn",
                level = self.level
            ))
        })
    }
}

/// ログを初期化（2回目以降の呼び出しは無視される）
pub fn init_logging(config: &LoggingConfig) {
    let result = fmt()
        .with_env_filter(config.env_filter())
        .with_target(config.with_target)
        .with_writer(std::io::stderr)
        .try_init();

    if result.is_err() {
        tracing::debug!("ログは初期化済み");
    }
}
