//! Stock Lookup
//!
//! データ表のシリアル番号をマスタ表（B列がキー）で一括照合するツール

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod external_id;
pub mod loader;
pub mod logging;
pub mod matcher;
pub mod session;

pub use error::{LookupError, Result};
pub use session::{Accepted, LookupSession, MatchReport, RunHandle, RunOutcome};
