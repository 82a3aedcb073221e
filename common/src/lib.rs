//! Stock Lookup Common Library
//!
//! CLIとセッションで共有される型と照合の基本処理（I/Oなし）

pub mod types;
pub mod layout;
pub mod error;
pub mod normalize;
pub mod column;
pub mod aggregate;
pub mod filter;
pub mod export;

pub use types::{CellValue, ItemCount, MatchRow, Table, NOT_FOUND};
pub use layout::{ResultColumn, RESULT_COLUMNS};
pub use error::{Error, Result};
pub use normalize::{normalize, normalize_str};
pub use column::{detect_serial_column, detect_serial_column_with_tier, MatchTier};
pub use aggregate::{annotate, annotate_in_place, count_by_item};
pub use filter::{distinct_values, sort_rows, ViewFilter};
pub use export::tsv::to_tsv;
