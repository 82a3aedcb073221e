//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Table shape error: row {row} has {actual} cells, expected {expected}")]
    TableShape {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_table_shape() {
        let error = Error::TableShape { row: 4, expected: 13, actual: 2 };
        assert_eq!(
            format!("{}", error),
            "Table shape error: row 4 has 2 cells, expected 13"
        );
    }

    #[test]
    fn test_error_debug() {
        let error = Error::UnknownColumn("COLOR".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("UnknownColumn"));
        assert!(debug.contains("COLOR"));
    }
}
