//! セル値の正規化
//!
//! セル値を照合キー用の文字列に変換する。
//!
//! - 空セル → 空文字
//! - 数値 → 小数部を切り捨てた整数表記（四捨五入しない）
//! - 文字列 → 前後の空白を除去。小数点を含む数値文字列は整数部のみ
//!
//! 正規化は冪等: `normalize_str(&normalize(v)) == normalize(v)`

use crate::types::CellValue;

/// セル値を照合キーに正規化
pub fn normalize(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) => normalize_float(*f),
        CellValue::Text(s) => normalize_str(s),
    }
}

/// 文字列を照合キーに正規化
pub fn normalize_str(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.contains('.') {
        if let Ok(num) = trimmed.parse::<f64>() {
            if num.is_finite() {
                return truncate_to_string(num);
            }
        }
    }
    trimmed.to_string()
}

fn normalize_float(value: f64) -> String {
    if value.is_nan() {
        return String::new();
    }
    if value.is_infinite() {
        return value.to_string();
    }
    truncate_to_string(value)
}

fn truncate_to_string(value: f64) -> String {
    let truncated = value.trunc();
    // -0.5 などは "-0" ではなく "0"
    if truncated == 0.0 {
        return "0".to_string();
    }
    format!("{:.0}", truncated)
}
