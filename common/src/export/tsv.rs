//! タブ区切りテキスト出力
//!
//! 表計算ソフトへ貼り付けられる形式:
//! 見出し行 + 1行1レコード、セルはタブ区切り、行は `\n` 区切り（末尾改行なし）。

use crate::layout::RESULT_COLUMNS;
use crate::types::MatchRow;

/// 結果行をタブ区切りテキストに変換
pub fn to_tsv(rows: &[MatchRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);

    let header: Vec<&str> = RESULT_COLUMNS.iter().map(|c| c.label()).collect();
    lines.push(header.join("\t"));

    for row in rows {
        let cells: Vec<String> = RESULT_COLUMNS
            .iter()
            .map(|c| sanitize_cell(&c.cell(row)))
            .collect();
        lines.push(cells.join("\t"));
    }

    lines.join("\n")
}

/// セル内のタブ・改行は空白に置き換える（列ずれ防止）
fn sanitize_cell(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}
