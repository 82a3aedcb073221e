//! 結果表のレイアウト定義
//!
//! 出力列の並び順・見出し・フィールドキーを一箇所で定義する。
//! TSV/Excel出力と表示フィルタはすべてこの定義に従う。

use crate::error::Error;
use crate::types::MatchRow;
use std::borrow::Cow;
use std::str::FromStr;

/// 結果表の列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResultColumn {
    Serial,
    Item,
    Model,
    Location,
    Status,
    Combined,
    ItemCount,
    InternalId,
}

/// 出力順の全列
pub const RESULT_COLUMNS: [ResultColumn; 8] = [
    ResultColumn::Serial,
    ResultColumn::Item,
    ResultColumn::Model,
    ResultColumn::Location,
    ResultColumn::Status,
    ResultColumn::Combined,
    ResultColumn::ItemCount,
    ResultColumn::InternalId,
];

impl ResultColumn {
    /// 見出し
    pub fn label(self) -> &'static str {
        match self {
            ResultColumn::Serial => "SERIAL NUMBER",
            ResultColumn::Item => "ITEM",
            ResultColumn::Model => "MODEL",
            ResultColumn::Location => "LOCATION",
            ResultColumn::Status => "STATUS",
            ResultColumn::Combined => "ITEM MODEL",
            ResultColumn::ItemCount => "ITEM COUNT",
            ResultColumn::InternalId => "ITEM INTERNAL ID",
        }
    }

    /// フィールドキー（CLI引数・JSON用）
    pub fn key(self) -> &'static str {
        match self {
            ResultColumn::Serial => "serial",
            ResultColumn::Item => "item",
            ResultColumn::Model => "model",
            ResultColumn::Location => "location",
            ResultColumn::Status => "status",
            ResultColumn::Combined => "combined",
            ResultColumn::ItemCount => "item_count",
            ResultColumn::InternalId => "internal_id",
        }
    }

    /// 行からこの列の値を取り出す
    pub fn cell(self, row: &MatchRow) -> Cow<'_, str> {
        match self {
            ResultColumn::Serial => Cow::Borrowed(&row.serial),
            ResultColumn::Item => Cow::Borrowed(&row.item),
            ResultColumn::Model => Cow::Borrowed(&row.model),
            ResultColumn::Location => Cow::Borrowed(&row.location),
            ResultColumn::Status => Cow::Borrowed(&row.status),
            ResultColumn::Combined => Cow::Borrowed(&row.combined),
            ResultColumn::ItemCount => Cow::Owned(row.item_count.to_string()),
            ResultColumn::InternalId => Cow::Borrowed(&row.internal_id),
        }
    }
}

impl std::fmt::Display for ResultColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ResultColumn {
    type Err = Error;

    /// 見出し・フィールドキーのどちらでも受け付ける（大文字小文字無視）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RESULT_COLUMNS
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted) || c.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownColumn(wanted.to_string()))
    }
}

/// 見出し行
pub fn header_labels() -> Vec<&'static str> {
    RESULT_COLUMNS.iter().map(|c| c.label()).collect()
}
