//! Excel 2003 XML（SpreadsheetML）読み込み
//!
//! `ss:Index` による空セルの読み飛ばしに対応する。セル値はすべて文字列として読む。

use super::{rows_to_table, FormatAdapter, SheetSelector};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use stock_lookup_common::{CellValue, Table};

/// 判定に使う先頭バイト数
const SNIFF_LEN: usize = 1000;
const SPREADSHEET_NS: &[u8] = b"urn:schemas-microsoft-com:office:spreadsheet";

pub struct SpreadsheetXmlAdapter;

impl FormatAdapter for SpreadsheetXmlAdapter {
    fn name(&self) -> &'static str {
        "spreadsheet-xml"
    }

    fn load(&self, path: &Path, sheet: &SheetSelector) -> Result<Table, String> {
        let mut head = Vec::with_capacity(SNIFF_LEN);
        File::open(path)
            .map_err(|e| e.to_string())?
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut head)
            .map_err(|e| e.to_string())?;

        if !looks_like_spreadsheet_xml(&head) {
            return Err("Excel 2003 XML形式ではありません".to_string());
        }

        let file = File::open(path).map_err(|e| e.to_string())?;
        let rows = parse_rows(BufReader::new(file), sheet)?;
        rows_to_table(rows)
    }
}

/// 先頭バイトが SpreadsheetML か
pub fn looks_like_spreadsheet_xml(head: &[u8]) -> bool {
    contains(head, b"<?xml") && (contains(head, b"xmlns:ss=") || contains(head, SPREADSHEET_NS))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// 属性値を取得（名前空間接頭辞は無視）
fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, String> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// `ss:Index`（1始まり）まで空セルで埋める
fn pad_to_index(row: &mut Vec<CellValue>, e: &BytesStart<'_>) -> Result<(), String> {
    if let Some(index) = attribute(e, b"Index")? {
        let target = index
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("ss:Index が不正: {}", index))?
            .saturating_sub(1);
        while row.len() < target {
            row.push(CellValue::Empty);
        }
    }
    Ok(())
}

fn parse_rows<R: BufRead>(source: R, sheet: &SheetSelector) -> Result<Vec<Vec<CellValue>>, String> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    let mut worksheet_count = 0usize;
    let mut selected = false;
    let mut found = false;
    let mut current_row: Option<Vec<CellValue>> = None;
    let mut in_cell = false;
    let mut in_data = false;
    let mut text = String::new();
    let mut cell_value: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf).map_err(|e| e.to_string())? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Worksheet" => {
                    let name = attribute(&e, b"Name")?;
                    selected = match sheet {
                        SheetSelector::Index(i) => worksheet_count == *i,
                        SheetSelector::Name(wanted) => name.as_deref() == Some(wanted.as_str()),
                    };
                    worksheet_count += 1;
                    found |= selected;
                }
                b"Row" if selected => current_row = Some(Vec::new()),
                b"Cell" if selected => {
                    if let Some(row) = current_row.as_mut() {
                        pad_to_index(row, &e)?;
                        in_cell = true;
                        cell_value = None;
                    }
                }
                b"Data" if in_cell => {
                    in_data = true;
                    text.clear();
                }
                _ => {}
            },
            Event::Empty(e) => {
                if selected && e.local_name().as_ref() == b"Cell" {
                    if let Some(row) = current_row.as_mut() {
                        pad_to_index(row, &e)?;
                        row.push(CellValue::Empty);
                    }
                }
            }
            Event::Text(t) if in_data => {
                text.push_str(&t.unescape().map_err(|e| e.to_string())?);
            }
            Event::CData(c) if in_data => {
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"Data" if in_data => {
                    in_data = false;
                    cell_value = Some(std::mem::take(&mut text));
                }
                b"Cell" if in_cell => {
                    in_cell = false;
                    if let Some(row) = current_row.as_mut() {
                        let cell = match cell_value.take() {
                            Some(value) if !value.is_empty() => CellValue::Text(value),
                            _ => CellValue::Empty,
                        };
                        row.push(cell);
                    }
                }
                b"Row" => {
                    if let Some(row) = current_row.take() {
                        rows.push(row);
                    }
                }
                b"Worksheet" if selected => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !found {
        return Err(format!("シート {} がありません", sheet));
    }
    Ok(rows)
}
