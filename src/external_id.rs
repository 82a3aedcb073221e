//! 外部ID（取込日時から作る識別子）

use chrono::{DateTime, Local, TimeZone};

const EXTERNAL_ID_FORMAT: &str = "%Y%m%d%H%M";

/// 現在時刻の外部ID（YYYYMMDDHHmm）
pub fn external_id() -> String {
    format_external_id(&Local::now())
}

pub fn format_external_id<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(EXTERNAL_ID_FORMAT).to_string()
}
