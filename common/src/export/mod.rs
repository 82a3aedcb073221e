//! 出力コア（CLI・他のフロントエンド共通）

pub mod tsv;

#[cfg(feature = "excel")]
pub mod excel_core;
