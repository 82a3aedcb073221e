//! 照合結果のファイル出力

use crate::cli::ExportFormat;
use crate::error::{LookupError, Result};
use crate::session::MatchReport;
use std::path::{Path, PathBuf};

/// 出力先がフォルダまたは拡張子なしのときのファイル名
pub const DEFAULT_TITLE: &str = "lookup_results";

pub fn output_path_for_format(output: &Path, format: ExportFormat) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", DEFAULT_TITLE, format.extension()))
    } else {
        output.to_path_buf()
    }
}

/// 結果を指定形式で書き出し、書き込んだパスを返す
pub fn export_report(report: &MatchReport, format: ExportFormat, output: &Path) -> Result<PathBuf> {
    let output_path = output_path_for_format(output, format);
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        ExportFormat::Tsv => {
            std::fs::write(&output_path, report.to_tsv())?;
        }
        ExportFormat::Excel => {
            let buffer = stock_lookup_common::export::excel_core::generate_results_buffer(
                &report.rows,
                &report.item_counts,
            )
            .map_err(LookupError::ExcelGeneration)?;
            std::fs::write(&output_path, buffer)?;
        }
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            std::fs::write(&output_path, json)?;
        }
    }

    tracing::debug!(format = %format, rows = report.rows.len(), "出力: {}", output_path.display());
    Ok(output_path)
}
