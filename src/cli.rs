use clap::{Parser, Subcommand};
use crate::error::{LookupError, Result};
use std::path::{Path, PathBuf};
use stock_lookup_common::{ResultColumn, ViewFilter};

#[derive(Parser)]
#[command(name = "stock-lookup")]
#[command(about = "シリアル番号一括照合ツール（マスタ表からVLOOKUP）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// データ表のシリアル番号をマスタ表で照合
    Search {
        /// マスタ表（B列がシリアル番号）
        #[arg(required = true)]
        master: PathBuf,

        /// データ表（シリアル番号列は見出しから自動検出）
        #[arg(required = true)]
        data: PathBuf,

        /// 出力ファイル/ディレクトリ（省略時はTSVを標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (tsv/excel/json)。省略時は出力ファイルの拡張子から判断
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// 全列を対象にした文字列フィルタ
        #[arg(long)]
        filter: Option<String>,

        /// 列の値で絞り込み（例: --where STATUS=Active,Repair）
        #[arg(long = "where", value_name = "COLUMN=V1,V2")]
        conditions: Vec<String>,

        /// 並べ替える列
        #[arg(long)]
        sort: Option<String>,

        /// 降順で並べ替え
        #[arg(long, requires = "sort")]
        desc: bool,

        /// 品目ごとの件数を表示
        #[arg(long)]
        counts: bool,

        /// 並列ワーカー数（設定ファイルより優先）
        #[arg(long)]
        workers: Option<usize>,

        /// 1チャンクあたりの行数（設定ファイルより優先）
        #[arg(long)]
        chunk_size: Option<usize>,

        /// 読み込むシート（番号または名前）
        #[arg(long)]
        sheet: Option<String>,
    },

    /// シリアル番号列の検出結果を表示
    Detect {
        /// データ表
        #[arg(required = true)]
        data: PathBuf,

        /// 読み込むシート（番号または名前）
        #[arg(long)]
        sheet: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 並列ワーカー数を設定
        #[arg(long)]
        set_workers: Option<usize>,

        /// チャンクサイズを設定
        #[arg(long)]
        set_chunk_size: Option<usize>,

        /// 設定を初期値に戻す
        #[arg(long)]
        reset: bool,
    },

    /// 現在時刻から外部ID（YYYYMMDDHHmm）を出力
    ExternalId,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Tsv,
    Excel,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Tsv => "tsv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Json => "json",
        }
    }

    /// 出力パスの拡張子から形式を推定（不明ならTSV）
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or_default()
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" | "txt" => Ok(ExportFormat::Tsv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown format: {}. Use tsv, excel, or json", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Tsv => write!(f, "tsv"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// `COLUMN=V1,V2` を列と値の組に分解
pub fn parse_condition(condition: &str) -> Result<(ResultColumn, Vec<String>)> {
    let (column, values) = condition
        .split_once('=')
        .ok_or_else(|| LookupError::InvalidFilter(format!("'=' がありません: {}", condition)))?;

    let column: ResultColumn = column
        .parse()
        .map_err(|e: stock_lookup_common::Error| LookupError::InvalidFilter(e.to_string()))?;

    let values: Vec<String> = values
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return Err(LookupError::InvalidFilter(format!("値がありません: {}", condition)));
    }

    Ok((column, values))
}

/// コマンドライン指定から表示フィルタを作る
pub fn build_view_filter(text: Option<&str>, conditions: &[String]) -> Result<ViewFilter> {
    let mut filter = ViewFilter::new();
    if let Some(text) = text {
        filter.set_text(text);
    }
    for condition in conditions {
        let (column, values) = parse_condition(condition)?;
        filter.set_column(column, values);
    }
    Ok(filter)
}

pub fn parse_sort_column(column: &str) -> Result<ResultColumn> {
    column
        .parse()
        .map_err(|e: stock_lookup_common::Error| LookupError::InvalidFilter(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_parse() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.xlsx")), ExportFormat::Excel);
        assert_eq!(ExportFormat::from_path(Path::new("out.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Tsv);
    }

    #[test]
    fn test_parse_condition() {
        let (column, values) = parse_condition("status=Active, Repair").unwrap();
        assert_eq!(column, ResultColumn::Status);
        assert_eq!(values, vec!["Active", "Repair"]);

        assert!(matches!(parse_condition("STATUS"), Err(LookupError::InvalidFilter(_))));
        assert!(matches!(parse_condition("COLOR=red"), Err(LookupError::InvalidFilter(_))));
        assert!(matches!(parse_condition("ITEM= , "), Err(LookupError::InvalidFilter(_))));
    }

    #[test]
    fn test_build_view_filter() {
        let filter = build_view_filter(Some("Lap"), &["ITEM=Laptop".to_string()]).unwrap();
        assert!(filter.is_active());
        assert_eq!(filter.text.as_deref(), Some("lap"));
        assert!(filter.columns.contains_key(&ResultColumn::Item));

        assert!(!build_view_filter(None, &[]).unwrap().is_active());
    }

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from([
            "stock-lookup", "search", "master.xlsx", "data.csv", "--where", "STATUS=Active",
            "--sort", "ITEM", "--desc", "-f", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Search { conditions, desc, format, .. } => {
                assert_eq!(conditions, vec!["STATUS=Active"]);
                assert!(desc);
                assert_eq!(format, Some(ExportFormat::Json));
            }
            _ => panic!("search expected"),
        }
    }
}
