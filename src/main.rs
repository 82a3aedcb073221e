use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use stock_lookup_rust::{cli, config, error, export, external_id, loader, logging, session};
use cli::{Cli, Commands, ExportFormat};
use config::Config;
use error::{LookupError, Result};
use loader::SheetSelector;
use session::{LookupSession, MatchReport, RunHandle};
use std::path::Path;
use std::time::Duration;
use stock_lookup_common::{detect_serial_column_with_tier, distinct_values, sort_rows};

const SPINNER_TICK: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&logging::LoggingConfig::from_verbose(cli.verbose));
    let config = Config::load()?;

    match cli.command {
        Commands::Search {
            master,
            data,
            output,
            format,
            filter,
            conditions,
            sort,
            desc,
            counts,
            workers,
            chunk_size,
            sheet,
        } => {
            // 標準出力は結果用なので進捗は標準エラーへ
            eprintln!("🔎 stock-lookup - シリアル番号照合\n");

            let view_filter = cli::build_view_filter(filter.as_deref(), &conditions)?;
            let sort_column = sort.as_deref().map(cli::parse_sort_column).transpose()?;

            let mut engine = config.engine()?;
            if let Some(workers) = workers {
                if workers == 0 {
                    return Err(LookupError::Config("ワーカー数は1以上を指定してください".into()));
                }
                engine.workers = workers;
            }
            if let Some(chunk_size) = chunk_size {
                if chunk_size == 0 {
                    return Err(LookupError::Config("チャンクサイズは1以上を指定してください".into()));
                }
                engine.chunk_size = chunk_size;
            }

            let mut session = LookupSession::new(engine);
            if let Some(sheet) = sheet.or_else(|| config.sheet.clone()) {
                session.set_sheet(SheetSelector::parse(&sheet));
            }

            // 1. マスタ表
            eprintln!("[1/3] マスタ表を読み込み中...");
            session.load_master(&master)?;
            let master_rows = session.master_table().map(|t| t.len()).unwrap_or(0);
            eprintln!("✔ {}行\n", master_rows);

            // 2. データ表
            eprintln!("[2/3] データ表を読み込み中...");
            session.load_input(&data)?;
            if let (Some(col), Some(table)) = (session.serial_column(), session.input_table()) {
                eprintln!("✔ {}行 / シリアル番号列: {}\n", table.len(), table.columns()[col]);
            }

            // 3. 照合
            eprintln!("[3/3] 照合中... (ワーカー: {})", session.config().workers);
            let handle = session.spawn_run()?;
            let outcome = wait_with_spinner(handle);
            session.accept(outcome)?;
            let report = session.report().cloned().ok_or(LookupError::RunAborted)?;
            eprintln!(
                "✔ 照合完了: {}件中 {}件一致 / {}件 NOT_FOUND\n",
                report.total(),
                report.matched,
                report.not_found()
            );

            let mut rows = view_filter.apply(&report.rows);
            if let Some(column) = sort_column {
                sort_rows(&mut rows, column, desc);
            }
            if view_filter.is_active() {
                eprintln!("- フィルタ適用: {}件", rows.len());
                if rows.is_empty() {
                    for column in view_filter.columns.keys() {
                        let candidates = distinct_values(&report.rows, *column);
                        eprintln!("  {} の値: {}", column, candidates.join(", "));
                    }
                }
            }
            let view = report.with_rows(rows);

            if counts {
                print_item_counts(&view);
            }

            match output {
                Some(path) => {
                    let format = format.unwrap_or_else(|| ExportFormat::from_path(&path));
                    eprintln!("- {}を出力中...", format);
                    let written = export::export_report(&view, format, &path)?;
                    eprintln!("✔ 出力: {}", written.display());
                }
                None => print_to_stdout(&view, format.unwrap_or_default())?,
            }

            eprintln!("\n✅ 照合完了");
        }

        Commands::Detect { data, sheet } => {
            let sheet = sheet
                .or_else(|| config.sheet.clone())
                .map(|s| SheetSelector::parse(&s))
                .unwrap_or_default();

            let table = loader::load_table(&data, &sheet)?;
            println!("列見出し ({}):", display_name(&data));
            for (i, column) in table.columns().iter().enumerate() {
                println!("  [{}] {}", i, column);
            }

            match detect_serial_column_with_tier(table.columns()) {
                Some((index, tier)) => {
                    println!("✔ シリアル番号列: [{}] {} ({})", index, table.columns()[index], tier);
                }
                None => {
                    return Err(LookupError::ColumnNotDetected(data.display().to_string()));
                }
            }
        }

        Commands::Config { show, set_workers, set_chunk_size, reset } => {
            let mut config = if reset {
                let config = Config::default();
                config.save()?;
                println!("✔ 設定を初期化しました");
                config
            } else {
                config
            };

            if let Some(workers) = set_workers {
                config.set_workers(workers)?;
                println!("✔ ワーカー数を設定しました: {}", workers);
            }

            if let Some(chunk_size) = set_chunk_size {
                config.set_chunk_size(chunk_size)?;
                println!("✔ チャンクサイズを設定しました: {}", chunk_size);
            }

            if show || (!reset && set_workers.is_none() && set_chunk_size.is_none()) {
                println!("設定: {}", Config::config_path()?.display());
                println!("  ワーカー数: {}", config.resolved_workers()?);
                println!("  チャンクサイズ: {}", config.chunk_size);
                println!("  シート: {}", config.sheet.as_deref().unwrap_or("(先頭)"));
                let f = &config.fields;
                println!(
                    "  列位置: 品目={} 型式={} 場所={} 状態={} 内部ID={}",
                    f.item, f.model, f.location, f.status, f.internal_id
                );
            }
        }

        Commands::ExternalId => {
            println!("{}", external_id::external_id());
        }
    }

    Ok(())
}

/// 照合完了までスピナーを表示
fn wait_with_spinner(handle: RunHandle) -> session::RunOutcome {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("照合中");

    let mut handle = handle;
    let outcome = loop {
        match handle.wait_timeout(SPINNER_TICK) {
            Ok(outcome) => break outcome,
            Err(pending) => {
                spinner.tick();
                handle = pending;
            }
        }
    };

    spinner.finish_and_clear();
    outcome
}

fn print_item_counts(report: &MatchReport) {
    eprintln!("品目別件数:");
    for (item, count) in &report.item_counts {
        eprintln!("  {}: {}", item, count);
    }
    eprintln!();
}

fn print_to_stdout(report: &MatchReport, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Tsv => println!("{}", report.to_tsv()),
        ExportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        ExportFormat::Excel => {
            return Err(LookupError::Config("Excel出力には -o で出力先を指定してください".into()));
        }
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
