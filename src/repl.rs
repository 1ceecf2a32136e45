use anyhow::Result;
use chrono::NaiveDate;
use criblog_analytics::ReportGenerator;
use criblog_charts::{prepare_summary, prepare_timeline};
use criblog_core::command::{parse_range, resolve_range};
use criblog_core::config::AppConfig;
use criblog_core::error::Error;
use criblog_core::records::Dataset;
use rustyline::error::ReadlineError;
use rustyline::{Config as RlConfig, DefaultEditor};
use std::path::Path;

const BANNER: &str = r#"
  ╔═══════════════════════════════════════════╗
  ║              criblog v0.1.0               ║
  ║   Sleep & feeding analytics console       ║
  ╚═══════════════════════════════════════════╝

  Commands:
    /load <path>            — Ingest an exported chat archive (JSON)
    /report [dates]         — Daily text report
    /timeline [dates]       — Write the timeline chart series
    /summary [dates]        — Write the summary chart series
    /help                   — Show this help
    /exit                   — Quit

  Dates: none (whole dataset), one day, or from + to.
  YYYY-MM-DD, `today` and `yesterday` are accepted.
"#;

/// Run the interactive console.
///
/// The console owns the dataset handle for its lifetime; each successful
/// `/load` replaces it wholesale.
pub fn run(config: AppConfig) -> Result<()> {
    println!("{}", BANNER);

    let rl_config = RlConfig::builder().auto_add_history(true).build();
    let history_path = AppConfig::data_dir().join("repl_history.txt");
    let mut rl = DefaultEditor::with_config(rl_config)?;
    let _ = rl.load_history(&history_path);

    let mut dataset: Option<Dataset> = None;

    loop {
        match rl.readline("\x1b[1;36mcriblog\x1b[0m \x1b[1;32m❯\x1b[0m ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if !input.starts_with('/') {
                    println!("  Commands start with '/'. Try /help.");
                    continue;
                }
                if !handle_command(input, &mut dataset, &config) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                println!("  Input error: {}", e);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&history_path);
    Ok(())
}

/// Dispatch one slash command. Returns false on /exit.
fn handle_command(input: &str, dataset: &mut Option<Dataset>, config: &AppConfig) -> bool {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    match command {
        "/exit" | "/quit" => return false,
        "/help" => println!("{}", BANNER),
        "/load" => match args.as_slice() {
            [path] => load_archive(path, dataset),
            _ => println!("  Usage: /load <path>"),
        },
        "/report" => {
            with_range(dataset.as_ref(), &args, |ds, start, end| {
                let report = ReportGenerator::daily_report(ds, start, end)?;
                print!("{}", report);
                Ok(())
            });
        }
        "/timeline" => {
            with_range(dataset.as_ref(), &args, |ds, start, end| {
                let (sleep, feeds) = ds.slice(start, end);
                let series = prepare_timeline(&sleep, &feeds)
                    .ok_or(Error::RangeEmpty { start, end })?;
                write_series(config, "timeline", start, end, &serde_json::to_vec_pretty(&series)?)
            });
        }
        "/summary" => {
            with_range(dataset.as_ref(), &args, |ds, start, end| {
                let (sleep, feeds) = ds.slice(start, end);
                let series = prepare_summary(&sleep, &feeds)
                    .ok_or(Error::RangeEmpty { start, end })?;
                write_series(config, "summary", start, end, &serde_json::to_vec_pretty(&series)?)
            });
        }
        _ => println!("  Unknown command: {}. Try /help.", command),
    }

    true
}

fn load_archive(path: &str, dataset: &mut Option<Dataset>) {
    let raw = match std::fs::read_to_string(Path::new(path)) {
        Ok(raw) => raw,
        Err(e) => {
            println!("  Cannot read {}: {}", path, e);
            return;
        }
    };
    match criblog_core::ingest_json(&raw) {
        Ok(fresh) => {
            if fresh.is_empty() {
                println!("  No sleep or feed records recognized in this archive.");
            } else {
                println!(
                    "  Loaded {} sleep and {} feed records.",
                    fresh.sleep.len(),
                    fresh.feeds.len()
                );
            }
            // Replace wholesale; a failed ingestion never reaches this
            // point, so the previous dataset survives it.
            *dataset = Some(fresh);
        }
        Err(e) => println!("  {}", user_message(&e)),
    }
}

/// Resolve the date arguments against the held dataset and run `action`
/// over the resulting range, printing the distinct failure wordings.
fn with_range<F>(dataset: Option<&Dataset>, args: &[&str], action: F)
where
    F: FnOnce(&Dataset, NaiveDate, NaiveDate) -> Result<(), Error>,
{
    let Some(ds) = dataset else {
        println!("  {}", user_message(&Error::NoDataset));
        return;
    };

    let today = chrono::Local::now().date_naive();
    let result = parse_range(args, today)
        .and_then(|parsed| resolve_range(ds, parsed))
        .and_then(|(start, end)| action(ds, start, end));

    if let Err(e) = result {
        println!("  {}", user_message(&e));
    }
}

fn write_series(
    config: &AppConfig,
    kind: &str,
    start: NaiveDate,
    end: NaiveDate,
    bytes: &[u8],
) -> Result<(), Error> {
    let dir = config.charts_dir();
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}-{}-{}.json", kind, start, end));
    std::fs::write(&path, bytes)?;
    println!("  Series written to {}", path.display());
    Ok(())
}

/// The user-facing wording for each failure signal. No-dataset,
/// range-empty, bad-date and ingestion-failed must stay distinguishable.
fn user_message(err: &Error) -> String {
    match err {
        Error::NoDataset => "No dataset loaded. Use /load <path> first.".into(),
        Error::RangeEmpty { start, end } => format!("No records between {} and {}.", start, end),
        Error::BadDateArg(arg) => format!(
            "Malformed date argument: {}. Use YYYY-MM-DD, today or yesterday.",
            arg
        ),
        Error::Archive(msg) => format!("Ingestion failed: {}", msg),
        other => other.to_string(),
    }
}
