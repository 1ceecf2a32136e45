mod repl;

use anyhow::Result;
use clap::{Parser, Subcommand};
use criblog_core::config::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "criblog",
    about = "Sleep and feeding analytics over exported chat archives",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/criblog/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive console (default)
    Repl,

    /// One-shot report over an archive file
    Report {
        /// Path to the exported chat archive (JSON)
        #[arg(short, long)]
        archive: PathBuf,

        /// Optional date range: one date, or from + to (YYYY-MM-DD,
        /// `today`, `yesterday`)
        dates: Vec<String>,
    },

    /// Start the HTTP server
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Open config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "criblog=info,warn".into()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config.
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(h) = host {
                config.server.host = h;
            }
            if let Some(p) = port {
                config.server.port = p;
            }
            criblog_server::serve(config).await?;
        }
        Some(Commands::Report { archive, dates }) => {
            run_report(&archive, &dates)?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &config)?;
        }
        Some(Commands::Repl) | None => {
            repl::run(config)?;
        }
    }

    Ok(())
}

/// Load an archive and print the daily report in one shot.
fn run_report(archive: &PathBuf, dates: &[String]) -> Result<()> {
    use criblog_analytics::ReportGenerator;
    use criblog_core::command::{parse_range, resolve_range};

    let raw = std::fs::read_to_string(archive)?;
    let dataset = criblog_core::ingest_json(&raw)?;
    tracing::info!(
        sleep = dataset.sleep.len(),
        feeds = dataset.feeds.len(),
        "Ingested {}",
        archive.display()
    );
    if dataset.is_empty() {
        println!(
            "No sleep or feed records recognized in {}.",
            archive.display()
        );
        return Ok(());
    }

    let args: Vec<&str> = dates.iter().map(String::as_str).collect();
    let today = chrono::Local::now().date_naive();
    let parsed = parse_range(&args, today)?;
    let (start, end) = resolve_range(&dataset, parsed)?;
    print!("{}", ReportGenerator::daily_report(&dataset, start, end)?);
    Ok(())
}

fn handle_config_command(action: Option<ConfigAction>, config: &AppConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = AppConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", AppConfig::default_path().display());
        }
    }
    Ok(())
}
