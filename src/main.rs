use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use mediadex::config::Config;
use mediadex::db::Store;
use mediadex::scanner::{ScanOptions, Scanner};
use mediadex::{export, logging, stats};

#[derive(Parser)]
#[command(name = "mediadex", version, about = "Incremental media metadata catalog")]
struct Cli {
    /// Path to the config file
    #[arg(long, short = 'g', global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database file
    #[arg(long, short = 'd', global = true)]
    db_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree into the catalog
    Scan {
        /// Directory to scan
        directory: PathBuf,

        /// Worker threads (0 = available parallelism)
        #[arg(long, short = 't', default_value = "0")]
        threads: usize,

        /// Additional file extensions, comma-separated
        #[arg(long, short = 'e', value_delimiter = ',')]
        extensions: Vec<String>,

        /// Scan only media files (images and videos)
        #[arg(long, short = 'm')]
        media_only: bool,

        /// Reprocess files even when unchanged
        #[arg(long, short = 'f')]
        force: bool,

        /// Recompute capture times for all files (implies --force)
        #[arg(long, short = 'a')]
        force_all_dates: bool,

        /// Reject implausible capture dates
        #[arg(long)]
        strict_dates: bool,

        /// Print store statistics after the scan
        #[arg(long, short = 's')]
        stats: bool,
    },

    /// Dump all catalog rows to a CSV file
    ExportCsv {
        /// Output CSV path
        output: PathBuf,
    },

    /// List media for the given dates, optionally copying renamed files
    Export {
        /// Dates in YYYY-MM-DD format
        #[arg(required = true)]
        dates: Vec<String>,

        /// Copy matching files into this directory, renamed by capture time
        #[arg(long)]
        copy_to: Option<PathBuf>,

        /// Remove existing files from the target directory first
        #[arg(long)]
        clean: bool,
    },

    /// Print store statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, Some(Config::config_dir().join("logs")))?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(db_path) = &cli.db_path {
        config.db_path = db_path.clone();
    }

    let store = Store::open(&config.db_path)
        .with_context(|| format!("failed to open store at {}", config.db_path.display()))?;
    store.initialize().context("failed to initialize store")?;

    match cli.command {
        Commands::Scan {
            directory,
            threads,
            extensions,
            media_only,
            force,
            force_all_dates,
            strict_dates,
            stats: show_stats,
        } => {
            if !directory.is_dir() {
                bail!("directory not found: {}", directory.display());
            }
            let options = ScanOptions {
                force,
                force_all_dates,
                strict_dates,
                media_only,
                extra_extensions: extensions,
                threads,
            };
            let scanner = Scanner::new(config.clone(), options);
            let run = scanner.scan_directory(&directory, store)?;

            if show_stats {
                let store = Store::open(&config.db_path)?;
                stats::print_report(&stats::collect(&store)?, Some(&run));
            }
        }

        Commands::ExportCsv { output } => {
            let count = export::export_csv(&store, &output)?;
            info!(count, output = %output.display(), "exported catalog to CSV");
        }

        Commands::Export {
            dates,
            copy_to,
            clean,
        } => {
            for date in &dates {
                export::validate_date(date)?;
            }
            let records = store.records_for_dates(&dates)?;
            export::print_listing(&records);

            if let Some(destination) = copy_to {
                let outcome = export::copy_renamed(&records, &destination, clean)?;
                info!(
                    copied = outcome.copied,
                    failed = outcome.failed,
                    destination = %destination.display(),
                    "export copy finished"
                );
            }
        }

        Commands::Stats => {
            stats::print_report(&stats::collect(&store)?, None);
        }
    }

    Ok(())
}
