use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use tracing_subscriber::prelude::*;
use tracing_log::LogTracer;
use tracing::subscriber as tracing_subscriber_global;
use anyhow::{Result, Context};
use recording_renamer as lib;
use lib::config::Config;
use lib::datetime::PermissiveParser;
use lib::rename::RenameOptions;

#[derive(Parser)]
#[command(name = "recording-renamer", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy recordings to timestamped names (default when no subcommand is given)
    Rename {
        /// CSV metadata sheet with "File name" and "Start date" columns
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// Folder holding the original recordings
        #[arg(long, value_name = "DIR")]
        input_dir: Option<PathBuf>,

        /// Folder receiving the renamed copies
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Dry run: report the new names but do not copy anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate config file and exit
    ConfigValidate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Resolve config path: explicit --config overrides; otherwise use
    // ./renamer.toml when present and built-in defaults when not.
    let resolved_config_path: Option<PathBuf> = match &cli.config {
        Some(p) => Some(p.clone()),
        None => {
            let local = Path::new("renamer.toml");
            if local.exists() { Some(local.to_path_buf()) } else { None }
        }
    };

    let cfg = match &resolved_config_path {
        Some(p) => Config::from_path(p)
            .with_context(|| format!("loading config from {}", p.display()))?,
        None => Config::default(),
    };

    // Keep the guard alive for the whole run so buffered log lines are flushed.
    let _guard = init_logging(&cfg)?;

    match cli.command {
        None => run_rename(&cfg, RenameOptions::from_config(&cfg))?,
        Some(Commands::Rename { csv, input_dir, output_dir, dry_run }) => {
            let mut opts = RenameOptions::from_config(&cfg).dry_run(dry_run);
            if let Some(csv) = csv {
                opts.csv_path = csv;
            }
            if let Some(dir) = input_dir {
                opts = opts.input_dir(dir);
            }
            if let Some(dir) = output_dir {
                opts = opts.output_dir(dir);
            }
            run_rename(&cfg, opts)?;
        }
        Some(Commands::ConfigValidate) => {
            // a missing file was already reported above; defaults are always valid
            match &resolved_config_path {
                Some(p) => println!("OK ({})", p.display()),
                None => println!("OK (built-in defaults)"),
            }
        }
    }

    Ok(())
}

fn run_rename(cfg: &Config, opts: RenameOptions) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = lib::rename::rename_recordings(&opts, &PermissiveParser, &mut out)
        .with_context(|| format!("renaming recordings listed in {}", opts.csv_path.display()))?;

    for name in &report.duplicates {
        tracing::warn!("{} was written by several rows; only the last copy remains", name);
    }
    for orphan in lib::rename::unreferenced_inputs(&opts.input_dir, &report, &cfg.file_extensions) {
        tracing::warn!("{} is not listed in the CSV", orphan.display());
    }
    Ok(())
}

/// Initialize log->tracing bridge and structured logging.
/// Logs go to stderr and, when `log_dir` is set, to a daily-rotated file.
fn init_logging(cfg: &Config) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let _ = LogTracer::init();

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match &cfg.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "recording-renamer.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().with_ansi(false).with_writer(non_blocking)), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer);

    // Install without tracing-subscriber's own log bridge; LogTracer is already set.
    tracing_subscriber_global::set_global_default(subscriber)
        .context("failed to set global tracing subscriber")?;
    Ok(guard)
}
