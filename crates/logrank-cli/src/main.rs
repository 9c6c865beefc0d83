use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logrank_cli::OutputFormat;
use logrank_cli::commands;
use logrank_core::pipeline::RunOutcome;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit status of a run stopped by the error-rate gate
const EXIT_ABORTED: u8 = 2;

#[derive(Parser)]
#[command(name = "logrank")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Rank the slowest URLs of an nginx access log into an HTML report",
    long_about = "logrank finds the latest dated access log in a directory, aggregates request \
                  times per URL and renders the slowest URLs into a static HTML report."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a JSON config file merged over the defaults
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format for terminal output
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a report for the latest log file (default)
    Run,

    /// Print the slowest URLs of a single log file
    Stats {
        /// Path to the access log (plain or .gz)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of URLs to show (defaults to REPORT_SIZE)
        #[arg(long)]
        top: Option<usize>,

        /// Error-rate threshold in [0, 1] (defaults to ERROR_THRESHOLD)
        #[arg(long)]
        threshold: Option<f64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Nothing is logged before the subscriber exists, so setup errors go
    // straight to stderr
    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return report_setup_error(e),
    };

    // Initialize logging
    if let Err(e) = init_logging(cli.verbose, config.log_file.as_deref()) {
        return report_setup_error(e);
    }

    if let Some(path) = &cli.config {
        tracing::info!("Using config from file {}", path.display());
    }

    // Execute the command
    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::execute(&config).map(|outcome| match outcome {
            RunOutcome::Aborted { .. } => ExitCode::from(EXIT_ABORTED),
            _ => ExitCode::SUCCESS,
        }),
        Commands::Stats {
            file,
            top,
            threshold,
        } => commands::stats::execute(
            &file,
            top.unwrap_or(config.report_size),
            threshold.unwrap_or(config.error_threshold),
            cli.format,
        )
        .map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            // a log file hides the error from whoever ran the command
            if config.log_file.is_some() {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn report_setup_error(e: anyhow::Error) -> ExitCode {
    eprintln!("Error: {:#}", e);
    ExitCode::FAILURE
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt::time::ChronoLocal;

    let filter = if verbose {
        EnvFilter::new("logrank=debug,logrank_cli=debug,logrank_core=debug")
    } else {
        EnvFilter::new("logrank=info,logrank_cli=info")
    };
    let timer = ChronoLocal::new("[%Y.%m.%d %H:%M:%S]".to_string());

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_timer(timer)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_timer(timer)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
