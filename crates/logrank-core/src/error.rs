use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read log directory {}: {source}", .path.display())]
    LogDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Log file {name} carries an invalid date: {date}")]
    InvalidLogDate { name: String, date: String },

    #[error("Failed to read log file {}: {source}", .path.display())]
    ReadLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Parsing aborted: error rate {error_rate:.3} reached threshold {threshold:.3} \
         ({error_lines} malformed, {total_lines} parsed)"
    )]
    ExcessiveErrorRate {
        error_rate: f64,
        threshold: f64,
        error_lines: usize,
        total_lines: usize,
    },

    #[error("Failed to read report template {}: {source}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report template {} has no $table_json placeholder", .path.display())]
    MissingPlaceholder { path: PathBuf },

    #[error("Failed to write report {}: {source}", .path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load config file {}: {reason}", .path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to serialize report records: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
