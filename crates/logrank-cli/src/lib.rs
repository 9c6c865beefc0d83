use clap::ValueEnum;

pub mod commands;

/// How the `stats` command prints its ranking
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable table
    #[default]
    Pretty,
    /// A single JSON document on stdout
    Json,
    /// CSV rows with the report's column names as header
    Table,
}
