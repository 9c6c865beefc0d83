pub mod run;
pub mod stats;

use anyhow::{Context, Result};
use logrank_core::config::AnalyzerConfig;
use std::path::Path;

/// Load the analyzer config, falling back to built-in defaults when no file
/// is given
pub fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(AnalyzerConfig::default()),
    }
}
