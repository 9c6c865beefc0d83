use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Runtime settings for a single analyzer run.
///
/// Keys in a JSON config file use the upper-case names (`REPORT_SIZE`,
/// `LOG_DIR`, ...). Any key missing from the file keeps its default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Maximum number of ranked URLs kept in the report
    pub report_size: usize,
    pub report_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Optional file to send the analyzer's own log output to; an empty
    /// string means the console
    #[serde(deserialize_with = "empty_path_as_none")]
    pub log_file: Option<PathBuf>,
    /// Fraction of malformed lines at which a parse is abandoned
    pub error_threshold: f64,
    pub report_template_path: PathBuf,
    /// Filename prefix of access logs, followed by `-YYYYMMDD[.gz]`
    pub log_prefix: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            report_size: 10,
            report_dir: PathBuf::from("./reports"),
            log_dir: PathBuf::from("./log"),
            log_file: None,
            error_threshold: 0.7,
            report_template_path: PathBuf::from("./report.html"),
            log_prefix: "nginx-access-ui.log".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Load a config file and merge it over the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Loading config from: {}", path.display());

        let file = File::open(path).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: AnalyzerConfig =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::ConfigFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a JSON string and merge it over the defaults
    pub fn from_str(content: &str) -> Result<Self> {
        let config: AnalyzerConfig = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("malformed config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.report_size == 0 {
            return Err(Error::Config("REPORT_SIZE must be at least 1".to_string()));
        }
        validate_threshold(self.error_threshold)?;
        if self.log_prefix.is_empty() {
            return Err(Error::Config("LOG_PREFIX must not be empty".to_string()));
        }
        Ok(())
    }
}

fn empty_path_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let path: Option<PathBuf> = Option::deserialize(deserializer)?;
    Ok(path.filter(|p| !p.as_os_str().is_empty()))
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(Error::Config(format!(
            "ERROR_THRESHOLD must be within [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = AnalyzerConfig::from_str(r#"{"REPORT_SIZE": 25, "LOG_DIR": "/var/log/nginx"}"#)
            .unwrap();

        assert_eq!(config.report_size, 25);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/nginx"));
        assert_eq!(config.report_dir, PathBuf::from("./reports"));
        assert_eq!(config.error_threshold, 0.7);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_empty_log_file_means_console() {
        let config = AnalyzerConfig::from_str(r#"{"LOG_FILE": ""}"#).unwrap();
        assert!(config.log_file.is_none());

        let config = AnalyzerConfig::from_str(r#"{"LOG_FILE": null}"#).unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = AnalyzerConfig::from_str(r#"{"ERROR_TRESHOLD": 0.1}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let result = AnalyzerConfig::from_str(r#"{"ERROR_THRESHOLD": 1.5}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_report_size_rejected() {
        let result = AnalyzerConfig::from_str(r#"{"REPORT_SIZE": 0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ERROR_THRESHOLD": 0.2, "LOG_FILE": "analyzer.log"}}"#).unwrap();

        let config = AnalyzerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.error_threshold, 0.2);
        assert_eq!(config.log_file, Some(PathBuf::from("analyzer.log")));
    }

    #[test]
    fn test_missing_file() {
        let result = AnalyzerConfig::from_file(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(Error::ConfigFile { .. })));
    }
}
