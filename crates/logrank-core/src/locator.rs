use crate::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

const COMPRESSED_EXT: &str = ".gz";

/// A dated access log selected for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileRef {
    pub name: String,
    pub path: PathBuf,
    pub date: NaiveDate,
    pub compressed: bool,
}

/// Find the most recent `<prefix>-YYYYMMDD[.gz]` log in `dir`.
///
/// Returns `Ok(None)` when nothing in the directory matches the naming
/// pattern. Fails if the directory cannot be listed or if the winning
/// file's date is not a real calendar date.
pub fn find_latest_log(dir: &Path, prefix: &str) -> Result<Option<LogFileRef>> {
    tracing::debug!("Scanning {} for {}-YYYYMMDD logs", dir.display(), prefix);

    let pattern = Regex::new(&format!(
        r"^{}-([0-9]{{8}})(\.gz)?$",
        regex::escape(prefix)
    ))
    .map_err(|e| Error::Config(format!("invalid log prefix {}: {}", prefix, e)))?;

    let dir_error = |source| Error::LogDirectory {
        path: dir.to_path_buf(),
        source,
    };

    // (date digits, file name)
    let mut latest: Option<(String, String)> = None;

    for entry in fs::read_dir(dir).map_err(dir_error)? {
        let entry = entry.map_err(dir_error)?;
        // follows symlinks, so a linked log still counts as a file
        if !entry.path().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        let Some(caps) = pattern.captures(&name) else {
            continue;
        };
        let digits = caps[1].to_string();

        let newer = match &latest {
            None => true,
            Some((best_digits, best_name)) => (&digits, &name) > (best_digits, best_name),
        };
        if newer {
            latest = Some((digits, name));
        }
    }

    let Some((digits, name)) = latest else {
        tracing::debug!("No matching log files in {}", dir.display());
        return Ok(None);
    };

    let date = NaiveDate::parse_from_str(&digits, "%Y%m%d").map_err(|_| Error::InvalidLogDate {
        name: name.clone(),
        date: digits.clone(),
    })?;

    tracing::debug!("Selected log file {} (date: {})", name, date);

    Ok(Some(LogFileRef {
        path: dir.join(&name),
        compressed: name.ends_with(COMPRESSED_EXT),
        name,
        date,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PREFIX: &str = "nginx-access-ui.log";

    fn touch(dir: &TempDir, name: &str) {
        fs::write(dir.path().join(name), b"").unwrap();
    }

    #[test]
    fn test_empty_dir_returns_none() {
        let dir = TempDir::new().unwrap();
        let result = find_latest_log(dir.path(), PREFIX).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_picks_latest_date() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "nginx-access-ui.log-20180606");
        touch(&dir, "nginx-access-ui.log-20170707.gz");
        touch(&dir, "nginx-access-ui.log-20210707");

        let log = find_latest_log(dir.path(), PREFIX).unwrap().unwrap();
        assert_eq!(log.name, "nginx-access-ui.log-20210707");
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2021, 7, 7).unwrap());
        assert!(!log.compressed);
        assert_eq!(log.path, dir.path().join("nginx-access-ui.log-20210707"));
    }

    #[test]
    fn test_compressed_latest() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "nginx-access-ui.log-20170630.gz");
        touch(&dir, "nginx-access-ui.log-20170629");

        let log = find_latest_log(dir.path(), PREFIX).unwrap().unwrap();
        assert_eq!(log.name, "nginx-access-ui.log-20170630.gz");
        assert!(log.compressed);
    }

    #[test]
    fn test_ignores_non_matching_names() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "nginx-access-ui.log-20990101.bz2");
        touch(&dir, "nginx-access-ui.log-2099010");
        touch(&dir, "apache-access-ui.log-20990101");
        touch(&dir, "nginx-access-ui.log-20170630");
        fs::create_dir(dir.path().join("nginx-access-ui.log-20991231")).unwrap();

        let log = find_latest_log(dir.path(), PREFIX).unwrap().unwrap();
        assert_eq!(log.name, "nginx-access-ui.log-20170630");
    }

    #[test]
    fn test_non_ascii_digits_are_skipped() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "nginx-access-ui.log-20170630");
        touch(&dir, "nginx-access-ui.log-\u{662}\u{660}\u{661}\u{667}\u{660}\u{666}\u{663}\u{660}");

        let log = find_latest_log(dir.path(), PREFIX).unwrap().unwrap();
        assert_eq!(log.name, "nginx-access-ui.log-20170630");
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2017, 6, 30).unwrap());
    }

    #[test]
    fn test_only_unrelated_files_returns_none() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "README.md");
        touch(&dir, "report-2017.06.30.html");

        assert!(find_latest_log(dir.path(), PREFIX).unwrap().is_none());
    }

    #[test]
    fn test_invalid_calendar_date() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "nginx-access-ui.log-20171399");

        let result = find_latest_log(dir.path(), PREFIX);
        assert!(matches!(result, Err(Error::InvalidLogDate { .. })));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = TempDir::new().unwrap();
        let result = find_latest_log(&dir.path().join("missing"), PREFIX);
        assert!(matches!(result, Err(Error::LogDirectory { .. })));
    }

    #[test]
    fn test_custom_prefix() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "shop-access-ui.log-20200101");
        touch(&dir, "nginx-access-ui.log-20210101");

        let log = find_latest_log(dir.path(), "shop-access-ui.log").unwrap().unwrap();
        assert_eq!(log.name, "shop-access-ui.log-20200101");
    }
}
