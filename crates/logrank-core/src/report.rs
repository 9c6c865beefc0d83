use crate::analysis::UrlStat;
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Placeholder in the template replaced by the JSON array of records
pub const TABLE_PLACEHOLDER: &str = "$table_json";

/// Report file name for a log date, e.g. `report-2017.06.30.html`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("report-{}.html", date.format("%Y.%m.%d"))
}

/// Unpadded spelling of the report name, e.g. `report-2017.6.30.html`.
/// Reports written under this name also count as existing.
pub fn unpadded_report_file_name(date: NaiveDate) -> String {
    format!("report-{}.{}.{}.html", date.year(), date.month(), date.day())
}

/// Substitutes ranked records into an HTML template
pub struct ReportRenderer {
    template_path: PathBuf,
}

impl ReportRenderer {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    /// Build the report body without touching the destination
    pub fn render_to_string(&self, records: &[UrlStat]) -> Result<String> {
        let template = fs::read_to_string(&self.template_path).map_err(|source| Error::Template {
            path: self.template_path.clone(),
            source,
        })?;

        if !template.contains(TABLE_PLACEHOLDER) {
            return Err(Error::MissingPlaceholder {
                path: self.template_path.clone(),
            });
        }

        let table_json = serde_json::to_string(records)?;
        Ok(template.replace(TABLE_PLACEHOLDER, &table_json))
    }

    /// Render `records` into `dest`.
    ///
    /// The report is written to a temporary file next to `dest` and renamed
    /// into place, so a failed run never leaves a half-written report.
    pub fn render(&self, records: &[UrlStat], dest: &Path) -> Result<()> {
        tracing::debug!(
            "Rendering {} records into {}",
            records.len(),
            dest.display()
        );

        let body = self.render_to_string(records)?;

        let write_error = |source| Error::WriteReport {
            path: dest.to_path_buf(),
            source,
        };

        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
        tmp.write_all(body.as_bytes()).map_err(write_error)?;
        tmp.as_file().sync_all().map_err(write_error)?;
        tmp.persist(dest).map_err(|e| write_error(e.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stat(url: &str, time_sum: f64) -> UrlStat {
        UrlStat {
            url: url.to_string(),
            count: 2,
            count_perc: 50.0,
            time_sum,
            time_perc: 50.0,
            time_avg: time_sum / 2.0,
            time_max: time_sum,
            time_med: time_sum / 2.0,
        }
    }

    fn write_template(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("report.html");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_report_file_name_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2017, 6, 3).unwrap();
        assert_eq!(report_file_name(date), "report-2017.06.03.html");
        assert_eq!(unpadded_report_file_name(date), "report-2017.6.3.html");
    }

    #[test]
    fn test_render_substitutes_json() {
        let dir = TempDir::new().unwrap();
        let template = write_template(&dir, "<script>var table = $table_json;</script>");
        let dest = dir.path().join("report-2017.06.30.html");

        let renderer = ReportRenderer::new(&template);
        renderer
            .render(&[stat("/slow", 4.0), stat("/fast", 1.0)], &dest)
            .unwrap();

        let html = fs::read_to_string(&dest).unwrap();
        assert!(html.starts_with("<script>var table = [{"));
        assert!(html.contains(r#""url":"/slow""#));
        assert!(html.contains(r#""time_sum":4.0"#));
        assert!(!html.contains(TABLE_PLACEHOLDER));

        let json = html
            .trim_start_matches("<script>var table = ")
            .trim_end_matches(";</script>");
        let records: Vec<UrlStat> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "/slow");
    }

    #[test]
    fn test_missing_template() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.html");
        let renderer = ReportRenderer::new(dir.path().join("missing.html"));

        let result = renderer.render(&[], &dest);
        assert!(matches!(result, Err(Error::Template { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_template_without_placeholder() {
        let dir = TempDir::new().unwrap();
        let template = write_template(&dir, "<html>static</html>");
        let dest = dir.path().join("out.html");

        let result = ReportRenderer::new(template).render(&[], &dest);
        assert!(matches!(result, Err(Error::MissingPlaceholder { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = TempDir::new().unwrap();
        let template = write_template(&dir, "$table_json");
        let dest = dir.path().join("no-such-dir").join("out.html");

        let result = ReportRenderer::new(template).render(&[stat("/a", 1.0)], &dest);
        assert!(matches!(result, Err(Error::WriteReport { .. })));
    }
}
