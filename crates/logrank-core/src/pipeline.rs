use crate::analysis::{LogParser, UrlStat, truncate_report};
use crate::config::AnalyzerConfig;
use crate::locator::{LogFileRef, find_latest_log};
use crate::report::{ReportRenderer, report_file_name, unpadded_report_file_name};
use crate::source::LineSource;
use crate::{Error, Result};
use std::fs;
use std::path::PathBuf;

/// How a batch run ended when nothing went fatally wrong
#[derive(Debug)]
pub enum RunOutcome {
    /// The log directory holds no matching file
    NoLogFile,
    /// A report for the latest log's date is already present
    ReportExists { log: LogFileRef, report: PathBuf },
    /// Too many malformed lines; no report was written
    Aborted {
        log: LogFileRef,
        error_rate: f64,
        threshold: f64,
    },
    /// The latest log contained no lines
    Empty { log: LogFileRef },
    Rendered {
        log: LogFileRef,
        report: PathBuf,
        records: Vec<UrlStat>,
    },
}

/// Locate the latest log, rank its URLs and render the report
pub fn run(config: &AnalyzerConfig) -> Result<RunOutcome> {
    config.validate()?;

    let Some(log) = find_latest_log(&config.log_dir, &config.log_prefix)? else {
        return Ok(RunOutcome::NoLogFile);
    };

    let report = config.report_dir.join(report_file_name(log.date));
    for candidate in [
        report.clone(),
        config.report_dir.join(unpadded_report_file_name(log.date)),
    ] {
        let exists = candidate.try_exists().map_err(|source| Error::WriteReport {
            path: candidate.clone(),
            source,
        })?;
        if exists {
            return Ok(RunOutcome::ReportExists {
                log,
                report: candidate,
            });
        }
    }

    let parser = LogParser::new(config.error_threshold)?;
    let parsed = match parser.parse(LineSource::open(&log)?) {
        Ok(parsed) => parsed,
        Err(Error::ExcessiveErrorRate {
            error_rate,
            threshold,
            ..
        }) => {
            return Ok(RunOutcome::Aborted {
                log,
                error_rate,
                threshold,
            });
        }
        Err(e) => return Err(e),
    };

    if parsed.is_empty() {
        return Ok(RunOutcome::Empty { log });
    }

    let records = truncate_report(parsed.compute_stats(), config.report_size);

    fs::create_dir_all(&config.report_dir).map_err(|source| Error::WriteReport {
        path: config.report_dir.clone(),
        source,
    })?;
    ReportRenderer::new(&config.report_template_path).render(&records, &report)?;

    Ok(RunOutcome::Rendered {
        log,
        report,
        records,
    })
}
