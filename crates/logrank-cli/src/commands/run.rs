use anyhow::{Context, Result};
use logrank_core::config::AnalyzerConfig;
use logrank_core::pipeline::{self, RunOutcome};

/// Run the batch job: rank the latest log's URLs and write the dated report
pub fn execute(config: &AnalyzerConfig) -> Result<RunOutcome> {
    tracing::debug!(
        "Running analyzer (logs: {}, reports: {}, threshold: {})",
        config.log_dir.display(),
        config.report_dir.display(),
        config.error_threshold
    );

    let outcome = pipeline::run(config)
        .with_context(|| format!("Failed to analyze logs in {}", config.log_dir.display()))?;

    match &outcome {
        RunOutcome::NoLogFile => {
            tracing::info!("No log files found in {}", config.log_dir.display());
        }
        RunOutcome::ReportExists { log, report } => {
            tracing::info!(
                "Report of latest log file {} already exists: {}",
                log.name,
                report.display()
            );
        }
        RunOutcome::Aborted {
            log,
            error_rate,
            threshold,
        } => {
            tracing::warn!(
                "Parsing of {} aborted: error rate {:.1}% reached threshold {:.1}%",
                log.name,
                error_rate * 100.0,
                threshold * 100.0
            );
        }
        RunOutcome::Empty { log } => {
            tracing::info!("Log file {} is empty, no report written", log.name);
        }
        RunOutcome::Rendered {
            log,
            report,
            records,
        } => {
            tracing::info!("Latest log file is {} (date: {})", log.name, log.date);
            tracing::info!(
                "Report with {} URLs saved to: {}",
                records.len(),
                report.display()
            );
        }
    }

    Ok(outcome)
}
