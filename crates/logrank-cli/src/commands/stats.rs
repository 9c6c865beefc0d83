use crate::OutputFormat;
use anyhow::{Context, Result};
use logrank_core::analysis::{LogParser, UrlStat, truncate_report};
use logrank_core::source::LineSource;
use std::path::Path;

/// Ranked request-time statistics for a single log file
#[derive(Debug, Clone, serde::Serialize)]
pub struct LogStats {
    pub file_name: String,
    pub total_lines: usize,
    pub error_lines: usize,
    pub error_rate: f64,
    pub total_request_time: f64,
    pub unique_urls: usize,
    pub slowest_urls: Vec<UrlStat>,
}

/// Parse `file` (plain or `.gz`) and keep the `top` slowest URLs
pub fn analyze_log(file: &Path, threshold: f64, top: usize) -> Result<LogStats> {
    let parser = LogParser::new(threshold)?;
    let source = LineSource::from_path(file)?;
    let parsed = parser
        .parse(source)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let tally = parsed.tally();
    let all = parsed.compute_stats();
    let unique_urls = all.len();

    Ok(LogStats {
        file_name: file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        total_lines: tally.total_lines,
        error_lines: tally.error_lines,
        error_rate: if tally.attempted_lines() == 0 {
            0.0
        } else {
            parsed.error_rate()
        },
        total_request_time: tally.total_request_time,
        unique_urls,
        slowest_urls: truncate_report(all, top),
    })
}

pub fn execute(file: &Path, top: usize, threshold: f64, format: OutputFormat) -> Result<()> {
    tracing::debug!(
        "Ranking URLs of {} (top: {}, format: {:?})",
        file.display(),
        top,
        format
    );

    let stats = analyze_log(file, threshold, top)?;

    match format {
        OutputFormat::Json => output_json(&stats)?,
        OutputFormat::Table => output_table(&stats),
        OutputFormat::Pretty => output_pretty(&stats),
    }

    Ok(())
}

fn output_pretty(stats: &LogStats) {
    use console::style;

    println!(
        "\n{}",
        style(format!("Request times: {}", stats.file_name))
            .bold()
            .cyan()
    );
    println!();

    println!("{}", style("Overview").bold());
    println!("  Lines:        {}", style(stats.total_lines).yellow());
    println!(
        "  Malformed:    {} ({:.2}%)",
        stats.error_lines,
        stats.error_rate * 100.0
    );
    println!("  Unique URLs:  {}", stats.unique_urls);
    println!("  Total time:   {:.3}s", stats.total_request_time);

    if stats.slowest_urls.is_empty() {
        println!("\n  {}", style("No requests found").dim());
        println!();
        return;
    }

    println!(
        "\n{}",
        style(format!("Slowest {} URLs", stats.slowest_urls.len())).bold()
    );
    for (idx, stat) in stats.slowest_urls.iter().enumerate() {
        println!(
            "  {:>2}. {}",
            idx + 1,
            style(&stat.url).green()
        );
        println!(
            "      sum {:.3}s ({:.2}%)  count {} ({:.2}%)  avg {:.3}s  med {:.3}s  max {:.3}s",
            stat.time_sum,
            stat.time_perc,
            stat.count,
            stat.count_perc,
            stat.time_avg,
            stat.time_med,
            stat.time_max
        );
    }

    println!();
}

fn output_json(stats: &LogStats) -> Result<()> {
    let json_str = serde_json::to_string_pretty(stats)?;
    println!("{}", json_str);
    Ok(())
}

fn output_table(stats: &LogStats) {
    println!("url,count,count_perc,time_sum,time_perc,time_avg,time_max,time_med");
    for stat in &stats.slowest_urls {
        println!(
            "{},{},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3}",
            csv_field(&stat.url),
            stat.count,
            stat.count_perc,
            stat.time_sum,
            stat.time_perc,
            stat.time_avg,
            stat.time_max,
            stat.time_med
        );
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
