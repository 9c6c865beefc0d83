use super::{ParseTally, UrlAccumulator, UrlStat};

/// Reduce every URL's request times into a ranked list of `UrlStat`.
///
/// Sorted by `time_sum` descending. The sort is stable over first-seen URL
/// order, so equal sums keep the order in which their URLs appeared in the
/// log. No truncation happens here.
pub fn compute_stats(urls: &UrlAccumulator, tally: &ParseTally) -> Vec<UrlStat> {
    let mut stats: Vec<UrlStat> = urls
        .iter()
        .filter(|(_, times)| !times.is_empty())
        .map(|(url, times)| {
            let count = times.len();
            let time_sum: f64 = times.iter().sum();
            let time_max = times.iter().copied().fold(f64::MIN, f64::max);

            UrlStat {
                url: url.to_string(),
                count,
                count_perc: percent(count as f64, tally.total_lines as f64),
                time_sum,
                time_perc: percent(time_sum, tally.total_request_time),
                time_avg: time_sum / count as f64,
                time_max,
                time_med: median(times),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.time_sum.total_cmp(&a.time_sum));

    tracing::debug!("Computed statistics for {} URLs", stats.len());
    stats
}

/// Keep the `report_size` slowest records of an already sorted list
pub fn truncate_report(mut stats: Vec<UrlStat>, report_size: usize) -> Vec<UrlStat> {
    stats.truncate(report_size);
    stats
}

/// Statistical median; the mean of the two middle values for even lengths.
/// Returns 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn percent(part: f64, total: f64) -> f64 {
    if total > 0.0 { 100.0 * part / total } else { 0.0 }
}
