use super::{ParseTally, UrlAccumulator, UrlStat, compute_stats};
use crate::config::validate_threshold;
use crate::{Error, Result};

/// 0-based whitespace field holding the request path
const URL_FIELD: usize = 6;

/// Streaming access-log parser with an error-rate quality gate
#[derive(Debug, Clone, Copy)]
pub struct LogParser {
    threshold: f64,
}

impl LogParser {
    pub fn new(threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Consume every line and aggregate request times per URL.
    ///
    /// Malformed lines are counted and skipped. Read errors abort the parse
    /// immediately. Once the input is exhausted the error rate is checked
    /// against the threshold; on failure the aggregates are discarded and
    /// `Error::ExcessiveErrorRate` is returned. An input with no lines at all
    /// yields an empty `ParsedLog`.
    pub fn parse<I>(&self, lines: I) -> Result<ParsedLog>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        let mut urls = UrlAccumulator::new();
        let mut tally = ParseTally::default();

        for line in lines {
            let line = line?;
            match parse_line(&line) {
                Some((url, request_time)) => {
                    tally.total_lines += 1;
                    tally.total_request_time += request_time;
                    urls.record(url, request_time);
                }
                None => {
                    tally.error_lines += 1;
                    tracing::trace!("Skipping malformed line: {}", line);
                }
            }
        }

        tracing::debug!(
            "Parsed {} lines ({} malformed, {} distinct URLs)",
            tally.total_lines,
            tally.error_lines,
            urls.len()
        );

        if tally.attempted_lines() == 0 {
            return Ok(ParsedLog { urls, tally });
        }

        let error_rate = tally.error_rate();
        if error_rate >= self.threshold {
            return Err(Error::ExcessiveErrorRate {
                error_rate,
                threshold: self.threshold,
                error_lines: tally.error_lines,
                total_lines: tally.total_lines,
            });
        }

        Ok(ParsedLog { urls, tally })
    }
}

/// Extract `(url, request_time)` from one log line
fn parse_line(line: &str) -> Option<(&str, f64)> {
    let mut fields = line.split_whitespace();
    let url = fields.nth(URL_FIELD)?;
    // the url itself may be the last field, which leaves no request time
    let last = fields.next_back()?;
    let request_time: f64 = last.parse().ok()?;

    if !request_time.is_finite() || request_time < 0.0 {
        return None;
    }
    Some((url, request_time))
}

/// Aggregates from a parse that passed the error gate
#[derive(Debug, Clone)]
pub struct ParsedLog {
    urls: UrlAccumulator,
    tally: ParseTally,
}

impl ParsedLog {
    pub fn tally(&self) -> &ParseTally {
        &self.tally
    }

    pub fn urls(&self) -> &UrlAccumulator {
        &self.urls
    }

    pub fn error_rate(&self) -> f64 {
        self.tally.error_rate()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Full ranked list, slowest total time first, not truncated
    pub fn compute_stats(&self) -> Vec<UrlStat> {
        compute_stats(&self.urls, &self.tally)
    }
}
