mod parser;
mod stats;

pub use parser::{LogParser, ParsedLog};
pub use stats::{compute_stats, median, truncate_report};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-URL request times, kept in the order URLs were first seen
#[derive(Debug, Default, Clone)]
pub struct UrlAccumulator {
    index: HashMap<String, usize>,
    entries: Vec<(String, Vec<f64>)>,
}

impl UrlAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the request-time list for `url`, creating an empty one on first use
    pub fn times_mut(&mut self, url: &str) -> &mut Vec<f64> {
        let idx = match self.index.get(url) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.index.insert(url.to_string(), idx);
                self.entries.push((url.to_string(), Vec::new()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn record(&mut self, url: &str, request_time: f64) {
        self.times_mut(url).push(request_time);
    }

    pub fn get(&self, url: &str) -> Option<&[f64]> {
        self.index
            .get(url)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    /// Iterate over `(url, times)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.entries
            .iter()
            .map(|(url, times)| (url.as_str(), times.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Running counters kept alongside the accumulator
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParseTally {
    /// Lines parsed successfully
    pub total_lines: usize,
    /// Lines skipped because a field could not be extracted
    pub error_lines: usize,
    pub total_request_time: f64,
}

impl ParseTally {
    pub fn attempted_lines(&self) -> usize {
        self.total_lines + self.error_lines
    }

    /// Fraction of attempted lines that were malformed.
    ///
    /// Defined as 1.0 when no line parsed successfully, so an input made
    /// only of garbage always trips the error gate.
    pub fn error_rate(&self) -> f64 {
        if self.total_lines == 0 {
            return 1.0;
        }
        self.error_lines as f64 / self.attempted_lines() as f64
    }
}

/// Request-time summary for one URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlStat {
    pub url: String,
    pub count: usize,
    pub count_perc: f64,
    pub time_sum: f64,
    pub time_perc: f64,
    pub time_avg: f64,
    pub time_max: f64,
    pub time_med: f64,
}
