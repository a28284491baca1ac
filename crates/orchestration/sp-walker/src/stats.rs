//! Statistics for prefix walks.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Statistics collected during a prefix walk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkStats {
    /// When the walk started
    pub started_at: Option<DateTime<Utc>>,

    /// When the walk completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Listing pages fetched successfully
    pub pages_fetched: usize,

    /// Prefixes whose first page was requested
    pub prefixes_visited: usize,

    /// Object keys examined for a file extension
    pub objects_scanned: usize,

    /// Prefixes skipped because listing them was denied
    pub denied_prefixes: Vec<String>,

    /// Sub-prefixes not descended into because of the depth limit
    pub prefixes_beyond_depth: usize,
}

impl WalkStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Mark the walk as complete with the current time.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Record a prefix being entered.
    pub fn record_prefix(&mut self) {
        self.prefixes_visited += 1;
    }

    /// Record a fetched page and the number of objects scanned on it.
    pub fn record_page(&mut self, objects_scanned: usize) {
        self.pages_fetched += 1;
        self.objects_scanned += objects_scanned;
    }

    /// Record a prefix that was skipped after a denial.
    pub fn record_denied(&mut self, prefix: impl ToString) {
        self.denied_prefixes.push(prefix.to_string());
    }

    /// Record sub-prefixes left unexplored by the depth limit.
    pub fn record_beyond_depth(&mut self, count: usize) {
        self.prefixes_beyond_depth += count;
    }

    /// Check if any prefix was skipped after a denial.
    pub fn has_denials(&self) -> bool {
        !self.denied_prefixes.is_empty()
    }

    /// Get the duration of the walk.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Calculate the throughput in pages per second.
    pub fn pages_per_second(&self) -> Option<f64> {
        self.duration().map(|d| {
            let secs = d.num_milliseconds() as f64 / 1000.0;
            if secs > 0.0 {
                self.pages_fetched as f64 / secs
            } else {
                0.0
            }
        })
    }
}
