//! Stdout output implementation for walk reports.

use serde::{Deserialize, Serialize};
use sp_error::{Result, SpError};
use std::io::Write;

use crate::walker::WalkReport;

/// Output format for stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON Lines format - one JSON object per line (default)
    #[default]
    Jsonl,

    /// Pretty-printed JSON
    Json,
}

/// Writes walk reports to stdout in JSON or JSONL format.
#[derive(Debug, Default)]
pub struct StdoutOutput {
    format: OutputFormat,
}

impl StdoutOutput {
    /// Create a new StdoutOutput with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Serialize a report in this output's format.
    pub fn render(&self, report: &WalkReport) -> Result<String> {
        let rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report),
            OutputFormat::Jsonl => serde_json::to_string(report),
        };

        rendered.map_err(|e| SpError::Output(format!("JSON serialization failed: {e}")))
    }

    /// Write a report to stdout and flush.
    pub fn write(&self, report: &WalkReport) -> Result<()> {
        let rendered = self.render(report)?;

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{rendered}")
            .and_then(|_| stdout.flush())
            .map_err(|e| SpError::Output(format!("Failed to write to stdout: {e}")))
    }
}
