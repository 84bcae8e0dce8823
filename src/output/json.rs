//! JSON output formatting

use crate::core::error::Result;
use crate::pipeline::RunReport;

/// Format a run report as pretty-printed JSON
pub fn format(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
