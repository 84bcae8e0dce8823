//! Human-readable output formatting

use crate::pipeline::RunReport;

/// Closing summary of a run
pub fn format(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Summary: {}, {} uncached, {} stripped, {} generated, {} missing\n",
        report.outcome.label(),
        report.uncached.len(),
        report.stripped.len(),
        report.generated.len(),
        report.missing.len()
    ));

    if let Some(error) = &report.error {
        output.push_str(&format!("Error: {}\n", error));
    }

    if !report.failed_retrievals.is_empty() {
        output.push_str("Could not retrieve:\n");
        for pdb in &report.failed_retrievals {
            output.push_str(&format!("   {}\n", pdb));
        }
    }

    if report.temp_dirs_retained {
        output.push_str("Stripped PDBs kept in:\n");
        for dir in &report.temp_dirs {
            output.push_str(&format!("   {}\n", dir.display()));
        }
    }

    output
}
