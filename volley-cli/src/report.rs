use crate::cli::Format;
use volley_core::{RunSummary, Verdict};

/// Exit status for a run that met every threshold.
pub const EXIT_PASS: u8 = 0;
/// Exit status for a run that breached a threshold (the k6 convention).
pub const EXIT_THRESHOLD_FAILED: u8 = 99;
/// Exit status for invalid configuration, matching clap's usage errors.
pub const EXIT_CONFIG_ERROR: u8 = 2;
/// Exit status for any other setup failure.
pub const EXIT_RUNTIME_ERROR: u8 = 1;

pub fn exit_status(verdict: Verdict) -> u8 {
    match verdict {
        Verdict::Pass => EXIT_PASS,
        Verdict::Fail => EXIT_THRESHOLD_FAILED,
    }
}

pub fn render(summary: &RunSummary, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Text => format!("\n{summary}\n"),
        Format::Json => serde_json::to_string_pretty(summary)?,
    })
}
