//! Apple `networkQuality` invocation and summary-text parsing.
//!
//! The summary output has no single canonical grammar: macOS versions drift,
//! and the responsiveness lines in particular exist in two historical
//! formats, `(X milliseconds | Y RPM)` and `(Y RPM)`. Each field is extracted
//! by its own independent probe so one unmatched pattern can never block an
//! unrelated field; the richer responsiveness format is tried first.

use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::runner::{run_command, tool_available};
use crate::storage::model::NetworkQualityResult;

/// Runs `networkQuality -s` and parses its summary.
///
/// Returns `None` when the tool is missing, exits nonzero, times out, or its
/// output carries no recognizable summary marker.
pub fn run_network_quality(timeout: Duration) -> Option<NetworkQualityResult> {
    if !tool_available("networkQuality") {
        debug!("networkQuality not found on PATH");
        return None;
    }

    let outcome = run_command("networkQuality", &["-s"], timeout);
    let text = outcome.combined();
    let text = text.trim();
    if !outcome.success() || !text.to_uppercase().contains("SUMMARY") {
        debug!(
            "networkQuality produced no summary (exit {})",
            outcome.exit_code
        );
        return None;
    }

    Some(parse_summary(text))
}

/// Parses a summary text into a [`NetworkQualityResult`].
///
/// Pure function. Succeeds even if every field comes back absent; the caller
/// gates on the summary marker before invoking it.
pub fn parse_summary(text: &str) -> NetworkQualityResult {
    let (uplink_resp_ms, uplink_resp_rpm) = responsiveness(text, "Uplink");
    let (downlink_resp_ms, downlink_resp_rpm) = responsiveness(text, "Downlink");

    NetworkQualityResult {
        uplink_mbps: capacity_mbps(text, "Uplink"),
        downlink_mbps: capacity_mbps(text, "Downlink"),
        uplink_resp_ms,
        uplink_resp_rpm,
        downlink_resp_ms,
        downlink_resp_rpm,
        idle_latency_ms: idle_latency_ms(text),
        raw_text: text.trim().to_string(),
    }
}

/// `"<direction> capacity: N Mbps"`, case-insensitive.
fn capacity_mbps(text: &str, direction: &str) -> Option<f64> {
    capture_f64(
        text,
        &format!(r"(?i){direction}\s+capacity:\s*([\d.]+)\s*Mbps"),
    )
}

/// Responsiveness as `(ms, rpm)`. Richer `(X milliseconds | Y RPM)` format
/// first, `(Y RPM)` fallback, both `None` when neither matches.
fn responsiveness(text: &str, direction: &str) -> (Option<f64>, Option<f64>) {
    let rich = format!(
        r"(?i){direction}\s+Responsiveness:.*\(([\d.]+)\s*milliseconds\s*\|\s*([\d.]+)\s*RPM\)"
    );
    if let Some(caps) = captures(text, &rich) {
        return (
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
            caps.get(2).and_then(|m| m.as_str().parse().ok()),
        );
    }

    let rate_only = format!(r"(?i){direction}\s+Responsiveness:.*\(([\d.]+)\s*RPM\)");
    if let Some(caps) = captures(text, &rate_only) {
        return (None, caps.get(1).and_then(|m| m.as_str().parse().ok()));
    }

    (None, None)
}

fn idle_latency_ms(text: &str) -> Option<f64> {
    capture_f64(text, r"(?i)Idle Latency:\s*([\d.]+)\s*milliseconds")
}

fn captures<'t>(text: &'t str, pattern: &str) -> Option<regex::Captures<'t>> {
    Regex::new(pattern).ok()?.captures(text)
}

fn capture_f64(text: &str, pattern: &str) -> Option<f64> {
    captures(text, pattern)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODERN_SUMMARY: &str = "\
==== SUMMARY ====
Uplink capacity: 38.175 Mbps
Downlink capacity: 477.212 Mbps
Uplink Responsiveness: High (2153 RPM)
Downlink Responsiveness: Medium (5.2 milliseconds | 11538 RPM)
Idle Latency: 27.250 milliseconds
";

    const LEGACY_SUMMARY: &str = "\
==== SUMMARY ====
Upload capacity: 30.1 Mbps
Download capacity: 400.0 Mbps
Responsiveness: Medium (820 RPM)
";

    #[test]
    fn test_rich_responsiveness_variant() {
        let result = parse_summary(MODERN_SUMMARY);
        assert_eq!(result.downlink_resp_ms, Some(5.2));
        assert_eq!(result.downlink_resp_rpm, Some(11538.0));
    }

    #[test]
    fn test_rate_only_responsiveness_variant() {
        let result = parse_summary(MODERN_SUMMARY);
        assert_eq!(result.uplink_resp_ms, None);
        assert_eq!(result.uplink_resp_rpm, Some(2153.0));
    }

    #[test]
    fn test_capacities_and_idle_latency() {
        let result = parse_summary(MODERN_SUMMARY);
        assert_eq!(result.uplink_mbps, Some(38.175));
        assert_eq!(result.downlink_mbps, Some(477.212));
        assert_eq!(result.idle_latency_ms, Some(27.25));
    }

    #[test]
    fn test_unmatched_fields_stay_absent() {
        // Legacy output labels differ; every probe misses independently.
        let result = parse_summary(LEGACY_SUMMARY);
        assert_eq!(result.uplink_mbps, None);
        assert_eq!(result.downlink_mbps, None);
        assert_eq!(result.uplink_resp_rpm, None);
        assert_eq!(result.downlink_resp_rpm, None);
        assert_eq!(result.idle_latency_ms, None);
        assert_eq!(result.raw_text, LEGACY_SUMMARY.trim());
    }

    #[test]
    fn test_case_insensitive_matching() {
        let text = "SUMMARY\nUPLINK CAPACITY: 10.5 mbps\nIDLE LATENCY: 20.0 MILLISECONDS";
        let result = parse_summary(text);
        assert_eq!(result.uplink_mbps, Some(10.5));
        assert_eq!(result.idle_latency_ms, Some(20.0));
    }

    #[test]
    fn test_raw_text_is_trimmed_input() {
        let result = parse_summary(MODERN_SUMMARY);
        assert_eq!(result.raw_text, MODERN_SUMMARY.trim());
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse_summary(MODERN_SUMMARY), parse_summary(MODERN_SUMMARY));
    }
}
