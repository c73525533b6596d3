//! ICMP latency probes via the system `ping`.
//!
//! Each target gets two invocations. The first runs quiet (`-q`): its
//! summary lines are the cheapest, most stable source for loss and the
//! min/avg/max triple. The second runs verbose so the per-packet `time=`
//! samples can feed the jitter calculation, which the quiet summary cannot
//! provide. The duplication is intentional; collapsing the two would change
//! the jitter sample count semantics.

use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::runner::{run_command, tool_available};
use crate::storage::model::PingStats;

/// Minimum trial count before a jitter rerun is worth the extra probe.
const JITTER_MIN_COUNT: u32 = 4;

/// Probes `target` with `count` ICMP echoes and parses the summary.
///
/// Returns `None` when `ping` is missing or the mandatory
/// `transmitted/received/loss` summary line does not appear; that line is
/// present in all supported ping versions, so its absence means the probe
/// produced nothing usable.
pub fn ping_target(target: &str, count: u32, timeout: Duration) -> Option<PingStats> {
    if !tool_available("ping") {
        debug!("ping not found on PATH");
        return None;
    }

    let count_arg = count.to_string();
    let outcome = run_command("ping", &["-n", "-q", "-c", &count_arg, target], timeout);
    let text = outcome.combined();

    let (sent, received, loss_pct) = parse_loss_line(&text)?;
    let (rtt_min_ms, rtt_avg_ms, rtt_max_ms) = match parse_rtt_line(&text) {
        Some((min, avg, max)) => (Some(min), Some(avg), Some(max)),
        None => (None, None, None),
    };

    let jitter_ms = if count >= JITTER_MIN_COUNT {
        let verbose = run_command("ping", &["-n", "-c", &count_arg, target], timeout);
        jitter_from_samples(&extract_rtt_samples(&verbose.stdout))
    } else {
        None
    };

    Some(PingStats {
        target: target.to_string(),
        sent,
        received,
        loss_pct,
        rtt_min_ms,
        rtt_avg_ms,
        rtt_max_ms,
        jitter_ms,
    })
}

/// Extracts `(sent, received, loss_pct)` from the mandatory summary line:
/// `10 packets transmitted, 10 packets received, 0.0% packet loss`.
pub fn parse_loss_line(text: &str) -> Option<(u64, u64, f64)> {
    let re = Regex::new(
        r"(\d+)\s+packets transmitted,\s+(\d+)\s+packets received,\s+([\d.]+)%\s+packet loss",
    )
    .ok()?;
    let caps = re.captures(text)?;
    let sent = caps.get(1)?.as_str().parse().ok()?;
    let received = caps.get(2)?.as_str().parse().ok()?;
    let loss_pct = caps.get(3)?.as_str().parse().ok()?;
    Some((sent, received, loss_pct))
}

/// Extracts `(min, avg, max)` from the optional statistics line:
/// `round-trip min/avg/max/stddev = 10.0/12.5/15.0/1.2 ms`.
///
/// The line carries all three or is missing entirely; partial triples do not
/// occur in the format and are not invented here.
pub fn parse_rtt_line(text: &str) -> Option<(f64, f64, f64)> {
    let re = Regex::new(r"round-trip.*=\s*([\d.]+)/([\d.]+)/([\d.]+)/([\d.]+)\s*ms").ok()?;
    let caps = re.captures(text)?;
    let min = caps.get(1)?.as_str().parse().ok()?;
    let avg = caps.get(2)?.as_str().parse().ok()?;
    let max = caps.get(3)?.as_str().parse().ok()?;
    Some((min, avg, max))
}

/// Collects every per-packet round-trip sample (`time=N ms`) in order.
pub fn extract_rtt_samples(text: &str) -> Vec<f64> {
    let Ok(re) = Regex::new(r"time=([\d.]+)\s*ms") else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

/// Mean absolute delta between consecutive round-trip samples.
///
/// Needs at least 2 successful samples, otherwise jitter is absent.
pub fn jitter_from_samples(samples: &[f64]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let total: f64 = samples.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    Some(total / (samples.len() - 1) as f64)
}
