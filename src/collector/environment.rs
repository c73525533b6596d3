//! Host context collection.
//!
//! Everything here is best-effort: the interface/address discovery shells
//! out to `route` and `ipconfig` (macOS conventions, matching the measured
//! platform) and quietly leaves fields absent on other systems.

use std::time::Duration;

use chrono::{Local, SecondsFormat};
use regex::Regex;

use crate::runner::run_command;
use crate::storage::model::EnvironmentInfo;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const ROUTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Local RFC 3339 timestamp with seconds precision.
pub fn now_iso() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Captures the host context for one sample.
pub fn collect() -> EnvironmentInfo {
    let (default_interface, local_ip) = default_interface_and_ip();
    EnvironmentInfo {
        timestamp: now_iso(),
        hostname: hostname(),
        os: os_descriptor(),
        machine: std::env::consts::ARCH.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_interface,
        local_ip,
    }
}

fn hostname() -> String {
    let outcome = run_command("hostname", &[], PROBE_TIMEOUT);
    if outcome.success() && !outcome.stdout.is_empty() {
        return outcome.stdout;
    }
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn os_descriptor() -> String {
    let outcome = run_command("uname", &["-sr"], PROBE_TIMEOUT);
    if outcome.success() && !outcome.stdout.is_empty() {
        return outcome.stdout;
    }
    std::env::consts::OS.to_string()
}

/// Discovers the default-route interface, then its IPv4 address.
fn default_interface_and_ip() -> (Option<String>, Option<String>) {
    let outcome = run_command("route", &["-n", "get", "default"], ROUTE_TIMEOUT);
    if !outcome.success() {
        return (None, None);
    }

    let Some(iface) = parse_default_interface(&outcome.stdout) else {
        return (None, None);
    };

    let addr = run_command("ipconfig", &["getifaddr", &iface], PROBE_TIMEOUT);
    let ip = (addr.success() && !addr.stdout.is_empty()).then(|| addr.stdout.clone());
    (Some(iface), ip)
}

/// Extracts the interface name from `route -n get default` output.
pub fn parse_default_interface(text: &str) -> Option<String> {
    let re = Regex::new(r"interface:\s+(\S+)").ok()?;
    Some(re.captures(text)?.get(1)?.as_str().to_string())
}
