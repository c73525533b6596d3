//! Ookla `speedtest` CLI invocation and JSON payload normalization.
//!
//! The CLI's machine-readable format reports bandwidth in bytes/sec; we
//! convert to Mbps. Nested sections (`server`, `interface`, `ping`,
//! `download`, `upload`) may each be absent and only blank their own fields.
//! A payload that fails to decode at all yields no result: the whole
//! bandwidth measurement for that sample is unavailable.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::runner::{run_command, tool_available};
use crate::storage::model::SpeedtestResult;

/// Runs `speedtest -f json` and normalizes its payload.
///
/// Returns `None` when the tool is missing, exits nonzero, times out, or
/// emits something that is not valid JSON.
pub fn run_speedtest(timeout: Duration, server_id: Option<&str>) -> Option<SpeedtestResult> {
    if !tool_available("speedtest") {
        debug!("speedtest CLI not found on PATH");
        return None;
    }

    let mut args = vec!["--accept-license", "--accept-gdpr", "-f", "json"];
    if let Some(id) = server_id {
        args.push("-s");
        args.push(id);
    }

    let outcome = run_command("speedtest", &args, timeout);
    if !outcome.success() {
        debug!("speedtest exited with {}: {}", outcome.exit_code, outcome.stderr);
        return None;
    }

    match serde_json::from_str::<Value>(&outcome.stdout) {
        Ok(payload) => Some(parse_payload(&payload)),
        Err(e) => {
            debug!("speedtest payload is not valid JSON: {}", e);
            None
        }
    }
}

/// Normalizes a decoded payload into a [`SpeedtestResult`].
///
/// Pure function; every field degrades independently to `None`.
pub fn parse_payload(payload: &Value) -> SpeedtestResult {
    let server = payload.get("server");
    let interface = payload.get("interface");
    let ping = payload.get("ping");
    let download = payload.get("download");
    let upload = payload.get("upload");

    SpeedtestResult {
        server_name: get_str(server, "name"),
        server_id: get_id(server),
        server_host: get_str(server, "host"),
        server_location: server_location(server),
        isp: payload.get("isp").and_then(Value::as_str).map(str::to_string),
        external_ip: get_str(interface, "externalIp"),
        idle_latency_ms: get_f64(ping, "latency"),
        jitter_ms: get_f64(ping, "jitter"),
        low_latency_ms: get_f64(ping, "low"),
        high_latency_ms: get_f64(ping, "high"),
        download_mbps: bytes_per_sec_to_mbps(get_f64(download, "bandwidth")),
        upload_mbps: bytes_per_sec_to_mbps(get_f64(upload, "bandwidth")),
        download_bytes: get_u64(download, "bytes"),
        upload_bytes: get_u64(upload, "bytes"),
        packet_loss_pct: payload.get("packetLoss").and_then(Value::as_f64),
        raw: payload.clone(),
    }
}

/// `"<name-or-location>, <country>"`; either half omitted when absent,
/// `None` when both are.
fn server_location(server: Option<&Value>) -> Option<String> {
    let name = get_str(server, "name").or_else(|| get_str(server, "location"));
    let country = get_str(server, "country");
    let parts: Vec<String> = [name, country].into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// `server.id` can be a number or a string depending on CLI version.
fn get_id(server: Option<&Value>) -> Option<String> {
    match server?.get("id")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn get_str(section: Option<&Value>, key: &str) -> Option<String> {
    section?.get(key)?.as_str().map(str::to_string)
}

fn get_f64(section: Option<&Value>, key: &str) -> Option<f64> {
    section?.get(key)?.as_f64()
}

fn get_u64(section: Option<&Value>, key: &str) -> Option<u64> {
    section?.get(key)?.as_u64()
}

fn bytes_per_sec_to_mbps(bytes_per_sec: Option<f64>) -> Option<f64> {
    bytes_per_sec.map(|b| b * 8.0 / 1_000_000.0)
}
