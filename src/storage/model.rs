//! Record types for measurement samples and summaries.
//!
//! Every field that can be missing on a given host is an `Option`; absence is
//! always `None` (JSON `null`), never a zero that could be mistaken for a
//! measured value. Records are plain value objects: once a [`Sample`] is
//! built it is only ever read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized result of one Ookla `speedtest` CLI run.
///
/// Source: `speedtest -f json` payload. Bandwidth fields arrive as bytes/sec
/// and are converted to Mbps via `bytes_per_sec * 8 / 1_000_000`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct SpeedtestResult {
    /// Server display name. Source: `server.name`
    pub server_name: Option<String>,
    /// Server id as text. Source: `server.id`
    pub server_id: Option<String>,
    /// Server host, possibly with a `:port` suffix. Source: `server.host`
    pub server_host: Option<String>,
    /// `"<name-or-location>, <country>"`, either half omitted when absent.
    pub server_location: Option<String>,
    /// ISP name. Source: `isp`
    pub isp: Option<String>,
    /// External IP of the measuring interface. Source: `interface.externalIp`
    pub external_ip: Option<String>,
    /// Idle latency in ms. Source: `ping.latency`
    pub idle_latency_ms: Option<f64>,
    /// Idle jitter in ms. Source: `ping.jitter`
    pub jitter_ms: Option<f64>,
    /// Latency low bound in ms. Source: `ping.low`
    pub low_latency_ms: Option<f64>,
    /// Latency high bound in ms. Source: `ping.high`
    pub high_latency_ms: Option<f64>,
    /// Download throughput in Mbps. Source: `download.bandwidth` (bytes/sec)
    pub download_mbps: Option<f64>,
    /// Upload throughput in Mbps. Source: `upload.bandwidth` (bytes/sec)
    pub upload_mbps: Option<f64>,
    /// Bytes transferred during the download phase. Source: `download.bytes`
    pub download_bytes: Option<u64>,
    /// Bytes transferred during the upload phase. Source: `upload.bytes`
    pub upload_bytes: Option<u64>,
    /// Packet loss percentage. Source: `packetLoss`, absent in some
    /// payload versions.
    pub packet_loss_pct: Option<f64>,
    /// Full decoded payload, retained for debugging only.
    pub raw: Value,
}

/// Normalized result of one Apple `networkQuality` run.
///
/// Source: `networkQuality -s` free-text summary. The responsiveness lines
/// have two historical formats, so the ms half of each pair may be absent
/// even when the RPM half parsed.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct NetworkQualityResult {
    /// Uplink capacity in Mbps.
    pub uplink_mbps: Option<f64>,
    /// Downlink capacity in Mbps.
    pub downlink_mbps: Option<f64>,
    /// Uplink responsiveness latency in ms (richer format only).
    pub uplink_resp_ms: Option<f64>,
    /// Uplink responsiveness in round-trips per minute.
    pub uplink_resp_rpm: Option<f64>,
    /// Downlink responsiveness latency in ms (richer format only).
    pub downlink_resp_ms: Option<f64>,
    /// Downlink responsiveness in round-trips per minute.
    pub downlink_resp_rpm: Option<f64>,
    /// Idle latency in ms.
    pub idle_latency_ms: Option<f64>,
    /// Trimmed combined tool output, retained for debugging only.
    pub raw_text: String,
}

/// Normalized result of one ICMP ping probe against a single target.
///
/// The transmitted/received/loss summary line is mandatory; the rtt triple
/// comes from the optional `round-trip` statistics line and is all-or-none.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct PingStats {
    /// Probed host or address.
    pub target: String,
    /// Packets transmitted.
    pub sent: u64,
    /// Packets received. Invariant of the tool output: `received <= sent`.
    pub received: u64,
    /// Packet loss percentage, 0-100. Authoritative even when the rtt
    /// statistics line is unparsable.
    pub loss_pct: f64,
    /// Round-trip minimum in ms.
    pub rtt_min_ms: Option<f64>,
    /// Round-trip average in ms.
    pub rtt_avg_ms: Option<f64>,
    /// Round-trip maximum in ms.
    pub rtt_max_ms: Option<f64>,
    /// Mean absolute delta of consecutive per-packet round-trip samples,
    /// from a second verbose invocation. Requires >= 2 samples.
    pub jitter_ms: Option<f64>,
}

/// Host context captured once per sample.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct EnvironmentInfo {
    /// Local RFC 3339 timestamp, seconds precision.
    pub timestamp: String,
    /// Host name.
    pub hostname: String,
    /// OS descriptor, e.g. `"Darwin 23.5.0"`.
    pub os: String,
    /// Machine architecture, e.g. `"aarch64"`.
    pub machine: String,
    /// netgauge version that produced the record.
    pub version: String,
    /// Default-route interface name, when discoverable.
    pub default_interface: Option<String>,
    /// IPv4 address of the default interface, when discoverable.
    pub local_ip: Option<String>,
}

/// Which external tools resolved on the search path for this sample.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct ToolAvailability {
    pub speedtest: bool,
    pub network_quality: bool,
    pub ping: bool,
}

/// One complete round of measurements from all enabled tools.
///
/// Any tool that was unavailable, failed, or produced unparsable output
/// leaves its field `None` (or its probe missing from `ping`); the sample
/// itself is always produced.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Sample {
    /// Local RFC 3339 timestamp, same instant as `env.timestamp`.
    pub timestamp: String,
    pub env: EnvironmentInfo,
    /// Opaque public-IP info from the geolocation lookup.
    pub ipinfo: Option<Map<String, Value>>,
    /// DNS resolver timing probe in ms.
    pub dns_lookup_ms: Option<f64>,
    pub speedtest: Option<SpeedtestResult>,
    pub network_quality: Option<NetworkQualityResult>,
    /// One entry per ping target that produced a result, in target order.
    pub ping: Vec<PingStats>,
    pub tooling: ToolAvailability,
}

/// Median aggregate over a sequence of samples.
///
/// Derived and stateless: recomputable from any sequence of samples. A
/// metric with no contributing samples maps to `None`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Summary {
    /// Number of samples the summary was computed from.
    pub samples: usize,
    /// Metric name to median value across samples that produced it.
    pub median: BTreeMap<String, Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let result = SpeedtestResult::default();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["packet_loss_pct"], Value::Null);
        assert_eq!(json["download_mbps"], Value::Null);
    }

    #[test]
    fn test_sample_round_trips_through_json() {
        let sample = Sample {
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            env: EnvironmentInfo {
                timestamp: "2026-01-01T00:00:00+00:00".to_string(),
                hostname: "mbp".to_string(),
                os: "Darwin 23.5.0".to_string(),
                machine: "aarch64".to_string(),
                version: "0.1.0".to_string(),
                default_interface: Some("en0".to_string()),
                local_ip: None,
            },
            ipinfo: None,
            dns_lookup_ms: Some(12.5),
            speedtest: None,
            network_quality: None,
            ping: vec![PingStats {
                target: "1.1.1.1".to_string(),
                sent: 10,
                received: 10,
                loss_pct: 0.0,
                rtt_min_ms: Some(10.0),
                rtt_avg_ms: Some(12.5),
                rtt_max_ms: Some(15.0),
                jitter_ms: Some(1.5),
            }],
            tooling: ToolAvailability {
                speedtest: false,
                network_quality: false,
                ping: true,
            },
        };

        let json = serde_json::to_string(&sample).unwrap();
        let back: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }
}
