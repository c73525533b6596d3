//! Public-IP info lookup and DNS timing probe.
//!
//! The ipinfo.io payload is embedded in the sample as an opaque mapping; its
//! schema belongs to the service, not to us. Any failure (network, HTTP
//! status, decode) degrades to `None`.

use std::net::ToSocketAddrs;
use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use tracing::debug;

const IPINFO_URL: &str = "https://ipinfo.io/json";

/// Fetches public-IP info from ipinfo.io as an opaque JSON object.
pub fn fetch_public_ip_info(timeout: Duration) -> Option<Map<String, Value>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .ok()?;

    let value: Value = client
        .get(IPINFO_URL)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.json())
        .map_err(|e| debug!("public IP lookup failed: {}", e))
        .ok()?;

    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Times one system-resolver lookup of `host`, in milliseconds.
///
/// Returns `None` when resolution fails.
pub fn dns_lookup_time(host: &str) -> Option<f64> {
    let start = Instant::now();
    match (host, 0u16).to_socket_addrs() {
        Ok(_) => Some(start.elapsed().as_secs_f64() * 1000.0),
        Err(_) => None,
    }
}
