//! Measurement orchestration.
//!
//! One [`Collector::collect_sample`] call drives every enabled tool in
//! sequence and assembles one [`Sample`]. Tools run strictly one after
//! another: saturation-style bandwidth and responsiveness tests would skew
//! each other's numbers if overlapped, so serialization is a correctness
//! requirement here, not a simplification.
//!
//! Failure semantics: a tool that is absent, times out, exits nonzero, or
//! produces unparsable output degrades only its own field in the sample.
//! The sample itself is always produced.

pub mod environment;
pub mod ipinfo;
pub mod netquality;
pub mod ping;
pub mod speedtest;

use std::time::Duration;

use tracing::{debug, info};

use crate::runner::tool_available;
use crate::storage::model::{Sample, ToolAvailability};

/// Configuration for one measurement sample.
///
/// Supplied once at orchestration start; the collector holds no mutable
/// state between samples.
#[derive(Clone, Debug)]
pub struct SampleConfig {
    /// Run the Ookla speedtest CLI.
    pub use_speedtest: bool,
    /// Force a specific Ookla server id.
    pub speedtest_server_id: Option<String>,
    pub speedtest_timeout: Duration,
    /// Run Apple networkQuality.
    pub use_network_quality: bool,
    pub network_quality_timeout: Duration,
    /// Run ICMP ping probes.
    pub use_ping: bool,
    /// Targets probed in order.
    pub ping_targets: Vec<String>,
    /// Also probe the chosen speedtest server host, ahead of the
    /// configured targets.
    pub ping_speedtest_server: bool,
    /// ICMP echoes per target.
    pub ping_count: u32,
    /// Timeout per ping invocation.
    pub ping_timeout: Duration,
    /// Fetch public-IP info from ipinfo.io.
    pub include_ipinfo: bool,
    pub http_timeout: Duration,
    /// Host for the DNS timing probe; `None` disables it.
    pub dns_probe_host: Option<String>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            use_speedtest: true,
            speedtest_server_id: None,
            speedtest_timeout: Duration::from_secs(180),
            use_network_quality: true,
            network_quality_timeout: Duration::from_secs(120),
            use_ping: true,
            ping_targets: vec!["1.1.1.1".to_string(), "8.8.8.8".to_string()],
            ping_speedtest_server: false,
            ping_count: 10,
            ping_timeout: Duration::from_secs(20),
            include_ipinfo: true,
            http_timeout: Duration::from_secs(10),
            dns_probe_host: Some("icloud.com".to_string()),
        }
    }
}

/// Drives all enabled measurement tools for one sample at a time.
pub struct Collector {
    config: SampleConfig,
}

impl Collector {
    pub fn new(config: SampleConfig) -> Self {
        Self { config }
    }

    /// Produces exactly one [`Sample`].
    pub fn collect_sample(&self) -> Sample {
        let env = environment::collect();

        let ipinfo = if self.config.include_ipinfo {
            ipinfo::fetch_public_ip_info(self.config.http_timeout)
        } else {
            None
        };

        let dns_lookup_ms = self
            .config
            .dns_probe_host
            .as_deref()
            .and_then(ipinfo::dns_lookup_time);

        let tooling = ToolAvailability {
            speedtest: tool_available("speedtest"),
            network_quality: tool_available("networkQuality"),
            ping: tool_available("ping"),
        };

        let speedtest = if self.config.use_speedtest {
            info!("running speedtest");
            speedtest::run_speedtest(
                self.config.speedtest_timeout,
                self.config.speedtest_server_id.as_deref(),
            )
        } else {
            debug!("speedtest disabled");
            None
        };

        // No ordering dependency on the speedtest result; runs regardless.
        let network_quality = if self.config.use_network_quality {
            info!("running networkQuality");
            netquality::run_network_quality(self.config.network_quality_timeout)
        } else {
            debug!("networkQuality disabled");
            None
        };

        let targets = self.ping_target_list(speedtest.as_ref().and_then(|s| s.server_host.as_deref()));
        let mut ping = Vec::new();
        if self.config.use_ping {
            for target in &targets {
                info!("pinging {}", target);
                if let Some(stats) =
                    ping::ping_target(target, self.config.ping_count, self.config.ping_timeout)
                {
                    ping.push(stats);
                } else {
                    debug!("ping probe produced nothing for {}", target);
                }
            }
        } else {
            debug!("ping disabled");
        }

        Sample {
            timestamp: env.timestamp.clone(),
            env,
            ipinfo,
            dns_lookup_ms,
            speedtest,
            network_quality,
            ping,
            tooling,
        }
    }

    /// Final target list: the speedtest server host (port stripped) goes
    /// first when requested and known, then the configured targets.
    fn ping_target_list(&self, speedtest_host: Option<&str>) -> Vec<String> {
        let mut targets = self.config.ping_targets.clone();
        if self.config.ping_speedtest_server
            && let Some(host) = speedtest_host
        {
            let host = host.split(':').next().unwrap_or(host);
            if !host.is_empty() {
                targets.insert(0, host.to_string());
            }
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> SampleConfig {
        SampleConfig {
            use_speedtest: false,
            use_network_quality: false,
            use_ping: false,
            include_ipinfo: false,
            dns_probe_host: None,
            ..SampleConfig::default()
        }
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = SampleConfig::default();
        assert_eq!(config.ping_count, 10);
        assert_eq!(config.ping_timeout, Duration::from_secs(20));
        assert_eq!(config.speedtest_timeout, Duration::from_secs(180));
        assert_eq!(config.network_quality_timeout, Duration::from_secs(120));
        assert_eq!(config.ping_targets, vec!["1.1.1.1", "8.8.8.8"]);
    }

    #[test]
    fn test_sample_produced_with_everything_disabled() {
        let collector = Collector::new(disabled_config());
        let sample = collector.collect_sample();

        assert!(sample.speedtest.is_none());
        assert!(sample.network_quality.is_none());
        assert!(sample.ping.is_empty());
        assert!(sample.ipinfo.is_none());
        assert!(sample.dns_lookup_ms.is_none());
        assert!(!sample.timestamp.is_empty());
        assert_eq!(sample.timestamp, sample.env.timestamp);
    }

    #[test]
    fn test_ping_target_list_prepends_server_host_without_port() {
        let collector = Collector::new(SampleConfig {
            ping_speedtest_server: true,
            ..disabled_config()
        });
        let targets = collector.ping_target_list(Some("speedtest.example.net:8080"));
        assert_eq!(
            targets,
            vec!["speedtest.example.net", "1.1.1.1", "8.8.8.8"]
        );
    }

    #[test]
    fn test_ping_target_list_without_flag_or_host() {
        let collector = Collector::new(disabled_config());
        assert_eq!(
            collector.ping_target_list(Some("speedtest.example.net:8080")),
            vec!["1.1.1.1", "8.8.8.8"]
        );

        let collector = Collector::new(SampleConfig {
            ping_speedtest_server: true,
            ..disabled_config()
        });
        assert_eq!(collector.ping_target_list(None), vec!["1.1.1.1", "8.8.8.8"]);
    }
}
