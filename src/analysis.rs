//! Median aggregation across measurement samples.
//!
//! Single runs are noisy: a background download or a transient Wi-Fi dip can
//! halve one sample's throughput. The median across repeated samples is
//! robust to such single-run outliers, which mean aggregation is not.

use std::collections::BTreeMap;

use crate::storage::model::{Sample, Summary};

/// Median of `values`: empty input is `None`, odd counts take the middle
/// value after ascending sort, even counts the mean of the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Computes the per-metric median [`Summary`] over `samples`.
///
/// A sample lacking a metric is excluded from that metric's computation, not
/// treated as zero. Pure and order-independent.
pub fn summarize(samples: &[Sample]) -> Summary {
    let mut medians: BTreeMap<String, Option<f64>> = BTreeMap::new();

    let mut track = |name: &str, extract: fn(&Sample) -> Option<f64>| {
        let values: Vec<f64> = samples.iter().filter_map(extract).collect();
        medians.insert(name.to_string(), median(&values));
    };

    track("download_mbps", |s| s.speedtest.as_ref()?.download_mbps);
    track("upload_mbps", |s| s.speedtest.as_ref()?.upload_mbps);
    track("idle_latency_ms", |s| s.speedtest.as_ref()?.idle_latency_ms);
    track("jitter_ms", |s| s.speedtest.as_ref()?.jitter_ms);
    track("nq_downlink_mbps", |s| {
        s.network_quality.as_ref()?.downlink_mbps
    });
    track("nq_uplink_mbps", |s| s.network_quality.as_ref()?.uplink_mbps);

    Summary {
        samples: samples.len(),
        median: medians,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::model::{
        EnvironmentInfo, NetworkQualityResult, SpeedtestResult, ToolAvailability,
    };

    fn sample_with(download_mbps: Option<f64>, nq_downlink_mbps: Option<f64>) -> Sample {
        Sample {
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            env: EnvironmentInfo::default(),
            ipinfo: None,
            dns_lookup_ms: None,
            speedtest: download_mbps.map(|mbps| SpeedtestResult {
                download_mbps: Some(mbps),
                ..SpeedtestResult::default()
            }),
            network_quality: nq_downlink_mbps.map(|mbps| NetworkQualityResult {
                downlink_mbps: Some(mbps),
                ..NetworkQualityResult::default()
            }),
            ping: Vec::new(),
            tooling: ToolAvailability::default(),
        }
    }

    #[test]
    fn test_median_odd_count() {
        assert_eq!(median(&[90.0, 100.0, 95.0]), Some(95.0));
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(&[90.0, 100.0]), Some(95.0));
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_median_single() {
        assert_eq!(median(&[42.0]), Some(42.0));
    }

    #[test]
    fn test_median_is_order_independent() {
        assert_eq!(median(&[100.0, 90.0, 95.0]), median(&[90.0, 95.0, 100.0]));
    }

    #[test]
    fn test_summarize_medians_per_metric() {
        let samples = vec![
            sample_with(Some(90.0), Some(400.0)),
            sample_with(Some(100.0), Some(500.0)),
            sample_with(Some(95.0), Some(450.0)),
        ];
        let summary = summarize(&samples);
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.median["download_mbps"], Some(95.0));
        assert_eq!(summary.median["nq_downlink_mbps"], Some(450.0));
    }

    #[test]
    fn test_summarize_skips_absent_values() {
        // the middle sample has no speedtest result at all
        let samples = vec![
            sample_with(Some(90.0), None),
            sample_with(None, None),
            sample_with(Some(100.0), None),
        ];
        let summary = summarize(&samples);
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.median["download_mbps"], Some(95.0));
    }

    #[test]
    fn test_summarize_empty_metric_is_absent() {
        let samples = vec![sample_with(None, None)];
        let summary = summarize(&samples);
        assert_eq!(summary.median["download_mbps"], None);
        assert_eq!(summary.median["upload_mbps"], None);
    }

    #[test]
    fn test_summarize_no_samples() {
        let summary = summarize(&[]);
        assert_eq!(summary.samples, 0);
        assert!(summary.median.values().all(Option::is_none));
    }
}
