//! Pure formatting helpers for report rendering.
//!
//! Absent values always render as [`NOT_AVAILABLE`], never as a zero that
//! could be mistaken for a measurement.

/// Marker rendered for any value that was not measured.
pub const NOT_AVAILABLE: &str = "n/a";

/// `"95.00 Mbps"` or `"n/a"`.
pub fn mbps(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2} Mbps", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `"12.50 ms"` or `"n/a"`.
pub fn millis(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2} ms", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `"0.50%"` or `"n/a"`.
pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Responsiveness pair: `"5.200 ms | 11538 RPM"`, degrading to whichever
/// half is present, `"n/a"` when neither is.
pub fn responsiveness(ms: Option<f64>, rpm: Option<f64>) -> String {
    match (ms, rpm) {
        (Some(ms), Some(rpm)) => format!("{:.3} ms | {:.0} RPM", ms, rpm),
        (None, Some(rpm)) => format!("{:.0} RPM", rpm),
        (Some(ms), None) => format!("{:.3} ms", ms),
        (None, None) => NOT_AVAILABLE.to_string(),
    }
}

/// Round-trip triple: `"min 10.00 ms, avg 12.50 ms, max 15.00 ms"` with
/// `n/a` per missing part.
pub fn rtt_triple(min: Option<f64>, avg: Option<f64>, max: Option<f64>) -> String {
    [("min", min), ("avg", avg), ("max", max)]
        .into_iter()
        .map(|(label, value)| match value {
            Some(v) => format!("{} {:.2} ms", label, v),
            None => format!("{} {}", label, NOT_AVAILABLE),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Aligns `key : value` rows on the widest key.
pub fn format_table(rows: &[(String, String)]) -> String {
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(k, v)| format!("{:<width$} : {}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_values_render_as_marker() {
        assert_eq!(mbps(None), "n/a");
        assert_eq!(millis(None), "n/a");
        assert_eq!(percent(None), "n/a");
        assert_eq!(responsiveness(None, None), "n/a");
    }

    #[test]
    fn test_present_values() {
        assert_eq!(mbps(Some(95.0)), "95.00 Mbps");
        assert_eq!(millis(Some(12.5)), "12.50 ms");
        assert_eq!(percent(Some(0.5)), "0.50%");
    }

    #[test]
    fn test_responsiveness_variants() {
        assert_eq!(
            responsiveness(Some(5.2), Some(11538.0)),
            "5.200 ms | 11538 RPM"
        );
        assert_eq!(responsiveness(None, Some(11538.0)), "11538 RPM");
        assert_eq!(responsiveness(Some(5.2), None), "5.200 ms");
    }

    #[test]
    fn test_rtt_triple_partial() {
        assert_eq!(
            rtt_triple(Some(10.0), Some(12.5), Some(15.0)),
            "min 10.00 ms, avg 12.50 ms, max 15.00 ms"
        );
        assert_eq!(
            rtt_triple(None, None, None),
            "min n/a, avg n/a, max n/a"
        );
    }

    #[test]
    fn test_format_table_aligns_keys() {
        let rows = vec![
            ("Host".to_string(), "mbp".to_string()),
            ("Default iface".to_string(), "en0".to_string()),
        ];
        assert_eq!(format_table(&rows), "Host          : mbp\nDefault iface : en0");
    }

    #[test]
    fn test_format_table_empty() {
        assert_eq!(format_table(&[]), "");
    }
}
