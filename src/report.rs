//! Plain-text report rendering for samples and summaries.
//!
//! Output goes straight to stdout. Styling uses crossterm and is disabled
//! when stdout is not a terminal or `NO_COLOR` is set, so piped output stays
//! clean.

use std::io::IsTerminal;

use crossterm::style::Stylize;
use serde_json::{Map, Value};

use crate::fmt::{self, format_table};
use crate::storage::model::{Sample, Summary};

fn color_enabled() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn heading(text: &str) -> String {
    if color_enabled() {
        text.cyan().to_string()
    } else {
        text.to_string()
    }
}

fn title(text: &str) -> String {
    if color_enabled() {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn note(text: &str) -> String {
    if color_enabled() {
        text.yellow().to_string()
    } else {
        text.to_string()
    }
}

fn dim(text: &str) -> String {
    if color_enabled() {
        text.dim().to_string()
    } else {
        text.to_string()
    }
}

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "unknown".to_string())
}

fn map_str(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)?.as_str().map(str::to_string)
}

/// Renders one sample as labeled sections.
pub fn print_sample(sample: &Sample, print_raw: bool) {
    println!("{}", title(&format!("\nnetgauge - {}\n", sample.timestamp)));

    let mut env_rows = vec![
        ("Host".to_string(), sample.env.hostname.clone()),
        ("OS".to_string(), sample.env.os.clone()),
        ("Machine".to_string(), sample.env.machine.clone()),
        ("Version".to_string(), sample.env.version.clone()),
        (
            "Default iface".to_string(),
            opt_str(&sample.env.default_interface),
        ),
        ("Local IP".to_string(), opt_str(&sample.env.local_ip)),
        (
            "DNS lookup".to_string(),
            fmt::millis(sample.dns_lookup_ms),
        ),
    ];
    if let Some(ipinfo) = &sample.ipinfo {
        let location: Vec<String> = ["city", "region", "country"]
            .into_iter()
            .filter_map(|key| map_str(ipinfo, key))
            .collect();
        env_rows.push((
            "Public IP".to_string(),
            map_str(ipinfo, "ip").unwrap_or_else(|| "unknown".to_string()),
        ));
        env_rows.push((
            "ISP/Org".to_string(),
            map_str(ipinfo, "org").unwrap_or_else(|| "unknown".to_string()),
        ));
        env_rows.push((
            "Location".to_string(),
            if location.is_empty() {
                "unknown".to_string()
            } else {
                location.join(", ")
            },
        ));
    }
    println!("{}", heading("Environment"));
    println!("{}", format_table(&env_rows));

    println!("\n{}", heading("Ookla Speedtest (CLI)"));
    match &sample.speedtest {
        Some(st) => {
            let rows = vec![
                (
                    "Server".to_string(),
                    format!(
                        "{} ({})",
                        st.server_name.as_deref().unwrap_or("unknown"),
                        st.server_id.as_deref().unwrap_or(fmt::NOT_AVAILABLE)
                    ),
                ),
                ("Server host".to_string(), opt_str(&st.server_host)),
                ("Server location".to_string(), opt_str(&st.server_location)),
                ("ISP".to_string(), opt_str(&st.isp)),
                ("Idle latency".to_string(), fmt::millis(st.idle_latency_ms)),
                ("Jitter".to_string(), fmt::millis(st.jitter_ms)),
                ("Download".to_string(), fmt::mbps(st.download_mbps)),
                ("Upload".to_string(), fmt::mbps(st.upload_mbps)),
                ("Packet loss".to_string(), fmt::percent(st.packet_loss_pct)),
            ];
            println!("{}", format_table(&rows));
        }
        None => println!(
            "{}",
            note("  Not available (install the `speedtest` CLI for ISP-grade numbers).")
        ),
    }

    println!("\n{}", heading("Apple networkQuality"));
    match &sample.network_quality {
        Some(nq) => {
            let rows = vec![
                (
                    "Downlink capacity".to_string(),
                    fmt::mbps(nq.downlink_mbps),
                ),
                ("Uplink capacity".to_string(), fmt::mbps(nq.uplink_mbps)),
                (
                    "Downlink responsiveness".to_string(),
                    fmt::responsiveness(nq.downlink_resp_ms, nq.downlink_resp_rpm),
                ),
                (
                    "Uplink responsiveness".to_string(),
                    fmt::responsiveness(nq.uplink_resp_ms, nq.uplink_resp_rpm),
                ),
                ("Idle latency".to_string(), fmt::millis(nq.idle_latency_ms)),
            ];
            println!("{}", format_table(&rows));
        }
        None => println!("{}", note("  Not available (ships with macOS 12+).")),
    }

    println!("\n{}", heading("ICMP Ping baselines"));
    if sample.ping.is_empty() {
        println!("{}", note("  Ping unavailable."));
    } else {
        for stats in &sample.ping {
            let rows = vec![
                ("Target".to_string(), stats.target.clone()),
                (
                    "Loss".to_string(),
                    format!(
                        "{:.1}% ({}/{})",
                        stats.loss_pct, stats.received, stats.sent
                    ),
                ),
                (
                    "RTT min/avg/max".to_string(),
                    fmt::rtt_triple(stats.rtt_min_ms, stats.rtt_avg_ms, stats.rtt_max_ms),
                ),
                ("Jitter".to_string(), fmt::millis(stats.jitter_ms)),
            ];
            println!("{}\n", format_table(&rows));
        }
    }

    if print_raw {
        if let Some(st) = &sample.speedtest {
            println!("{}", note("\nRaw speedtest JSON"));
            println!(
                "{}",
                serde_json::to_string_pretty(&st.raw).unwrap_or_else(|_| st.raw.to_string())
            );
        }
        if let Some(nq) = &sample.network_quality {
            println!("{}", note("\nRaw networkQuality output"));
            println!("{}", nq.raw_text);
        }
    }

    println!(
        "{}",
        dim("\nTip\n  Run 3-5 samples and look at the median. Wildly varying results mean something is loading the link.")
    );
}

/// Renders the final median summary.
pub fn print_summary(summary: &Summary) {
    println!(
        "\n{}",
        heading(&format!("Summary (median of {} samples)", summary.samples))
    );
    for (metric, value) in &summary.median {
        let rendered = if metric.contains("mbps") {
            fmt::mbps(*value)
        } else {
            fmt::millis(*value)
        };
        println!("  {}: {}", metric, rendered);
    }
}
