//! netgauge - Network link quality sampler.
//!
//! Orchestrates the Ookla speedtest CLI, Apple networkQuality, and ICMP ping
//! probes, appends every sample to JSONL, and reports median aggregates
//! across runs.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use netgauge::analysis;
use netgauge::collector::{Collector, SampleConfig, environment};
use netgauge::report;
use netgauge::storage::RecordStore;
use netgauge::storage::model::Sample;

/// Network link quality sampler.
#[derive(Parser)]
#[command(
    name = "netgauge",
    about = "Run network speed and quality tests (speedtest + networkQuality + ping)",
    version
)]
struct Args {
    /// Number of samples to collect (3-5 recommended).
    #[arg(long, default_value = "1")]
    runs: u32,

    /// Seconds to pause between samples.
    #[arg(long, default_value = "2.0")]
    sleep_between: f64,

    /// Run the Ookla speedtest CLI. Disable with --speedtest=false.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    speedtest: bool,

    /// Force a specific Ookla server id.
    #[arg(long)]
    server_id: Option<String>,

    /// Timeout in seconds for the speedtest CLI.
    #[arg(long, default_value = "180")]
    speedtest_timeout: u64,

    /// Run Apple networkQuality. Disable with --network-quality=false.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    network_quality: bool,

    /// Timeout in seconds for networkQuality.
    #[arg(long, default_value = "120")]
    network_quality_timeout: u64,

    /// Run ICMP ping probes. Disable with --ping=false.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    ping: bool,

    /// Ping target (repeatable). Defaults to 1.1.1.1 and 8.8.8.8.
    #[arg(long = "ping-target", value_name = "HOST")]
    ping_targets: Vec<String>,

    /// Also ping the chosen speedtest server host (if known).
    #[arg(long)]
    ping_speedtest_server: bool,

    /// ICMP echoes per target.
    #[arg(long, default_value = "10")]
    ping_count: u32,

    /// Timeout in seconds per ping invocation.
    #[arg(long, default_value = "20")]
    ping_timeout: u64,

    /// Fetch public IP info from ipinfo.io. Disable with --ipinfo=false.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    ipinfo: bool,

    /// Timeout in seconds for the public IP lookup.
    #[arg(long, default_value = "10")]
    http_timeout: u64,

    /// Host for the DNS timing probe. Set empty to disable.
    #[arg(long, default_value = "icloud.com")]
    dns_probe_host: String,

    /// Path to append JSONL records.
    #[arg(long, default_value = "./netgauge.jsonl")]
    jsonl: PathBuf,

    /// Path to append human-readable log lines.
    #[arg(long, default_value = "./netgauge.log")]
    log: PathBuf,

    /// Suppress report output; still writes JSONL/log.
    #[arg(short, long)]
    quiet: bool,

    /// Print raw tool outputs after each sample (debugging).
    #[arg(long)]
    print_raw: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn sample_config(&self) -> SampleConfig {
        let defaults = SampleConfig::default();
        SampleConfig {
            use_speedtest: self.speedtest,
            speedtest_server_id: self.server_id.clone(),
            speedtest_timeout: Duration::from_secs(self.speedtest_timeout),
            use_network_quality: self.network_quality,
            network_quality_timeout: Duration::from_secs(self.network_quality_timeout),
            use_ping: self.ping,
            ping_targets: if self.ping_targets.is_empty() {
                defaults.ping_targets
            } else {
                self.ping_targets.clone()
            },
            ping_speedtest_server: self.ping_speedtest_server,
            ping_count: self.ping_count,
            ping_timeout: Duration::from_secs(self.ping_timeout),
            include_ipinfo: self.ipinfo,
            http_timeout: Duration::from_secs(self.http_timeout),
            dns_probe_host: (!self.dns_probe_host.is_empty())
                .then(|| self.dns_probe_host.clone()),
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO so progress is visible while tools run. Use -q for
/// quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("netgauge={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// One human log line per sample: timestamp plus the speedtest record.
fn log_line(sample: &Sample) -> String {
    let speedtest = sample
        .speedtest
        .as_ref()
        .and_then(|st| serde_json::to_string(st).ok())
        .unwrap_or_else(|| "{}".to_string());
    format!("{} {}", sample.timestamp, speedtest)
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    info!("netgauge {} starting", env!("CARGO_PKG_VERSION"));

    let store = RecordStore::new(&args.jsonl, &args.log);
    let collector = Collector::new(args.sample_config());

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("failed to set Ctrl-C handler: {}", e);
    }

    let mut samples: Vec<Sample> = Vec::new();
    for run in 0..args.runs {
        if !running.load(Ordering::SeqCst) {
            warn!("interrupted, stopping after {} samples", samples.len());
            break;
        }

        info!("collecting sample {}/{}", run + 1, args.runs);
        let sample = collector.collect_sample();

        if let Err(e) = store.append_record(&sample) {
            warn!("failed to append JSONL record: {}", e);
        }
        if let Err(e) = store.append_log_line(&log_line(&sample)) {
            warn!("failed to append log line: {}", e);
        }

        if !args.quiet {
            report::print_sample(&sample, args.print_raw);
        }
        samples.push(sample);

        if run + 1 < args.runs && running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_secs_f64(args.sleep_between.max(0.0)));
        }
    }

    let summary = analysis::summarize(&samples);
    let envelope = serde_json::json!({
        "summary": &summary,
        "timestamp": environment::now_iso(),
    });
    if let Err(e) = store.append_record(&envelope) {
        warn!("failed to append summary record: {}", e);
    }

    if !args.quiet {
        report::print_summary(&summary);
        println!("\nSaved:");
        println!("  JSONL: {}", store.jsonl_path().display());
        println!("  Log  : {}", store.log_path().display());
    }

    info!("done: {} samples", summary.samples);
}
