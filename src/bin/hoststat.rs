//! hoststat - one-shot dump of host resource counters.
//!
//! Usage:
//!   hoststat                 # JSON snapshot of the live host
//!   hoststat --text          # human-readable summary
//!   hoststat --pernic --all  # per-interface rows, every mount
//!   hoststat --proc-path /mnt/proc --platform linux

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use chrono::DateTime;
use clap::{Parser, ValueEnum};
use tracing::{Level, debug, error};
use tracing_subscriber::EnvFilter;

use hoststat::collector::Snapshot;
use hoststat::{Collector, CollectorConfig, Platform};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlatformArg {
    Linux,
    Freebsd,
}

impl From<PlatformArg> for Platform {
    fn from(p: PlatformArg) -> Self {
        match p {
            PlatformArg::Linux => Platform::Linux,
            PlatformArg::Freebsd => Platform::FreeBsd,
        }
    }
}

/// Host resource counters dump.
#[derive(Parser)]
#[command(name = "hoststat", about = "Host resource counters dump", version)]
struct Args {
    /// Path to /proc filesystem (for testing/chroots).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Root for /etc/os-release and container markers.
    #[arg(long, default_value = "/")]
    root_path: String,

    /// Login-session record file.
    #[arg(long, default_value = "/var/run/utmp")]
    utmp_path: String,

    /// BSD netstat binary.
    #[arg(long, default_value = "/usr/bin/netstat")]
    netstat_path: String,

    /// Decode sources as this platform instead of the build target.
    #[arg(long, value_enum)]
    platform: Option<PlatformArg>,

    /// Include pseudo filesystems in the partition list.
    #[arg(short, long)]
    all: bool,

    /// One network row per interface instead of a single aggregate.
    #[arg(long)]
    pernic: bool,

    /// Print a text summary instead of JSON.
    #[arg(short, long)]
    text: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber on stderr so stdout stays parseable.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    // The directive comes from a fixed Level and always parses; on error RUST_LOG alone applies.
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("hoststat={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Formats bytes as human-readable size string.
fn format_size(bytes: u64) -> String {
    const GB: u64 = 1024 * 1024 * 1024;
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;

    if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

fn format_time(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn print_text(snap: &Snapshot) {
    let h = &snap.host;
    println!(
        "host      {} ({} {} {}, family {})",
        h.hostname, h.os, h.platform, h.platform_version, h.platform_family
    );
    println!(
        "boot      {} (up {}s)",
        format_time(i64::try_from(h.boot_time).unwrap_or(i64::MAX)),
        h.uptime
    );
    if !h.virtualization_system.is_empty() || !h.virtualization_role.is_empty() {
        println!("virt      {} {}", h.virtualization_system, h.virtualization_role);
    }

    if let Some(vm) = &snap.virtual_memory {
        println!(
            "memory    total {} used {} ({:.1}%) available {}",
            format_size(vm.total),
            format_size(vm.used),
            vm.used_percent,
            format_size(vm.available)
        );
    }
    if let Some(swap) = &snap.swap_memory {
        println!(
            "swap      total {} used {} ({:.1}%) in {} out {}",
            format_size(swap.total),
            format_size(swap.used),
            swap.used_percent,
            format_size(swap.sin),
            format_size(swap.sout)
        );
    }

    for p in snap.disk_partitions.iter().flatten() {
        println!("mount     {} on {} type {} ({})", p.device, p.mountpoint, p.fstype, p.opts);
    }
    for u in snap.disk_usage.iter().flatten() {
        println!(
            "usage     {} {} of {} ({:.1}%)",
            u.path,
            format_size(u.used),
            format_size(u.total),
            u.used_percent
        );
    }
    if let Some(counters) = &snap.disk_io_counters {
        let mut names: Vec<&String> = counters.keys().collect();
        names.sort();
        for name in names {
            let d = &counters[name];
            println!(
                "disk      {} r {} ({}) w {} ({})",
                d.name,
                d.read_count,
                format_size(d.read_bytes),
                d.write_count,
                format_size(d.write_bytes)
            );
        }
    }
    for n in snap.net_io_counters.iter().flatten() {
        println!(
            "net       {} rx {} ({} pkts) tx {} ({} pkts)",
            n.name,
            format_size(n.bytes_recv),
            n.packets_recv,
            format_size(n.bytes_sent),
            n.packets_sent
        );
    }
    for u in snap.users.iter().flatten() {
        println!(
            "user      {} {} {} since {}",
            u.user,
            u.terminal,
            if u.host.is_empty() { "-" } else { u.host.as_str() },
            format_time(u.started)
        );
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let mut config = CollectorConfig::new()
        .with_proc_path(&args.proc_path)
        .with_root_path(&args.root_path)
        .with_utmp_path(&args.utmp_path)
        .with_netstat_path(&args.netstat_path);
    if let Some(platform) = args.platform {
        config = config.with_platform(platform.into());
    }
    debug!(?config, "collector configured");

    let collector = Collector::real(config);
    let snapshot = collector.snapshot(args.all, args.pernic);

    if args.text {
        print_text(&snapshot);
        return;
    }

    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to serialize snapshot: {}", e);
            std::process::exit(1);
        }
    }
}
