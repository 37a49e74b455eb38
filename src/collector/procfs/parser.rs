//! Parsers for `/proc` filesystem files and other line-oriented tables.
//!
//! These are pure functions that parse the content of various text files
//! into structured data. They are designed to be easily testable with string inputs.

use thiserror::Error;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

/// Parsed data from `/proc/meminfo`. Values are in kB as printed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    pub buffers: u64,
    pub cached: u64,
    pub active: u64,
    pub inactive: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

/// Parses `/proc/meminfo` content.
///
/// Each line is split on the first colon. Unknown keys are ignored, but a
/// recognized key with an unparsable value is an error: every derived ratio
/// would be wrong otherwise.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let slot = match key.trim() {
            "MemTotal" => &mut info.mem_total,
            "MemFree" => &mut info.mem_free,
            "Buffers" => &mut info.buffers,
            "Cached" => &mut info.cached,
            "Active" => &mut info.active,
            "Inactive" => &mut info.inactive,
            "SwapTotal" => &mut info.swap_total,
            "SwapFree" => &mut info.swap_free,
            _ => continue,
        };

        let value = value.trim();
        let number = value.strip_suffix("kB").unwrap_or(value).trim();
        *slot = number.parse().map_err(|_| {
            ParseError::new(format!("invalid value for {}: {:?}", key.trim(), value))
        })?;
    }

    Ok(info)
}

/// Swap paging counters from `/proc/vmstat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmstatInfo {
    pub pswpin: u64,
    pub pswpout: u64,
}

/// Parses `/proc/vmstat` content.
///
/// Format: key value (one per line). Unparsable values are skipped.
pub fn parse_vmstat(content: &str) -> Result<VmstatInfo, ParseError> {
    let mut info = VmstatInfo::default();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let Ok(value) = parts[1].parse::<u64>() else {
            continue;
        };
        match parts[0] {
            "pswpin" => info.pswpin = value,
            "pswpout" => info.pswpout = value,
            _ => {}
        }
    }

    Ok(info)
}

/// Extracts `btime` (boot time, seconds since the epoch) from `/proc/stat`.
pub fn parse_btime(content: &str) -> Result<u64, ParseError> {
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() == Some("btime") {
            return parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| ParseError::new("invalid btime"));
        }
    }
    Err(ParseError::new("missing btime in stat"))
}

/// Parses `/proc/uptime` and returns whole seconds since boot.
pub fn parse_uptime(content: &str) -> Result<u64, ParseError> {
    let first = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty uptime"))?;
    let secs: f64 = first
        .parse()
        .map_err(|_| ParseError::new(format!("invalid uptime: {:?}", first)))?;
    Ok(secs as u64)
}

/// Parsed data from `/proc/diskstats`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskStats {
    /// Device name (sda, nvme0n1, etc.)
    pub device: String,
    /// Number of reads completed
    pub reads: u64,
    /// Number of sectors read
    pub read_sectors: u64,
    /// Time spent reading (ms)
    pub read_time: u64,
    /// Number of writes completed
    pub writes: u64,
    /// Number of sectors written
    pub write_sectors: u64,
    /// Time spent writing (ms)
    pub write_time: u64,
}

/// Parses `/proc/diskstats` content.
///
/// Format: major minor name reads r_merged r_sectors r_time writes w_merged w_sectors w_time io_pending io_time w_io_time [discards ...]
pub fn parse_diskstats(content: &str) -> Result<Vec<DiskStats>, ParseError> {
    let mut disks = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue; // Skip malformed lines
        }

        let get_val = |idx: usize| -> Result<u64, ParseError> {
            parts[idx].parse().map_err(|_| {
                ParseError::new(format!("invalid diskstats column {} for {}", idx, parts[2]))
            })
        };

        disks.push(DiskStats {
            device: parts[2].to_string(),
            reads: get_val(3)?,
            read_sectors: get_val(5)?,
            read_time: get_val(6)?,
            writes: get_val(7)?,
            write_sectors: get_val(9)?,
            write_time: get_val(10)?,
        });
    }

    Ok(disks)
}

/// One entry of `/proc/self/mounts`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountEntry {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub options: String,
}

/// Parses `/proc/self/mounts` (fstab format).
///
/// Format: device mountpoint fstype options dump pass. Spaces and other
/// special characters in paths are octal-escaped (`\040`).
pub fn parse_mounts(content: &str) -> Result<Vec<MountEntry>, ParseError> {
    let mut mounts = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts.len() < 4 {
            return Err(ParseError::new(format!("short mounts line: {:?}", line)));
        }
        mounts.push(MountEntry {
            device: unescape_octal(parts[0]),
            mountpoint: unescape_octal(parts[1]),
            fstype: parts[2].to_string(),
            options: parts[3].to_string(),
        });
    }

    Ok(mounts)
}

fn unescape_octal(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let code = bytes[i + 1..i + 4]
                .iter()
                .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            if let Ok(byte) = u8::try_from(code) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parsed data from `/proc/net/dev`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetDevStats {
    /// Interface name (eth0, lo, etc.)
    pub interface: String,
    /// Bytes received
    pub rx_bytes: u64,
    /// Packets received
    pub rx_packets: u64,
    /// Receive errors
    pub rx_errs: u64,
    /// Receive drops
    pub rx_drop: u64,
    /// Bytes transmitted
    pub tx_bytes: u64,
    /// Packets transmitted
    pub tx_packets: u64,
    /// Transmit errors
    pub tx_errs: u64,
    /// Transmit drops
    pub tx_drop: u64,
}

/// Parses `/proc/net/dev` content.
///
/// Format:
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
pub fn parse_net_dev(content: &str) -> Result<Vec<NetDevStats>, ParseError> {
    let mut devices = Vec::new();

    for line in content.lines() {
        // Skip header lines
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }

        let Some((interface, counters)) = line.split_once(':') else {
            continue;
        };

        let interface = interface.trim().to_string();
        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 16 {
            continue;
        }

        let get_val = |idx: usize| -> Result<u64, ParseError> {
            values[idx].parse().map_err(|_| {
                ParseError::new(format!("invalid net/dev column {} for {}", idx, interface))
            })
        };

        devices.push(NetDevStats {
            rx_bytes: get_val(0)?,
            rx_packets: get_val(1)?,
            rx_errs: get_val(2)?,
            rx_drop: get_val(3)?,
            tx_bytes: get_val(8)?,
            tx_packets: get_val(9)?,
            tx_errs: get_val(10)?,
            tx_drop: get_val(11)?,
            interface,
        });
    }

    Ok(devices)
}

/// Identification fields from `/etc/os-release`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsRelease {
    pub id: String,
    pub id_like: String,
    pub version_id: String,
}

/// Parses `/etc/os-release` (shell-style `KEY=value`, optionally quoted).
pub fn parse_os_release(content: &str) -> OsRelease {
    let mut release = OsRelease::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
        match key.trim() {
            "ID" => release.id = value,
            "ID_LIKE" => release.id_like = value,
            "VERSION_ID" => release.version_id = value,
            _ => {}
        }
    }

    release
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
SwapTotal:       4096000 kB
SwapFree:        4000000 kB
HugePages_Total:       0
";
        let info = parse_meminfo(content).unwrap();

        assert_eq!(info.mem_total, 16384000);
        assert_eq!(info.mem_free, 8192000);
        assert_eq!(info.buffers, 512000);
        assert_eq!(info.cached, 2048000);
        assert_eq!(info.active, 4096000);
        assert_eq!(info.inactive, 2048000);
        assert_eq!(info.swap_total, 4096000);
        assert_eq!(info.swap_free, 4000000);
    }

    #[test]
    fn test_parse_meminfo_recognized_key_garbage() {
        let err = parse_meminfo("MemTotal: lots kB\n").unwrap_err();
        assert!(err.message.contains("MemTotal"));
    }

    #[test]
    fn test_parse_meminfo_unknown_key_garbage_ignored() {
        let info = parse_meminfo("MemTotal: 10 kB\nWeird: ??? kB\nno colon here\n").unwrap();
        assert_eq!(info.mem_total, 10);
    }

    #[test]
    fn test_parse_meminfo_swapcached_not_cached() {
        let info = parse_meminfo("SwapCached: 99 kB\nCached: 7 kB\n").unwrap();
        assert_eq!(info.cached, 7);
    }

    #[test]
    fn test_parse_vmstat() {
        let content = "\
pgpgin 123456
pswpin 100
pswpout 200
pgfault 999999
broken
";
        let info = parse_vmstat(content).unwrap();
        assert_eq!(info.pswpin, 100);
        assert_eq!(info.pswpout, 200);
    }

    #[test]
    fn test_parse_btime() {
        let content = "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
ctxt 500000
btime 1700000000
processes 10000
";
        assert_eq!(parse_btime(content).unwrap(), 1700000000);
        assert!(parse_btime("cpu 1 2 3\n").is_err());
        assert!(parse_btime("btime soon\n").is_err());
    }

    #[test]
    fn test_parse_uptime() {
        assert_eq!(parse_uptime("12345.67 98765.43\n").unwrap(), 12345);
        assert!(parse_uptime("").is_err());
    }

    #[test]
    fn test_parse_diskstats() {
        let content = "\
   8       0 sda 1234 0 56789 100 5678 0 98765 200 0 150 300 0 0 0 0
   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260 0 0 0 0
 259       0 nvme0n1 9999 0 123456 500 8888 0 654321 400 5 1000 2000 0 0 0 0
";
        let disks = parse_diskstats(content).unwrap();

        assert_eq!(disks.len(), 3);
        assert_eq!(disks[0].device, "sda");
        assert_eq!(disks[0].reads, 1234);
        assert_eq!(disks[0].read_sectors, 56789);
        assert_eq!(disks[0].read_time, 100);
        assert_eq!(disks[0].writes, 5678);
        assert_eq!(disks[0].write_sectors, 98765);
        assert_eq!(disks[0].write_time, 200);
        assert_eq!(disks[2].device, "nvme0n1");
        assert_eq!(disks[2].reads, 9999);
    }

    #[test]
    fn test_parse_mounts() {
        let content = "\
/dev/sda1 / ext4 rw,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/sdb1 /mnt/my\\040disk vfat ro 0 0
";
        let mounts = parse_mounts(content).unwrap();
        assert_eq!(mounts.len(), 3);
        assert_eq!(mounts[0].device, "/dev/sda1");
        assert_eq!(mounts[0].options, "rw,relatime");
        assert_eq!(mounts[1].fstype, "proc");
        assert_eq!(mounts[2].mountpoint, "/mnt/my disk");
    }

    #[test]
    fn test_parse_mounts_short_line() {
        assert!(parse_mounts("/dev/sda1 /\n").is_err());
    }

    #[test]
    fn test_unescape_octal_edge_cases() {
        assert_eq!(unescape_octal("a\\134b"), "a\\b");
        assert_eq!(unescape_octal("trailing\\04"), "trailing\\04");
        assert_eq!(unescape_octal("\\999"), "\\999");
    }

    #[test]
    fn test_parse_net_dev() {
        let content = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
  eth0: 9876543     5678    1    2    0     0          0        10 87654321     4321    3    4    0     0       0          0
";
        let devices = parse_net_dev(content).unwrap();

        assert_eq!(devices.len(), 2);

        assert_eq!(devices[0].interface, "lo");
        assert_eq!(devices[0].rx_bytes, 1234567);
        assert_eq!(devices[0].rx_packets, 1234);
        assert_eq!(devices[0].tx_packets, 1234);

        assert_eq!(devices[1].interface, "eth0");
        assert_eq!(devices[1].rx_errs, 1);
        assert_eq!(devices[1].rx_drop, 2);
        assert_eq!(devices[1].tx_bytes, 87654321);
        assert_eq!(devices[1].tx_errs, 3);
        assert_eq!(devices[1].tx_drop, 4);
    }

    #[test]
    fn test_parse_os_release() {
        let content = "\
NAME=\"Ubuntu\"
VERSION_ID=\"22.04\"
ID=ubuntu
ID_LIKE=debian
PRETTY_NAME=\"Ubuntu 22.04.3 LTS\"
";
        let r = parse_os_release(content);
        assert_eq!(r.id, "ubuntu");
        assert_eq!(r.id_like, "debian");
        assert_eq!(r.version_id, "22.04");
    }
}
