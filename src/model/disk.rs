//! Disk partitions, usage and I/O counters.

use serde::{Deserialize, Serialize};

/// A mounted filesystem.
///
/// Source: `getfsstat(2)` on FreeBSD, `/proc/self/mounts` on Linux.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct DiskPartition {
    /// Mounted device or source (`f_mntfromname`).
    pub device: String,
    /// Mount point (`f_mntonname`).
    pub mountpoint: String,
    /// Filesystem type (`f_fstypename`).
    pub fstype: String,
    /// Comma-separated mount options in a fixed order, starting with `rw` or `ro`.
    pub opts: String,
}

/// Space and inode usage of one mounted filesystem.
///
/// Source: block and file counters of a `statfs` record.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct DiskUsageStat {
    pub path: String,
    pub fstype: String,
    /// Total bytes (`f_blocks * f_bsize`).
    pub total: u64,
    /// Bytes available to unprivileged users (`f_bavail * f_bsize`).
    pub free: u64,
    /// `(f_blocks - f_bfree) * f_bsize`.
    pub used: u64,
    pub used_percent: f64,
    pub inodes_total: u64,
    pub inodes_free: u64,
    pub inodes_used: u64,
    pub inodes_used_percent: f64,
}

/// Cumulative I/O counters of one block device since boot.
///
/// Source: `devstat` records from `kern.devstat.all` on FreeBSD,
/// `/proc/diskstats` on Linux.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct DiskIOCounters {
    /// Device name, e.g. `ada0` or `sda`.
    pub name: String,
    /// Completed read operations.
    pub read_count: u64,
    /// Completed write operations.
    pub write_count: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    /// Time spent reading (milliseconds).
    pub read_time: u64,
    /// Time spent writing (milliseconds).
    pub write_time: u64,
}
