//! Disk partitions, usage and I/O counters.
//!
//! FreeBSD decodes `statfs` records from `getfsstat(2)` and `devstat`
//! records from `kern.devstat.all`; Linux parses `/proc/self/mounts` and
//! `/proc/diskstats`.

use std::collections::HashMap;

use tracing::debug;

use crate::collector::binary::layouts::{FREEBSD_AMD64_DEVSTAT, FREEBSD_AMD64_STATFS};
use crate::collector::binary::{Devstat, Statfs, decode_each, mount_options};
use crate::collector::config::CollectorConfig;
use crate::collector::error::CollectError;
use crate::collector::platform::Platform;
use crate::collector::procfs::parser::{parse_diskstats, parse_mounts};
use crate::collector::source::{read_mount_table, read_sysctl, read_text};
use crate::collector::traits::{FileSystem, KernelSource};
use crate::model::{DiskIOCounters, DiskPartition, DiskUsageStat, percent};

const CTL_KERN: i32 = 1;
const KERN_DEVSTAT: i32 = 773;
const KERN_DEVSTAT_ALL: i32 = 772;

/// Sector size `/proc/diskstats` counts in, regardless of the device.
const DISKSTATS_SECTOR_SIZE: u64 = 512;

/// Filesystem types that are not backed by storage.
const PSEUDO_FILESYSTEMS: &[&str] = &[
    "autofs",
    "bpf",
    "cgroup",
    "cgroup2",
    "configfs",
    "debugfs",
    "devfs",
    "devpts",
    "fdescfs",
    "fusectl",
    "hugetlbfs",
    "linprocfs",
    "linsysfs",
    "mqueue",
    "proc",
    "procfs",
    "pstore",
    "securityfs",
    "sysfs",
    "tmpfs",
    "tracefs",
];

/// Collects disk statistics.
pub struct DiskCollector<F: FileSystem, K: KernelSource> {
    fs: F,
    kernel: K,
    config: CollectorConfig,
}

impl<F: FileSystem, K: KernelSource> DiskCollector<F, K> {
    pub fn new(fs: F, kernel: K, config: CollectorConfig) -> Self {
        Self { fs, kernel, config }
    }

    /// Lists mounted filesystems.
    ///
    /// With `all == false` pseudo filesystems (proc, devfs, cgroup, ...) are skipped.
    pub fn partitions(&self, all: bool) -> Result<Vec<DiskPartition>, CollectError> {
        let partitions: Vec<DiskPartition> = match self.config.platform {
            Platform::FreeBsd => self
                .statfs_records()?
                .into_iter()
                .map(|fs| DiskPartition {
                    opts: mount_options(fs.flags),
                    device: fs.mntfromname,
                    mountpoint: fs.mntonname,
                    fstype: fs.fstypename,
                })
                .collect(),
            Platform::Linux => {
                let content = read_text(&self.fs, &self.config.proc("self/mounts"))?;
                parse_mounts(&content)?
                    .into_iter()
                    .map(|m| DiskPartition {
                        device: m.device,
                        mountpoint: m.mountpoint,
                        fstype: m.fstype,
                        opts: m.options,
                    })
                    .collect()
            }
        };

        Ok(partitions
            .into_iter()
            .filter(|p| all || !PSEUDO_FILESYSTEMS.contains(&p.fstype.as_str()))
            .collect())
    }

    /// Space and inode usage of every mounted filesystem.
    ///
    /// Needs `statfs` records, so it is only available on FreeBSD.
    pub fn usage(&self) -> Result<Vec<DiskUsageStat>, CollectError> {
        if self.config.platform != Platform::FreeBsd {
            return Err(CollectError::SourceUnavailable("getfsstat".to_string()));
        }
        Ok(self.statfs_records()?.iter().map(usage_from_statfs).collect())
    }

    /// Per-device I/O counters keyed by device name.
    pub fn io_counters(&self) -> Result<HashMap<String, DiskIOCounters>, CollectError> {
        match self.config.platform {
            Platform::FreeBsd => self.devstat_counters(),
            Platform::Linux => self.diskstats_counters(),
        }
    }

    fn statfs_records(&self) -> Result<Vec<Statfs>, CollectError> {
        let buf = read_mount_table(&self.kernel)?;
        Ok(decode_each(&buf, &FREEBSD_AMD64_STATFS)?)
    }

    fn devstat_counters(&self) -> Result<HashMap<String, DiskIOCounters>, CollectError> {
        let buf = read_sysctl(
            &self.kernel,
            "kern.devstat.all",
            &[CTL_KERN, KERN_DEVSTAT, KERN_DEVSTAT_ALL],
        )?;
        let stats: Vec<Devstat> = decode_each(&buf, &FREEBSD_AMD64_DEVSTAT)?;
        debug!(devices = stats.len(), "decoded devstat records");

        Ok(stats
            .into_iter()
            .map(|d| {
                let name = d.name();
                let counters = DiskIOCounters {
                    name: name.clone(),
                    read_count: d.operations_read,
                    write_count: d.operations_write,
                    read_bytes: d.bytes_read,
                    write_bytes: d.bytes_write,
                    read_time: d.duration_read.as_millis(),
                    write_time: d.duration_write.as_millis(),
                };
                (name, counters)
            })
            .collect())
    }

    fn diskstats_counters(&self) -> Result<HashMap<String, DiskIOCounters>, CollectError> {
        let content = read_text(&self.fs, &self.config.proc("diskstats"))?;
        let disks = parse_diskstats(&content)?;

        Ok(disks
            .into_iter()
            .map(|disk| {
                let counters = DiskIOCounters {
                    name: disk.device.clone(),
                    read_count: disk.reads,
                    write_count: disk.writes,
                    read_bytes: disk.read_sectors.saturating_mul(DISKSTATS_SECTOR_SIZE),
                    write_bytes: disk.write_sectors.saturating_mul(DISKSTATS_SECTOR_SIZE),
                    read_time: disk.read_time,
                    write_time: disk.write_time,
                };
                (disk.device, counters)
            })
            .collect())
    }
}

fn usage_from_statfs(fs: &Statfs) -> DiskUsageStat {
    let total = fs.blocks.saturating_mul(fs.bsize);
    let free = u64::try_from(fs.bavail)
        .unwrap_or(0)
        .saturating_mul(fs.bsize);
    let used = fs.blocks.saturating_sub(fs.bfree).saturating_mul(fs.bsize);
    let inodes_free = u64::try_from(fs.ffree).unwrap_or(0);
    let inodes_used = fs.files.saturating_sub(inodes_free);

    DiskUsageStat {
        path: fs.mntonname.clone(),
        fstype: fs.fstypename.clone(),
        total,
        free,
        used,
        used_percent: percent(used, used.saturating_add(free)),
        inodes_total: fs.files,
        inodes_free,
        inodes_used,
        inodes_used_percent: percent(inodes_used, fs.files),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::binary::Bintime;
    use crate::collector::binary::flags::{MNT_NOATIME, MNT_RDONLY, MNT_SOFTDEP};
    use crate::collector::mock::records::{DevstatBuilder, StatfsBuilder, devstat_dump};
    use crate::collector::mock::{MockFs, MockKernel};
    use std::io;

    fn freebsd(kernel: MockKernel) -> DiskCollector<MockFs, MockKernel> {
        DiskCollector::new(
            MockFs::new(),
            kernel,
            CollectorConfig::default().with_platform(Platform::FreeBsd),
        )
    }

    fn linux(fs: MockFs) -> DiskCollector<MockFs, MockKernel> {
        DiskCollector::new(
            fs,
            MockKernel::new(),
            CollectorConfig::default().with_platform(Platform::Linux),
        )
    }

    #[test]
    fn test_freebsd_partitions() {
        let parts = freebsd(MockKernel::typical_freebsd()).partitions(true).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[0],
            DiskPartition {
                device: "/dev/ada0p2".into(),
                mountpoint: "/".into(),
                fstype: "ufs".into(),
                opts: "rw,softdep,acls".into(),
            }
        );
        assert_eq!(parts[1].opts, "rw,nosuid,multilabel");
        assert_eq!(parts[2].fstype, "devfs");
    }

    #[test]
    fn test_freebsd_partitions_skip_pseudo() {
        let parts = freebsd(MockKernel::typical_freebsd()).partitions(false).unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.fstype != "devfs"));
    }

    #[test]
    fn test_partition_options_are_stable() {
        let mut kernel = MockKernel::new();
        kernel.set_mount_table(
            StatfsBuilder::new("/dev/cd0", "/cdrom", "cd9660")
                .flags(MNT_NOATIME | MNT_SOFTDEP | MNT_RDONLY)
                .build(),
        );
        let collector = freebsd(kernel);
        let first = collector.partitions(true).unwrap();
        assert_eq!(first[0].opts, "ro,softdep,noatime");
        for _ in 0..5 {
            assert_eq!(collector.partitions(true).unwrap(), first);
        }
    }

    #[test]
    fn test_freebsd_partitions_truncated_table() {
        let mut kernel = MockKernel::new();
        let mut buf = StatfsBuilder::new("/dev/ada0p2", "/", "ufs").build();
        buf.truncate(1000);
        kernel.set_mount_table(buf);

        let err = freebsd(kernel).partitions(true).unwrap_err();
        assert!(matches!(err, CollectError::Decode(_)));
    }

    #[test]
    fn test_freebsd_usage() {
        let usage = freebsd(MockKernel::typical_freebsd()).usage().unwrap();
        let root = &usage[0];
        assert_eq!(root.path, "/");
        assert_eq!(root.total, 1000 * 4096);
        assert_eq!(root.used, 600 * 4096);
        assert_eq!(root.free, 350 * 4096);
        assert!((root.used_percent - 600.0 / 950.0 * 100.0).abs() < 1e-9);
        assert_eq!(root.inodes_used, 400);
        assert!((root.inodes_used_percent - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_usage_zero_blocks() {
        let u = usage_from_statfs(&Statfs::default());
        assert_eq!(u.used_percent, 0.0);
        assert_eq!(u.inodes_used_percent, 0.0);
    }

    #[test]
    fn test_usage_garbage_block_size_saturates() {
        let mut kernel = MockKernel::new();
        kernel.set_mount_table(
            StatfsBuilder::new("/dev/ada1p1", "/data", "ufs")
                .blocks(u64::MAX, 1000, 10, 500)
                .files(10, 5)
                .build(),
        );
        let usage = freebsd(kernel).usage().unwrap();
        assert_eq!(usage[0].total, u64::MAX);
        assert_eq!(usage[0].used, u64::MAX);
        assert_eq!(usage[0].free, u64::MAX);
        assert!((usage[0].used_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_linux_io_counters_huge_sectors_saturate() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/diskstats",
            "   8 0 sdb 1 0 18446744073709551615 1 1 0 36028797018963968 1 0 1 1\n",
        );
        let counters = linux(fs).io_counters().unwrap();
        assert_eq!(counters["sdb"].read_bytes, u64::MAX);
        assert_eq!(counters["sdb"].write_bytes, u64::MAX);
    }

    #[test]
    fn test_usage_linux_unavailable() {
        let err = linux(MockFs::new()).usage().unwrap_err();
        assert!(matches!(err, CollectError::SourceUnavailable(_)));
    }

    #[test]
    fn test_freebsd_io_counters() {
        let counters = freebsd(MockKernel::typical_freebsd()).io_counters().unwrap();
        assert_eq!(counters.len(), 2);

        let ada0 = &counters["ada0"];
        assert_eq!(ada0.read_count, 1500);
        assert_eq!(ada0.write_count, 800);
        assert_eq!(ada0.read_bytes, 61_440_000);
        assert_eq!(ada0.write_bytes, 32_768_000);
        assert_eq!(ada0.read_time, 12_250);
        assert_eq!(ada0.write_time, 8_500);

        assert!(counters.contains_key("cd0"));
    }

    #[test]
    fn test_freebsd_io_counters_header_only() {
        let mut kernel = MockKernel::new();
        kernel.set_sysctl(&[1, 773, 772], devstat_dump(&[]));
        assert!(freebsd(kernel).io_counters().unwrap().is_empty());
    }

    #[test]
    fn test_freebsd_io_counters_ignores_partial_tail() {
        let mut kernel = MockKernel::new();
        let mut buf = devstat_dump(&[
            DevstatBuilder::new("da", 0).operations(1, 2),
            DevstatBuilder::new("da", 1)
                .operations(3, 4)
                .durations(Bintime::new(0, 1 << 62), Bintime::default()),
        ]);
        buf.extend_from_slice(&[0u8; 40]);
        kernel.set_sysctl(&[1, 773, 772], buf);

        let counters = freebsd(kernel).io_counters().unwrap();
        assert_eq!(counters.len(), 2);
        assert_eq!(counters["da1"].read_time, 250);
    }

    #[test]
    fn test_freebsd_io_counters_permission_denied() {
        let mut kernel = MockKernel::new();
        kernel.fail_sysctl(&[1, 773, 772], io::ErrorKind::PermissionDenied);
        let err = freebsd(kernel).io_counters().unwrap_err();
        assert!(matches!(err, CollectError::PermissionDenied(ref n) if n == "kern.devstat.all"));
    }

    #[test]
    fn test_linux_partitions() {
        let fs = MockFs::typical_linux();
        let all = linux(fs.clone()).partitions(true).unwrap();
        let real = linux(fs).partitions(false).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(real.len(), 2);
        assert_eq!(real[0].device, "/dev/sda1");
        assert_eq!(real[0].opts, "rw,relatime");
        assert_eq!(real[1].mountpoint, "/home");
    }

    #[test]
    fn test_linux_io_counters() {
        let counters = linux(MockFs::typical_linux()).io_counters().unwrap();
        assert_eq!(counters.len(), 3);
        let sda = &counters["sda"];
        assert_eq!(sda.read_count, 12345);
        assert_eq!(sda.read_bytes, 987654 * 512);
        assert_eq!(sda.write_count, 6789);
        assert_eq!(sda.write_bytes, 456789 * 512);
        assert_eq!(sda.read_time, 5000);
        assert_eq!(sda.write_time, 3000);
    }
}
