//! Facade bundling the three sources behind every sampling operation.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::collector::config::CollectorConfig;
use crate::collector::disk::DiskCollector;
use crate::collector::error::CollectError;
use crate::collector::host::HostCollector;
use crate::collector::memory::MemoryCollector;
use crate::collector::net::NetCollector;
use crate::collector::traits::{
    CommandRunner, FileSystem, KernelSource, RealCommandRunner, RealFs, RealKernel,
};
use crate::model::{
    DiskIOCounters, DiskPartition, DiskUsageStat, HostInfoStat, NetIOCountersStat,
    SwapMemoryStat, UserStat, VirtualMemoryStat,
};

/// Time spent in each part of [`Collector::snapshot`], in microseconds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectorTiming {
    pub host: u64,
    pub memory: u64,
    pub disk: u64,
    pub users: u64,
    pub net: u64,
    pub total: u64,
}

/// Everything the collector can sample, taken in one pass.
///
/// A section whose source failed is `None`; the failure is logged.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Wall-clock time of the sample, seconds since the epoch.
    pub timestamp: i64,
    pub host: HostInfoStat,
    pub virtual_memory: Option<VirtualMemoryStat>,
    pub swap_memory: Option<SwapMemoryStat>,
    pub disk_partitions: Option<Vec<DiskPartition>>,
    pub disk_usage: Option<Vec<DiskUsageStat>>,
    pub disk_io_counters: Option<HashMap<String, DiskIOCounters>>,
    pub users: Option<Vec<UserStat>>,
    pub net_io_counters: Option<Vec<NetIOCountersStat>>,
    pub timing: CollectorTiming,
}

fn section<T>(name: &str, result: Result<T, CollectError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(CollectError::SourceUnavailable(source)) => {
            debug!(section = name, source = %source, "source not available here");
            None
        }
        Err(e) => {
            warn!(section = name, error = %e, "collection failed");
            None
        }
    }
}

fn micros_since(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}

/// Host statistics collector.
///
/// Holds the filesystem, kernel and command sources plus the configuration
/// and hands them to the per-area collectors on every call. No state is
/// kept between calls.
pub struct Collector<F: FileSystem, K: KernelSource, C: CommandRunner> {
    fs: F,
    kernel: K,
    runner: C,
    config: CollectorConfig,
}

impl Collector<RealFs, RealKernel, RealCommandRunner> {
    /// Collector over the live system.
    pub fn real(config: CollectorConfig) -> Self {
        Self::new(RealFs::new(), RealKernel::new(), RealCommandRunner::new(), config)
    }
}

impl<F: FileSystem, K: KernelSource, C: CommandRunner> Collector<F, K, C> {
    pub fn new(fs: F, kernel: K, runner: C, config: CollectorConfig) -> Self {
        Self {
            fs,
            kernel,
            runner,
            config,
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    fn disk(&self) -> DiskCollector<&F, &K> {
        DiskCollector::new(&self.fs, &self.kernel, self.config.clone())
    }

    fn memory(&self) -> MemoryCollector<&F> {
        MemoryCollector::new(&self.fs, self.config.clone())
    }

    fn host(&self) -> HostCollector<&F, &K, &C> {
        HostCollector::new(&self.fs, &self.kernel, &self.runner, self.config.clone())
    }

    fn net(&self) -> NetCollector<&F, &C> {
        NetCollector::new(&self.fs, &self.runner, self.config.clone())
    }

    pub fn disk_partitions(&self, all: bool) -> Result<Vec<DiskPartition>, CollectError> {
        self.disk().partitions(all)
    }

    pub fn disk_usage(&self) -> Result<Vec<DiskUsageStat>, CollectError> {
        self.disk().usage()
    }

    pub fn disk_io_counters(&self) -> Result<HashMap<String, DiskIOCounters>, CollectError> {
        self.disk().io_counters()
    }

    pub fn virtual_memory(&self) -> Result<VirtualMemoryStat, CollectError> {
        self.memory().virtual_memory()
    }

    pub fn swap_memory(&self) -> Result<SwapMemoryStat, CollectError> {
        self.memory().swap_memory()
    }

    pub fn boot_time(&self) -> Result<u64, CollectError> {
        self.host().boot_time()
    }

    pub fn users(&self) -> Result<Vec<UserStat>, CollectError> {
        self.host().users()
    }

    pub fn host_info(&self) -> HostInfoStat {
        self.host().info()
    }

    pub fn net_io_counters(&self, pernic: bool) -> Result<Vec<NetIOCountersStat>, CollectError> {
        self.net().io_counters(pernic)
    }

    /// Samples every area once. Never fails; see [`Snapshot`].
    pub fn snapshot(&self, all_partitions: bool, pernic: bool) -> Snapshot {
        let total_start = Instant::now();
        let mut timing = CollectorTiming::default();

        let start = Instant::now();
        let host = self.host_info();
        timing.host = micros_since(start);

        let start = Instant::now();
        let virtual_memory = section("virtual_memory", self.virtual_memory());
        let swap_memory = section("swap_memory", self.swap_memory());
        timing.memory = micros_since(start);

        let start = Instant::now();
        let disk_partitions = section("disk_partitions", self.disk_partitions(all_partitions));
        let disk_usage = section("disk_usage", self.disk_usage());
        let disk_io_counters = section("disk_io_counters", self.disk_io_counters());
        timing.disk = micros_since(start);

        let start = Instant::now();
        let users = section("users", self.users());
        timing.users = micros_since(start);

        let start = Instant::now();
        let net_io_counters = section("net_io_counters", self.net_io_counters(pernic));
        timing.net = micros_since(start);

        timing.total = micros_since(total_start);
        debug!(total_us = timing.total, "snapshot collected");

        Snapshot {
            timestamp: Utc::now().timestamp(),
            host,
            virtual_memory,
            swap_memory,
            disk_partitions,
            disk_usage,
            disk_io_counters,
            users,
            net_io_counters,
            timing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockCommandRunner, MockFs, MockKernel};
    use crate::collector::platform::Platform;

    type Mocked = Collector<MockFs, MockKernel, MockCommandRunner>;

    fn typical_linux() -> Mocked {
        Collector::new(
            MockFs::typical_linux(),
            MockKernel::new(),
            MockCommandRunner::typical_linux(),
            CollectorConfig::default().with_platform(Platform::Linux),
        )
    }

    fn typical_freebsd() -> Mocked {
        Collector::new(
            MockFs::typical_freebsd(),
            MockKernel::typical_freebsd(),
            MockCommandRunner::typical_freebsd(),
            CollectorConfig::default().with_platform(Platform::FreeBsd),
        )
    }

    #[test]
    fn test_linux_operations() {
        let c = typical_linux();
        assert_eq!(c.disk_partitions(false).unwrap().len(), 2);
        assert_eq!(c.disk_io_counters().unwrap().len(), 3);
        assert_eq!(c.virtual_memory().unwrap().total, 16_384_000_000);
        assert_eq!(c.swap_memory().unwrap().sin, 409_600);
        assert_eq!(c.boot_time().unwrap(), 1_700_000_000);
        assert_eq!(c.users().unwrap().len(), 2);
        assert_eq!(c.host_info().platform, "ubuntu");
        assert_eq!(c.net_io_counters(true).unwrap().len(), 2);
        assert!(matches!(
            c.disk_usage().unwrap_err(),
            CollectError::SourceUnavailable(_)
        ));
    }

    #[test]
    fn test_freebsd_operations() {
        let c = typical_freebsd();
        assert_eq!(c.disk_partitions(true).unwrap().len(), 3);
        assert_eq!(c.disk_usage().unwrap().len(), 3);
        assert_eq!(c.disk_io_counters().unwrap()["ada0"].read_time, 12_250);
        assert_eq!(c.virtual_memory().unwrap().free, 8_192_000_000);
        assert_eq!(c.boot_time().unwrap(), 1_700_000_000);
        assert_eq!(c.users().unwrap().len(), 2);
        assert_eq!(c.host_info().hostname, "bsdhost");
        assert_eq!(c.net_io_counters(false).unwrap()[0].name, "all");
    }

    #[test]
    fn test_snapshot_linux() {
        let snap = typical_linux().snapshot(false, true);
        assert_eq!(snap.host.hostname, "testhost");
        assert!(snap.virtual_memory.is_some());
        assert!(snap.swap_memory.is_some());
        assert_eq!(snap.disk_partitions.unwrap().len(), 2);
        assert!(snap.disk_usage.is_none());
        assert_eq!(snap.users.unwrap().len(), 2);
        assert_eq!(snap.net_io_counters.unwrap().len(), 2);
        assert!(snap.timestamp > 0);
    }

    #[test]
    fn test_snapshot_empty_system_is_partial() {
        let c = Collector::new(
            MockFs::new(),
            MockKernel::new(),
            MockCommandRunner::new(),
            CollectorConfig::default().with_platform(Platform::Linux),
        );
        let snap = c.snapshot(true, false);
        assert_eq!(snap.host.os, "linux");
        assert!(snap.virtual_memory.is_none());
        assert!(snap.disk_io_counters.is_none());
        assert!(snap.net_io_counters.is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let snap = typical_freebsd().snapshot(false, false);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["host"]["os"], "freebsd");
        assert_eq!(json["disk_partitions"].as_array().unwrap().len(), 2);
        assert_eq!(json["net_io_counters"][0]["name"], "all");
        assert!(json["timing"]["total"].is_u64());
    }

    #[test]
    fn test_shared_across_threads() {
        let c = typical_linux();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| c.virtual_memory())).collect();
            for h in handles {
                assert_eq!(h.join().unwrap().unwrap().total, 16_384_000_000);
            }
        });
    }
}
