//! Network interface counters.

use crate::collector::config::CollectorConfig;
use crate::collector::error::CollectError;
use crate::collector::netstat::parse_netstat_ibdn;
use crate::collector::platform::Platform;
use crate::collector::procfs::parser::parse_net_dev;
use crate::collector::source::{read_text, run_command};
use crate::collector::traits::{CommandRunner, FileSystem};
use crate::model::NetIOCountersStat;

/// Collects per-interface I/O counters.
pub struct NetCollector<F: FileSystem, C: CommandRunner> {
    fs: F,
    runner: C,
    config: CollectorConfig,
}

impl<F: FileSystem, C: CommandRunner> NetCollector<F, C> {
    pub fn new(fs: F, runner: C, config: CollectorConfig) -> Self {
        Self { fs, runner, config }
    }

    /// One row per interface, or a single `all` row when `pernic` is false.
    pub fn io_counters(&self, pernic: bool) -> Result<Vec<NetIOCountersStat>, CollectError> {
        let rows: Vec<NetIOCountersStat> = match self.config.platform {
            Platform::FreeBsd => {
                let out = run_command(&self.runner, &self.config.netstat_path, &["-ibdn"])?;
                parse_netstat_ibdn(&out)?
            }
            Platform::Linux => {
                let content = read_text(&self.fs, &self.config.proc("net/dev"))?;
                parse_net_dev(&content)?
                    .into_iter()
                    .map(|d| NetIOCountersStat {
                        name: d.interface,
                        bytes_sent: d.tx_bytes,
                        bytes_recv: d.rx_bytes,
                        packets_sent: d.tx_packets,
                        packets_recv: d.rx_packets,
                        errin: d.rx_errs,
                        errout: d.tx_errs,
                        dropin: d.rx_drop,
                        dropout: d.tx_drop,
                    })
                    .collect()
            }
        };

        if pernic {
            Ok(rows)
        } else {
            Ok(vec![NetIOCountersStat::aggregate(&rows)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockCommandRunner, MockFs};

    fn freebsd(runner: MockCommandRunner) -> NetCollector<MockFs, MockCommandRunner> {
        NetCollector::new(
            MockFs::new(),
            runner,
            CollectorConfig::default().with_platform(Platform::FreeBsd),
        )
    }

    fn linux(fs: MockFs) -> NetCollector<MockFs, MockCommandRunner> {
        NetCollector::new(
            fs,
            MockCommandRunner::new(),
            CollectorConfig::default().with_platform(Platform::Linux),
        )
    }

    #[test]
    fn test_freebsd_pernic() {
        let rows = freebsd(MockCommandRunner::typical_freebsd())
            .io_counters(true)
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["em0", "lo0"]);
        assert_eq!(rows[0].bytes_recv, 9876543);
        assert_eq!(rows[0].bytes_sent, 543210);
        assert_eq!(rows[1].packets_recv, 100);
    }

    #[test]
    fn test_freebsd_aggregate() {
        let rows = freebsd(MockCommandRunner::typical_freebsd())
            .io_counters(false)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "all");
        assert_eq!(rows[0].packets_recv, 12345 + 100);
        assert_eq!(rows[0].bytes_sent, 543210 + 5000);
    }

    #[test]
    fn test_freebsd_netstat_failure() {
        let mut runner = MockCommandRunner::new();
        runner.add_failure("/usr/bin/netstat", &["-ibdn"]);
        let err = freebsd(runner).io_counters(true).unwrap_err();
        assert!(matches!(err, CollectError::QueryFailed { .. }));
    }

    #[test]
    fn test_freebsd_netstat_missing() {
        let err = freebsd(MockCommandRunner::new()).io_counters(true).unwrap_err();
        assert!(matches!(err, CollectError::SourceUnavailable(_)));
    }

    #[test]
    fn test_linux_pernic() {
        let rows = linux(MockFs::typical_linux()).io_counters(true).unwrap();
        assert_eq!(rows.len(), 2);
        let eth0 = rows.iter().find(|r| r.name == "eth0").unwrap();
        assert_eq!(eth0.bytes_recv, 987654321);
        assert_eq!(eth0.packets_recv, 654321);
        assert_eq!(eth0.errin, 1);
        assert_eq!(eth0.dropin, 2);
        assert_eq!(eth0.bytes_sent, 123456789);
        assert_eq!(eth0.packets_sent, 123456);
        assert_eq!(eth0.errout, 3);
        assert_eq!(eth0.dropout, 4);
    }

    #[test]
    fn test_linux_aggregate() {
        let rows = linux(MockFs::typical_linux()).io_counters(false).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bytes_recv, 987654321 + 1234567);
    }

    #[test]
    fn test_aggregate_of_nothing() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/net/dev", "Inter-|   Receive\n face |bytes\n");
        let rows = linux(fs).io_counters(false).unwrap();
        assert_eq!(rows, vec![NetIOCountersStat::aggregate(&[])]);
    }
}
