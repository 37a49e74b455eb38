//! Collector configuration: which platform to decode for and where its
//! sources live.

use std::path::{Path, PathBuf};

use crate::collector::platform::Platform;

/// Paths and platform used by every collector.
///
/// Defaults match a stock host; tests and chroots override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub platform: Platform,
    /// Base path of the proc filesystem.
    pub proc_path: PathBuf,
    /// Root for files such as `/etc/os-release` and container markers.
    pub root_path: PathBuf,
    /// Login-session record file.
    pub utmp_path: PathBuf,
    /// BSD netstat binary.
    pub netstat_path: String,
    /// Page size used to convert swap page counters to bytes.
    pub page_size: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            platform: Platform::native(),
            proc_path: PathBuf::from("/proc"),
            root_path: PathBuf::from("/"),
            utmp_path: PathBuf::from("/var/run/utmp"),
            netstat_path: "/usr/bin/netstat".to_string(),
            page_size: 4096,
        }
    }
}

impl CollectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_proc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.proc_path = path.into();
        self
    }

    pub fn with_root_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_path = path.into();
        self
    }

    pub fn with_utmp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.utmp_path = path.into();
        self
    }

    pub fn with_netstat_path(mut self, path: impl Into<String>) -> Self {
        self.netstat_path = path.into();
        self
    }

    /// Path of a file under the proc filesystem, e.g. `proc("meminfo")`.
    pub fn proc(&self, name: &str) -> PathBuf {
        self.proc_path.join(name)
    }

    /// Path of a file under the root, e.g. `root("etc/os-release")`.
    pub fn root(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root_path.join(relative)
    }
}
