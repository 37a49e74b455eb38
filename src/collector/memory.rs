//! Virtual and swap memory from `/proc/meminfo` and `/proc/vmstat`.

use tracing::debug;

use crate::collector::config::CollectorConfig;
use crate::collector::error::CollectError;
use crate::collector::procfs::parser::{parse_meminfo, parse_vmstat};
use crate::collector::source::read_text;
use crate::collector::traits::FileSystem;
use crate::model::{SwapMemoryStat, VirtualMemoryStat};

/// Multiplier applied to `kB` values of `/proc/meminfo`. Products saturate at `u64::MAX`.
const KB: u64 = 1000;

/// Collects memory statistics.
pub struct MemoryCollector<F: FileSystem> {
    fs: F,
    config: CollectorConfig,
}

impl<F: FileSystem> MemoryCollector<F> {
    pub fn new(fs: F, config: CollectorConfig) -> Self {
        Self { fs, config }
    }

    /// Reads `/proc/meminfo`. Any malformed recognized field fails the call.
    pub fn virtual_memory(&self) -> Result<VirtualMemoryStat, CollectError> {
        let content = read_text(&self.fs, &self.config.proc("meminfo"))?;
        let info = parse_meminfo(&content)?;

        Ok(VirtualMemoryStat::from_counters(
            info.mem_total.saturating_mul(KB),
            info.mem_free.saturating_mul(KB),
            info.buffers.saturating_mul(KB),
            info.cached.saturating_mul(KB),
            info.active.saturating_mul(KB),
            info.inactive.saturating_mul(KB),
        ))
    }

    /// Swap totals from `/proc/meminfo` plus paging counters from `/proc/vmstat`.
    ///
    /// `vmstat` is optional: without it `sin`/`sout` stay 0.
    pub fn swap_memory(&self) -> Result<SwapMemoryStat, CollectError> {
        let content = read_text(&self.fs, &self.config.proc("meminfo"))?;
        let info = parse_meminfo(&content)?;

        let (sin, sout) = match read_text(&self.fs, &self.config.proc("vmstat")) {
            Ok(content) => {
                let vm = parse_vmstat(&content)?;
                (
                    vm.pswpin.saturating_mul(self.config.page_size),
                    vm.pswpout.saturating_mul(self.config.page_size),
                )
            }
            Err(e) => {
                debug!(error = %e, "vmstat unavailable, swap in/out left at 0");
                (0, 0)
            }
        };

        Ok(SwapMemoryStat::from_counters(
            info.swap_total.saturating_mul(KB),
            info.swap_free.saturating_mul(KB),
            sin,
            sout,
        ))
    }
}
