//! Virtual and swap memory statistics.

use serde::{Deserialize, Serialize};

use super::percent;

/// Physical memory usage.
///
/// Source: `/proc/meminfo`. All values are bytes.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct VirtualMemoryStat {
    /// Source: `MemTotal`
    pub total: u64,
    /// Source: `MemFree`
    pub free: u64,
    /// Source: `Buffers`
    pub buffers: u64,
    /// Source: `Cached`
    pub cached: u64,
    /// Source: `Active`
    pub active: u64,
    /// Source: `Inactive`
    pub inactive: u64,
    /// `free + buffers + cached`
    pub available: u64,
    /// `total - free`
    pub used: u64,
    /// `(total - available) / total * 100`, 0 when `total` is 0.
    pub used_percent: f64,
}

impl VirtualMemoryStat {
    /// Builds the stat from raw counters and fills in the derived fields.
    pub fn from_counters(
        total: u64,
        free: u64,
        buffers: u64,
        cached: u64,
        active: u64,
        inactive: u64,
    ) -> Self {
        let available = free.saturating_add(buffers).saturating_add(cached);
        Self {
            total,
            free,
            buffers,
            cached,
            active,
            inactive,
            available,
            used: total.saturating_sub(free),
            used_percent: percent(total.saturating_sub(available), total),
        }
    }
}

/// Swap usage and paging activity.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct SwapMemoryStat {
    /// Source: `SwapTotal` in `/proc/meminfo`
    pub total: u64,
    /// Source: `SwapFree` in `/proc/meminfo`
    pub free: u64,
    pub used: u64,
    /// 0 when `total` is 0.
    pub used_percent: f64,
    /// Bytes swapped in since boot (`pswpin` pages).
    pub sin: u64,
    /// Bytes swapped out since boot (`pswpout` pages).
    pub sout: u64,
}

impl SwapMemoryStat {
    pub fn from_counters(total: u64, free: u64, sin: u64, sout: u64) -> Self {
        let used = total.saturating_sub(free);
        Self {
            total,
            free,
            used,
            used_percent: percent(used, total),
            sin,
            sout,
        }
    }
}
