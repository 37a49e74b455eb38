//! Public stat types.
//!
//! Every type here is a read-only value snapshot produced by one sampling
//! call. Nothing references anything else and nothing is cached.

mod disk;
mod host;
mod memory;
mod net;

pub use disk::{DiskIOCounters, DiskPartition, DiskUsageStat};
pub use host::{HostInfoStat, UserStat};
pub use memory::{SwapMemoryStat, VirtualMemoryStat};
pub use net::NetIOCountersStat;

/// Percentage of `part` in `total`, or 0 when `total` is zero.
pub(crate) fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}
