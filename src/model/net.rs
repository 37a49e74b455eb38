//! Network interface counters.

use serde::{Deserialize, Serialize};

/// Cumulative I/O counters for one interface, or for all of them.
///
/// Source: `netstat -ibdn` on FreeBSD, `/proc/net/dev` on Linux.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct NetIOCountersStat {
    /// Interface name, or `all` for the aggregate row.
    pub name: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    /// Receive errors.
    pub errin: u64,
    /// Transmit errors.
    pub errout: u64,
    /// Dropped incoming packets.
    pub dropin: u64,
    /// Dropped outgoing packets.
    pub dropout: u64,
}

impl NetIOCountersStat {
    /// Sums per-interface rows into a single row named `all`. Sums saturate.
    pub fn aggregate(rows: &[NetIOCountersStat]) -> Self {
        rows.iter().fold(
            NetIOCountersStat {
                name: "all".to_string(),
                ..Default::default()
            },
            |mut acc, n| {
                acc.bytes_sent = acc.bytes_sent.saturating_add(n.bytes_sent);
                acc.bytes_recv = acc.bytes_recv.saturating_add(n.bytes_recv);
                acc.packets_sent = acc.packets_sent.saturating_add(n.packets_sent);
                acc.packets_recv = acc.packets_recv.saturating_add(n.packets_recv);
                acc.errin = acc.errin.saturating_add(n.errin);
                acc.errout = acc.errout.saturating_add(n.errout);
                acc.dropin = acc.dropin.saturating_add(n.dropin);
                acc.dropout = acc.dropout.saturating_add(n.dropout);
                acc
            },
        )
    }
}
