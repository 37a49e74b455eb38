//! Host identification and login sessions.

use serde::{Deserialize, Serialize};

/// Host identification, filled best-effort.
///
/// Any field whose sub-query failed keeps its default (empty string or 0).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct HostInfoStat {
    /// Operating system family, e.g. `linux` or `freebsd`.
    pub os: String,
    pub hostname: String,
    /// Distribution or kernel name, e.g. `ubuntu` or `freebsd`.
    pub platform: String,
    /// Distribution family, e.g. `debian` or `rhel`.
    pub platform_family: String,
    pub platform_version: String,
    /// Boot time in seconds since the epoch.
    pub boot_time: u64,
    /// Seconds since boot.
    pub uptime: u64,
    /// e.g. `docker`, `kvm`, `xen`.
    pub virtualization_system: String,
    /// `guest` or `host`.
    pub virtualization_role: String,
}

/// One logged-in session.
///
/// Source: a login-session (`utmp`) record.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct UserStat {
    pub user: String,
    /// Terminal line, e.g. `pts/0` or `ttyv0`.
    pub terminal: String,
    /// Remote host, empty for local logins.
    pub host: String,
    /// Session start time in seconds since the epoch.
    pub started: i64,
}
