//! Build-time platform selection.

use serde::{Deserialize, Serialize};

use crate::collector::binary::RecordLayout;
use crate::collector::binary::layouts::{BSD_UTMP, LINUX_GLIBC_UTMP};

/// Operating system family whose data sources a collector reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Linux,
    FreeBsd,
}

impl Platform {
    /// The platform this crate was compiled for.
    pub const fn native() -> Self {
        if cfg!(target_os = "freebsd") {
            Platform::FreeBsd
        } else {
            Platform::Linux
        }
    }

    /// Lower-case OS family name, as reported in `HostInfoStat::os`.
    pub fn os_name(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::FreeBsd => "freebsd",
        }
    }

    /// `utmp` record layout written by this platform's login tools.
    pub fn utmp_layout(self) -> &'static RecordLayout {
        match self {
            Platform::Linux => &LINUX_GLIBC_UTMP,
            Platform::FreeBsd => &BSD_UTMP,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::native()
    }
}
