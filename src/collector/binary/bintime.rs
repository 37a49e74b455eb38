//! Fixed-point `struct bintime` decoding.
//!
//! A bintime is a signed seconds count plus a 64-bit binary fraction of a
//! second, so one fraction unit is 2^-64 s.

use std::time::Duration;

/// Seconds per fraction unit (2^-64).
pub const BINTIME_SCALE: f64 = 1.0 / 18_446_744_073_709_551_616.0;

/// `struct bintime { time_t sec; uint64_t frac; }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bintime {
    pub sec: i64,
    pub frac: u64,
}

impl Bintime {
    pub fn new(sec: i64, frac: u64) -> Self {
        Self { sec, frac }
    }

    /// `sec + frac * 2^-64`, the kernel's `BT2LD` macro.
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.frac as f64 * BINTIME_SCALE
    }

    /// Exact conversion in 128-bit arithmetic. Negative seconds clamp to zero.
    pub fn as_duration(&self) -> Duration {
        let secs = u64::try_from(self.sec).unwrap_or(0);
        let nanos = ((u128::from(self.frac) * 1_000_000_000) >> 64) as u32;
        Duration::new(secs, nanos)
    }

    /// Whole milliseconds, saturating at `u64::MAX`.
    pub fn as_millis(&self) -> u64 {
        u64::try_from(self.as_duration().as_millis()).unwrap_or(u64::MAX)
    }
}
