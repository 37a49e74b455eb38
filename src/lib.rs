//! hoststat - host resource counters library.
//!
//! Reads disk, memory, network, login-session and boot-time counters from
//! kernel control interfaces, `/proc` text files and fixed-layout binary
//! records, and normalizes them into platform-independent stats.
//!
//! - `collector`: raw sources, binary/text decoders and stat collectors
//! - `model`: serializable stat types returned to callers

pub mod collector;
pub mod model;

pub use collector::{CollectError, Collector, CollectorConfig, Platform};
