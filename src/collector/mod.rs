//! Host statistics collection.
//!
//! Sources are read through three traits ([`FileSystem`], [`KernelSource`],
//! [`CommandRunner`]) so every collector runs against mocks in tests.
//!
//! ```text
//! traits / source  ->  binary (records, flags, bintime)   ->  disk, host   ->  Collector
//!                  ->  procfs::parser, netstat (text)     ->  memory, net  ->
//! ```
//!
//! Every call is a fresh read. Nothing is cached and nothing is retried.

pub mod binary;
#[allow(clippy::module_inception)]
mod collector;
pub mod config;
pub mod disk;
pub mod error;
pub mod host;
pub mod memory;
pub mod mock;
pub mod net;
pub mod netstat;
pub mod platform;
pub mod procfs;
pub mod source;
pub mod traits;

pub use collector::{Collector, CollectorTiming, Snapshot};
pub use config::CollectorConfig;
pub use error::CollectError;
pub use platform::Platform;
pub use traits::{
    CommandOutput, CommandRunner, FileSystem, KernelSource, RealCommandRunner, RealFs, RealKernel,
};
