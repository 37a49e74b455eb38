//! Mock sources for testing collectors without a live kernel.
//!
//! `MockFs`, `MockKernel` and `MockCommandRunner` stand in for the three
//! collaborator traits. `records` builds byte-exact kernel records and
//! `scenarios` assembles typical Linux and FreeBSD hosts from them.

mod command;
mod filesystem;
mod kernel;
pub mod records;
mod scenarios;

pub use command::MockCommandRunner;
pub use filesystem::MockFs;
pub use kernel::MockKernel;
