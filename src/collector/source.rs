//! Raw-source adapter.
//!
//! Thin wrappers that read one source through the collaborator traits and
//! map failures onto [`CollectError`]. Nothing here retries or caches.

use std::path::Path;

use tracing::trace;

use crate::collector::error::CollectError;
use crate::collector::traits::{CommandRunner, FileSystem, KernelSource};

/// Reads a text pseudo-file.
pub fn read_text<F: FileSystem>(fs: &F, path: &Path) -> Result<String, CollectError> {
    let content = fs
        .read_to_string(path)
        .map_err(|e| CollectError::from_io(path.display().to_string(), e))?;
    trace!(path = %path.display(), lines = content.lines().count(), "read text source");
    Ok(content)
}

/// Reads a binary file such as `utmp`.
pub fn read_binary<F: FileSystem>(fs: &F, path: &Path) -> Result<Vec<u8>, CollectError> {
    let bytes = fs
        .read(path)
        .map_err(|e| CollectError::from_io(path.display().to_string(), e))?;
    trace!(path = %path.display(), bytes = bytes.len(), "read binary source");
    Ok(bytes)
}

/// Queries a sysctl node; `name` is only used in errors and logs.
pub fn read_sysctl<K: KernelSource>(
    kernel: &K,
    name: &str,
    mib: &[i32],
) -> Result<Vec<u8>, CollectError> {
    let bytes = kernel
        .sysctl(mib)
        .map_err(|e| CollectError::from_io(name, e))?;
    trace!(sysctl = name, bytes = bytes.len(), "read sysctl");
    Ok(bytes)
}

/// Reads the raw mount table.
pub fn read_mount_table<K: KernelSource>(kernel: &K) -> Result<Vec<u8>, CollectError> {
    let bytes = kernel
        .mount_table()
        .map_err(|e| CollectError::from_io("getfsstat", e))?;
    trace!(bytes = bytes.len(), "read mount table");
    Ok(bytes)
}

/// Runs a command and returns its stdout.
///
/// A non-zero exit or blank output is a `QueryFailed`.
pub fn run_command<C: CommandRunner>(
    runner: &C,
    program: &str,
    args: &[&str],
) -> Result<String, CollectError> {
    let name = if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    };
    let output = runner
        .run(program, args)
        .map_err(|e| CollectError::from_io(name.clone(), e))?;
    if !output.success {
        return Err(CollectError::query_failed(name, "non-zero exit status"));
    }
    if output.stdout.trim().is_empty() {
        return Err(CollectError::query_failed(name, "empty output"));
    }
    trace!(command = %name, lines = output.stdout.lines().count(), "ran command");
    Ok(output.stdout)
}
