//! Abstractions over the raw data sources to enable testing and mocking.
//!
//! Collectors read from three collaborators: the filesystem (`/proc` text
//! files and binary files such as `utmp`), the kernel control interface
//! (sysctl and the mount table) and external commands. Each has a real
//! implementation and a mock in [`crate::collector::mock`].

use std::io;
use std::path::Path;
use std::process::Command;

/// Abstraction for filesystem operations.
///
/// This trait allows collectors to read from the real filesystem or from
/// a mock implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Reads the entire contents of a file as raw bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Kernel control interface.
///
/// Both calls return the raw buffer exactly as the kernel wrote it; decoding
/// happens in [`crate::collector::binary`].
pub trait KernelSource: Send + Sync {
    /// Queries a sysctl node by its numeric MIB path.
    fn sysctl(&self, mib: &[i32]) -> io::Result<Vec<u8>>;

    /// Returns the `getfsstat(2)` buffer: one `statfs` record per mount.
    fn mount_table(&self) -> io::Result<Vec<u8>>;
}

impl<T: KernelSource + ?Sized> KernelSource for &T {
    fn sysctl(&self, mib: &[i32]) -> io::Result<Vec<u8>> {
        (**self).sysctl(mib)
    }

    fn mount_table(&self) -> io::Result<Vec<u8>> {
        (**self).mount_table()
    }
}

/// Real kernel interface. Only FreeBSD exposes the binary records we decode;
/// every other target reports `Unsupported`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealKernel;

impl RealKernel {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "freebsd")]
impl KernelSource for RealKernel {
    fn sysctl(&self, mib: &[i32]) -> io::Result<Vec<u8>> {
        let mut len: libc::size_t = 0;
        // SAFETY: a null output buffer asks the kernel for the required length only.
        let rc = unsafe {
            libc::sysctl(
                mib.as_ptr(),
                mib.len() as libc::c_uint,
                std::ptr::null_mut(),
                &mut len,
                std::ptr::null(),
                0,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut buf = vec![0u8; len];
        // SAFETY: `buf` has exactly `len` writable bytes and `len` is updated to the bytes written.
        let rc = unsafe {
            libc::sysctl(
                mib.as_ptr(),
                mib.len() as libc::c_uint,
                buf.as_mut_ptr().cast(),
                &mut len,
                std::ptr::null(),
                0,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        buf.truncate(len);
        Ok(buf)
    }

    fn mount_table(&self) -> io::Result<Vec<u8>> {
        // SAFETY: a null buffer makes getfsstat return the number of mounts.
        let count = unsafe { libc::getfsstat(std::ptr::null_mut(), 0, libc::MNT_WAIT) };
        if count < 0 {
            return Err(io::Error::last_os_error());
        }

        let record = std::mem::size_of::<libc::statfs>();
        let mut records: Vec<libc::statfs> = Vec::with_capacity(count as usize);
        let bufsize = (record * count as usize) as libc::c_long;
        // SAFETY: `records` has capacity for `count` entries; the kernel writes at most `bufsize` bytes.
        let filled = unsafe { libc::getfsstat(records.as_mut_ptr(), bufsize, libc::MNT_WAIT) };
        if filled < 0 {
            return Err(io::Error::last_os_error());
        }
        let filled = (filled as usize).min(count as usize);

        // SAFETY: the first `filled` records were initialized by the kernel.
        let bytes = unsafe {
            std::slice::from_raw_parts(records.as_ptr().cast::<u8>(), filled * record)
        };
        Ok(bytes.to_vec())
    }
}

#[cfg(not(target_os = "freebsd"))]
impl KernelSource for RealKernel {
    fn sysctl(&self, mib: &[i32]) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("sysctl {:?} is not supported on this platform", mib),
        ))
    }

    fn mount_table(&self) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "getfsstat is not supported on this platform",
        ))
    }
}

/// Captured result of an external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// `true` if the process exited with status 0.
    pub success: bool,
    pub stdout: String,
}

/// Runs external commands and captures their standard output.
///
/// Timeouts are the runner's concern; collectors call it once per query.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        (**self).run(program, args)
    }
}

/// Runs commands with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for RealCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
