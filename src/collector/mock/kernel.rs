//! Mock kernel control interface.

use crate::collector::traits::KernelSource;
use std::collections::HashMap;
use std::io;

/// Serves canned sysctl buffers and a canned mount table.
#[derive(Debug, Clone, Default)]
pub struct MockKernel {
    sysctls: HashMap<Vec<i32>, Vec<u8>>,
    errors: HashMap<Vec<i32>, io::ErrorKind>,
    mount_table: Option<Vec<u8>>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sysctl(&mut self, mib: &[i32], value: Vec<u8>) {
        self.sysctls.insert(mib.to_vec(), value);
    }

    /// Makes the node fail with `kind`.
    pub fn fail_sysctl(&mut self, mib: &[i32], kind: io::ErrorKind) {
        self.errors.insert(mib.to_vec(), kind);
    }

    pub fn set_mount_table(&mut self, value: Vec<u8>) {
        self.mount_table = Some(value);
    }
}

impl KernelSource for MockKernel {
    fn sysctl(&self, mib: &[i32]) -> io::Result<Vec<u8>> {
        if let Some(kind) = self.errors.get(mib) {
            return Err(io::Error::new(*kind, format!("mock sysctl failure: {:?}", mib)));
        }
        self.sysctls.get(mib).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no sysctl node {:?}", mib))
        })
    }

    fn mount_table(&self) -> io::Result<Vec<u8>> {
        self.mount_table
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Unsupported, "no mount table"))
    }
}
