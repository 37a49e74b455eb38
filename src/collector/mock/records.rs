//! Byte-exact builders for kernel records.
//!
//! Offsets are written out by hand from the C headers rather than read back
//! from the layout tables, so decoding tests catch a wrong table.

use crate::collector::binary::Bintime;

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn put_str(buf: &mut [u8], offset: usize, width: usize, s: &str) {
    let n = s.len().min(width);
    put(buf, offset, &s.as_bytes()[..n]);
}

/// Builds one FreeBSD amd64 `struct devstat`.
#[derive(Debug, Clone, Default)]
pub struct DevstatBuilder {
    name: String,
    unit: i32,
    bytes: [u64; 2],
    operations: [u64; 2],
    durations: [Bintime; 2],
}

impl DevstatBuilder {
    pub fn new(name: &str, unit: i32) -> Self {
        Self {
            name: name.to_string(),
            unit,
            ..Default::default()
        }
    }

    pub fn bytes(mut self, read: u64, write: u64) -> Self {
        self.bytes = [read, write];
        self
    }

    pub fn operations(mut self, read: u64, write: u64) -> Self {
        self.operations = [read, write];
        self
    }

    pub fn durations(mut self, read: Bintime, write: Bintime) -> Self {
        self.durations = [read, write];
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 288];
        // sequence0 / allocated: unrelated noise that must not leak into fields
        put(&mut buf, 0, &0xffff_ffffu32.to_le_bytes());
        put(&mut buf, 40, &0x1234u32.to_le_bytes());
        put_str(&mut buf, 44, 16, &self.name);
        put(&mut buf, 60, &self.unit.to_le_bytes());
        // bytes[DEVSTAT_NO_DATA] holds garbage in real dumps too
        put(&mut buf, 64, &u64::MAX.to_le_bytes());
        put(&mut buf, 72, &self.bytes[0].to_le_bytes());
        put(&mut buf, 80, &self.bytes[1].to_le_bytes());
        put(&mut buf, 104, &self.operations[0].to_le_bytes());
        put(&mut buf, 112, &self.operations[1].to_le_bytes());
        for (slot, bt) in [(144, self.durations[0]), (160, self.durations[1])] {
            put(&mut buf, slot, &bt.sec.to_le_bytes());
            put(&mut buf, slot + 8, &bt.frac.to_le_bytes());
        }
        put(&mut buf, 224, &512u32.to_le_bytes());
        buf
    }
}

/// `kern.devstat.all` dump: 8-byte generation header followed by records.
pub fn devstat_dump(devices: &[DevstatBuilder]) -> Vec<u8> {
    let mut buf = 42i64.to_le_bytes().to_vec();
    for d in devices {
        buf.extend(d.build());
    }
    buf
}

/// Builds one FreeBSD amd64 `struct statfs`.
#[derive(Debug, Clone, Default)]
pub struct StatfsBuilder {
    from: String,
    on: String,
    fstype: String,
    flags: u64,
    bsize: u64,
    blocks: u64,
    bfree: u64,
    bavail: i64,
    files: u64,
    ffree: i64,
}

impl StatfsBuilder {
    pub fn new(from: &str, on: &str, fstype: &str) -> Self {
        Self {
            from: from.to_string(),
            on: on.to_string(),
            fstype: fstype.to_string(),
            ..Default::default()
        }
    }

    pub fn flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }

    pub fn blocks(mut self, bsize: u64, blocks: u64, bfree: u64, bavail: i64) -> Self {
        self.bsize = bsize;
        self.blocks = blocks;
        self.bfree = bfree;
        self.bavail = bavail;
        self
    }

    pub fn files(mut self, files: u64, ffree: i64) -> Self {
        self.files = files;
        self.ffree = ffree;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 2344];
        put(&mut buf, 0, &0x2014_0518u32.to_le_bytes());
        put(&mut buf, 8, &self.flags.to_le_bytes());
        put(&mut buf, 16, &self.bsize.to_le_bytes());
        put(&mut buf, 24, &65536u64.to_le_bytes());
        put(&mut buf, 32, &self.blocks.to_le_bytes());
        put(&mut buf, 40, &self.bfree.to_le_bytes());
        put(&mut buf, 48, &self.bavail.to_le_bytes());
        put(&mut buf, 56, &self.files.to_le_bytes());
        put(&mut buf, 64, &self.ffree.to_le_bytes());
        put(&mut buf, 184, &255u32.to_le_bytes());
        put_str(&mut buf, 280, 16, &self.fstype);
        put_str(&mut buf, 296, 1024, &self.from);
        put_str(&mut buf, 1320, 1024, &self.on);
        buf
    }
}

/// Legacy BSD `struct utmp` (44 bytes).
pub fn bsd_utmp(user: &str, line: &str, host: &str, time: i32) -> Vec<u8> {
    let mut buf = vec![0u8; 44];
    put_str(&mut buf, 0, 8, line);
    put_str(&mut buf, 8, 16, user);
    put_str(&mut buf, 24, 16, host);
    put(&mut buf, 40, &time.to_le_bytes());
    buf
}

/// glibc x86_64 `struct utmp` (384 bytes).
pub fn glibc_utmp(ut_type: i16, user: &str, line: &str, host: &str, time: i32) -> Vec<u8> {
    let mut buf = vec![0u8; 384];
    put(&mut buf, 0, &ut_type.to_le_bytes());
    put(&mut buf, 4, &1234i32.to_le_bytes());
    put_str(&mut buf, 8, 32, line);
    put_str(&mut buf, 40, 4, "ts/0");
    put_str(&mut buf, 44, 32, user);
    put_str(&mut buf, 76, 256, host);
    put(&mut buf, 340, &time.to_le_bytes());
    put(&mut buf, 344, &250_000i32.to_le_bytes());
    buf
}

/// FreeBSD amd64 `struct timeval` (16 bytes).
pub fn timeval(sec: i64, usec: i64) -> Vec<u8> {
    let mut buf = sec.to_le_bytes().to_vec();
    buf.extend_from_slice(&usec.to_le_bytes());
    buf
}
