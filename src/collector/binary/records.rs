//! Typed views of decoded kernel records.

use tracing::debug;

use super::bintime::Bintime;
use super::layout::{DecodeError, RawRecord, RecordLayout, decode_records};

/// Conversion from a layout-described record into a typed struct.
pub trait FromRecord: Sized {
    fn from_record(record: &RawRecord<'_>) -> Result<Self, DecodeError>;
}

/// Decodes every record of a dump.
///
/// A header or size failure aborts with an error. A record whose fields fail
/// to decode is dropped and logged, so one corrupt entry does not hide the rest.
pub fn decode_each<T: FromRecord>(
    buffer: &[u8],
    layout: &'static RecordLayout,
) -> Result<Vec<T>, DecodeError> {
    let records = decode_records(buffer, layout)?;
    let mut out = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match T::from_record(record) {
            Ok(value) => out.push(value),
            Err(e) => debug!(layout = layout.name, index, error = %e, "skipping record"),
        }
    }
    Ok(out)
}

/// Per-device statistics (`struct devstat`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Devstat {
    pub device_name: String,
    pub unit_number: i64,
    pub bytes_read: u64,
    pub bytes_write: u64,
    pub operations_read: u64,
    pub operations_write: u64,
    pub duration_read: Bintime,
    pub duration_write: Bintime,
}

impl Devstat {
    /// Device name with unit number appended, e.g. `ada0`.
    pub fn name(&self) -> String {
        format!("{}{}", self.device_name, self.unit_number)
    }
}

impl FromRecord for Devstat {
    fn from_record(r: &RawRecord<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            device_name: r.cstring("device_name")?,
            unit_number: r.signed("unit_number")?,
            bytes_read: r.unsigned("bytes_read")?,
            bytes_write: r.unsigned("bytes_write")?,
            operations_read: r.unsigned("operations_read")?,
            operations_write: r.unsigned("operations_write")?,
            duration_read: r.bintime("duration_read")?,
            duration_write: r.bintime("duration_write")?,
        })
    }
}

/// Filesystem status (`struct statfs`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statfs {
    pub flags: u64,
    pub bsize: u64,
    pub blocks: u64,
    pub bfree: u64,
    /// Signed: may go negative when root reserve is in use.
    pub bavail: i64,
    pub files: u64,
    pub ffree: i64,
    pub fstypename: String,
    pub mntfromname: String,
    pub mntonname: String,
}

impl FromRecord for Statfs {
    fn from_record(r: &RawRecord<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            flags: r.unsigned("flags")?,
            bsize: r.unsigned("bsize")?,
            blocks: r.unsigned("blocks")?,
            bfree: r.unsigned("bfree")?,
            bavail: r.signed("bavail")?,
            files: r.unsigned("files")?,
            ffree: r.signed("ffree")?,
            fstypename: r.cstring("fstypename")?,
            mntfromname: r.cstring("mntfromname")?,
            mntonname: r.cstring("mntonname")?,
        })
    }
}

/// Login session record (`struct utmp`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Utmp {
    /// `ut_type` where the layout has one.
    pub record_type: Option<i64>,
    pub line: String,
    pub user: String,
    pub host: String,
    /// Session start, seconds since the epoch. Zero marks an empty slot.
    pub time: i64,
}

impl FromRecord for Utmp {
    fn from_record(r: &RawRecord<'_>) -> Result<Self, DecodeError> {
        let record_type = if r.layout().has_field("type") {
            Some(r.signed("type")?)
        } else {
            None
        };
        Ok(Self {
            record_type,
            line: r.cstring("line")?,
            user: r.cstring("user")?,
            host: r.cstring("host")?,
            time: r.signed("time")?,
        })
    }
}

/// `struct timeval`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeval {
    pub sec: i64,
    pub usec: i64,
}

impl FromRecord for Timeval {
    fn from_record(r: &RawRecord<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            sec: r.signed("sec")?,
            usec: r.signed("usec")?,
        })
    }
}
