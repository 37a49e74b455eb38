//! Native record layouts, pinned per platform and architecture.
//!
//! Offsets include the compiler's implicit padding. They are only valid for
//! the named ABI; a new target needs its own table.

use super::layout::{ByteOrder, Encoding, FieldSpec, RecordLayout};

/// Index of the read slot in `devstat` per-transaction arrays (`DEVSTAT_READ`).
const DEVSTAT_READ: usize = 1;
/// `DEVSTAT_WRITE`
const DEVSTAT_WRITE: usize = 2;

const DEVSTAT_BYTES: usize = 64;
const DEVSTAT_OPERATIONS: usize = 96;
const DEVSTAT_DURATION: usize = 128;

/// FreeBSD amd64 `struct devstat` (`DEVSTAT_VERSION` 6), 288 bytes.
///
/// `kern.devstat.all` prefixes the array with a `long` generation counter.
pub static FREEBSD_AMD64_DEVSTAT: RecordLayout = RecordLayout {
    name: "devstat",
    size: 288,
    header_len: 8,
    byte_order: ByteOrder::Little,
    fields: &[
        FieldSpec::new("device_number", 40, 4, Encoding::Unsigned),
        FieldSpec::new("device_name", 44, 16, Encoding::CString),
        FieldSpec::new("unit_number", 60, 4, Encoding::Signed),
        FieldSpec::new("bytes_read", DEVSTAT_BYTES + 8 * DEVSTAT_READ, 8, Encoding::Unsigned),
        FieldSpec::new("bytes_write", DEVSTAT_BYTES + 8 * DEVSTAT_WRITE, 8, Encoding::Unsigned),
        FieldSpec::new(
            "operations_read",
            DEVSTAT_OPERATIONS + 8 * DEVSTAT_READ,
            8,
            Encoding::Unsigned,
        ),
        FieldSpec::new(
            "operations_write",
            DEVSTAT_OPERATIONS + 8 * DEVSTAT_WRITE,
            8,
            Encoding::Unsigned,
        ),
        FieldSpec::new(
            "duration_read",
            DEVSTAT_DURATION + 16 * DEVSTAT_READ,
            16,
            Encoding::Bintime,
        ),
        FieldSpec::new(
            "duration_write",
            DEVSTAT_DURATION + 16 * DEVSTAT_WRITE,
            16,
            Encoding::Bintime,
        ),
        FieldSpec::new("block_size", 224, 4, Encoding::Unsigned),
    ],
};

/// FreeBSD amd64 `struct statfs` (`STATFS_VERSION` 0x20140518), 2344 bytes.
pub static FREEBSD_AMD64_STATFS: RecordLayout = RecordLayout {
    name: "statfs",
    size: 2344,
    header_len: 0,
    byte_order: ByteOrder::Little,
    fields: &[
        FieldSpec::new("version", 0, 4, Encoding::Unsigned),
        FieldSpec::new("flags", 8, 8, Encoding::Unsigned),
        FieldSpec::new("bsize", 16, 8, Encoding::Unsigned),
        FieldSpec::new("blocks", 32, 8, Encoding::Unsigned),
        FieldSpec::new("bfree", 40, 8, Encoding::Unsigned),
        FieldSpec::new("bavail", 48, 8, Encoding::Signed),
        FieldSpec::new("files", 56, 8, Encoding::Unsigned),
        FieldSpec::new("ffree", 64, 8, Encoding::Signed),
        FieldSpec::new("fstypename", 280, 16, Encoding::CString),
        FieldSpec::new("mntfromname", 296, 1024, Encoding::CString),
        FieldSpec::new("mntonname", 1320, 1024, Encoding::CString),
    ],
};

/// FreeBSD amd64 `struct timeval` as returned by `kern.boottime`.
pub static FREEBSD_AMD64_TIMEVAL: RecordLayout = RecordLayout {
    name: "timeval",
    size: 16,
    header_len: 0,
    byte_order: ByteOrder::Little,
    fields: &[
        FieldSpec::new("sec", 0, 8, Encoding::Signed),
        FieldSpec::new("usec", 8, 8, Encoding::Signed),
    ],
};

/// Legacy BSD `struct utmp` (`<utmp.h>` before utmpx), 44 bytes.
///
/// No record type field: every record with a non-zero time is a session.
pub static BSD_UTMP: RecordLayout = RecordLayout {
    name: "utmp",
    size: 44,
    header_len: 0,
    byte_order: ByteOrder::Little,
    fields: &[
        FieldSpec::new("line", 0, 8, Encoding::CString),
        FieldSpec::new("user", 8, 16, Encoding::CString),
        FieldSpec::new("host", 24, 16, Encoding::CString),
        FieldSpec::new("time", 40, 4, Encoding::Signed),
    ],
};

/// glibc x86_64 `struct utmp`, 384 bytes. `ut_tv` is two `int32_t`.
pub static LINUX_GLIBC_UTMP: RecordLayout = RecordLayout {
    name: "utmp",
    size: 384,
    header_len: 0,
    byte_order: ByteOrder::Little,
    fields: &[
        FieldSpec::new("type", 0, 2, Encoding::Signed),
        FieldSpec::new("pid", 4, 4, Encoding::Signed),
        FieldSpec::new("line", 8, 32, Encoding::CString),
        FieldSpec::new("id", 40, 4, Encoding::CString),
        FieldSpec::new("user", 44, 32, Encoding::CString),
        FieldSpec::new("host", 76, 256, Encoding::CString),
        FieldSpec::new("session", 336, 4, Encoding::Signed),
        FieldSpec::new("time", 340, 4, Encoding::Signed),
        FieldSpec::new("usec", 344, 4, Encoding::Signed),
    ],
};

/// glibc `ut_type` of a normal login session.
pub const UTMP_USER_PROCESS: i64 = 7;
