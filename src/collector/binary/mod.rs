//! Decoders for fixed-layout kernel records.
//!
//! The kernel hands us raw memory: `devstat` entries from sysctl,
//! `statfs` entries from `getfsstat(2)`, `utmp` login records and the
//! `timeval` behind `kern.boottime`. There is no schema and no checksum, so
//! every structure is described by a [`RecordLayout`] pinned to one
//! platform/architecture and decoded field by field.

pub mod bintime;
pub mod flags;
pub mod layout;
pub mod layouts;
pub mod records;

pub use bintime::{BINTIME_SCALE, Bintime};
pub use flags::mount_options;
pub use layout::{
    ByteOrder, DecodeError, Encoding, FieldSpec, RawRecord, RecordLayout, cstr, decode,
    decode_records,
};
pub use records::{Devstat, FromRecord, Statfs, Timeval, Utmp, decode_each};
