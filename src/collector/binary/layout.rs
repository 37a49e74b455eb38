//! Record layout descriptors and the generic field decoder.

use thiserror::Error;
use tracing::warn;

use crate::collector::binary::bintime::Bintime;

/// Error type for binary decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bytes than the layout (or one of its fields) requires.
    #[error("truncated {layout} buffer: need {needed} bytes, have {available}")]
    TruncatedBuffer {
        layout: &'static str,
        needed: usize,
        available: usize,
    },
    /// The field cannot be decoded with its declared width or encoding.
    #[error("invalid encoding of field {field}: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },
    #[error("field {0} is not part of the layout")]
    UnknownField(&'static str),
}

/// Byte order of multi-byte integers in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    #[cfg(target_endian = "little")]
    pub const NATIVE: ByteOrder = ByteOrder::Little;
    #[cfg(target_endian = "big")]
    pub const NATIVE: ByteOrder = ByteOrder::Big;
}

/// How the bytes of a field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Unsigned integer of 1, 2, 4 or 8 bytes.
    Unsigned,
    /// Two's complement integer of 1, 2, 4 or 8 bytes.
    Signed,
    /// NUL-padded character array.
    CString,
    /// `struct bintime`: 8-byte signed seconds then 8-byte fraction.
    Bintime,
}

/// One field of a record: name, byte offset, width and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
    pub encoding: Encoding,
}

impl FieldSpec {
    pub const fn new(name: &'static str, offset: usize, width: usize, encoding: Encoding) -> Self {
        Self {
            name,
            offset,
            width,
            encoding,
        }
    }
}

/// Declarative description of a kernel structure as it sits in memory.
///
/// `size` includes trailing padding. `header_len` bytes precede the first
/// record in a dump (e.g. the generation counter of `kern.devstat.all`).
#[derive(Debug, PartialEq, Eq)]
pub struct RecordLayout {
    pub name: &'static str,
    pub size: usize,
    pub header_len: usize,
    pub byte_order: ByteOrder,
    pub fields: &'static [FieldSpec],
}

impl RecordLayout {
    pub fn field(&self, name: &'static str) -> Result<&FieldSpec, DecodeError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or(DecodeError::UnknownField(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }
}

/// A record-sized window over a buffer, read through its layout.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    layout: &'static RecordLayout,
    bytes: &'a [u8],
}

impl<'a> RawRecord<'a> {
    pub fn layout(&self) -> &'static RecordLayout {
        self.layout
    }

    fn field_bytes(&self, name: &'static str, expected: Encoding) -> Result<&'a [u8], DecodeError> {
        let spec = self.layout.field(name)?;
        if spec.encoding != expected {
            return Err(DecodeError::InvalidEncoding {
                field: name,
                reason: format!("declared {:?}, read as {:?}", spec.encoding, expected),
            });
        }
        let end = spec.offset + spec.width;
        self.bytes
            .get(spec.offset..end)
            .ok_or(DecodeError::TruncatedBuffer {
                layout: self.layout.name,
                needed: end,
                available: self.bytes.len(),
            })
    }

    pub fn unsigned(&self, name: &'static str) -> Result<u64, DecodeError> {
        let bytes = self.field_bytes(name, Encoding::Unsigned)?;
        read_unsigned(bytes, self.layout.byte_order).ok_or_else(|| bad_width(name, bytes.len()))
    }

    pub fn signed(&self, name: &'static str) -> Result<i64, DecodeError> {
        let bytes = self.field_bytes(name, Encoding::Signed)?;
        read_signed(bytes, self.layout.byte_order).ok_or_else(|| bad_width(name, bytes.len()))
    }

    pub fn cstring(&self, name: &'static str) -> Result<String, DecodeError> {
        self.field_bytes(name, Encoding::CString).map(cstr)
    }

    pub fn bintime(&self, name: &'static str) -> Result<Bintime, DecodeError> {
        let bytes = self.field_bytes(name, Encoding::Bintime)?;
        if bytes.len() != 16 {
            return Err(bad_width(name, bytes.len()));
        }
        let order = self.layout.byte_order;
        let (sec, frac) = bytes.split_at(8);
        match (read_signed(sec, order), read_unsigned(frac, order)) {
            (Some(sec), Some(frac)) => Ok(Bintime { sec, frac }),
            _ => Err(bad_width(name, bytes.len())),
        }
    }
}

fn bad_width(field: &'static str, width: usize) -> DecodeError {
    DecodeError::InvalidEncoding {
        field,
        reason: format!("unsupported integer width {}", width),
    }
}

fn read_unsigned(bytes: &[u8], order: ByteOrder) -> Option<u64> {
    if !matches!(bytes.len(), 1 | 2 | 4 | 8) {
        return None;
    }
    let push = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
    Some(match order {
        ByteOrder::Little => bytes.iter().rev().fold(0, push),
        ByteOrder::Big => bytes.iter().fold(0, push),
    })
}

fn read_signed(bytes: &[u8], order: ByteOrder) -> Option<i64> {
    let raw = read_unsigned(bytes, order)?;
    let shift = 64 - 8 * bytes.len() as u32;
    Some(((raw << shift) as i64) >> shift)
}

/// Converts a NUL-padded byte array to a string, stopping at the first NUL.
pub fn cstr(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Decodes the first `layout.size` bytes of `buffer` as one record.
pub fn decode<'a>(
    buffer: &'a [u8],
    layout: &'static RecordLayout,
) -> Result<RawRecord<'a>, DecodeError> {
    let bytes = buffer
        .get(..layout.size)
        .ok_or(DecodeError::TruncatedBuffer {
            layout: layout.name,
            needed: layout.size,
            available: buffer.len(),
        })?;
    Ok(RawRecord { layout, bytes })
}

/// Splits a dump into records after skipping the layout's header.
///
/// An empty payload yields no records. A payload shorter than one record,
/// or a buffer shorter than the header, is `TruncatedBuffer`. A payload that
/// is not a whole multiple of the record size is still accepted: the whole
/// records are returned and the remainder is dropped with a warning.
pub fn decode_records<'a>(
    buffer: &'a [u8],
    layout: &'static RecordLayout,
) -> Result<Vec<RawRecord<'a>>, DecodeError> {
    let payload = buffer
        .get(layout.header_len..)
        .ok_or(DecodeError::TruncatedBuffer {
            layout: layout.name,
            needed: layout.header_len,
            available: buffer.len(),
        })?;
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    if payload.len() < layout.size {
        return Err(DecodeError::TruncatedBuffer {
            layout: layout.name,
            needed: layout.header_len + layout.size,
            available: buffer.len(),
        });
    }

    let windows = payload.chunks_exact(layout.size);
    let tail = windows.remainder().len();
    if tail > 0 {
        warn!(layout = layout.name, bytes = tail, "ignoring trailing partial record");
    }
    windows.map(|window| decode(window, layout)).collect()
}
