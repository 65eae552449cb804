//! Wire format for Google's Protocol Buffers, aka [protobuf](https://protobuf.dev).
//!
//! Field keys, wire types, zigzag sign mapping, length prefixes, and field
//! skipping. Follows the specification from
//! <https://protobuf.dev/programming-guides/encoding>.

use bytes::{Buf, BufMut};

use crate::error::DecodeError;
use crate::leb128::{decode_varint, encode_varint};

/// Minimum value of a protobuf field number.
pub const MINIMUM_TAG: u32 = 1;
/// Maximum value of a protobuf field number.
pub const MAXIMUM_TAG: u32 = (1 << 29) - 1;

/// Denotes the type of a field in an encoded protobuf message.
///
/// Protobuf messages are a series of key-value pairs. When encoded each
/// key-value pair is turned into a record consisting of a field number, a
/// [`WireType`], and a payload. The [`WireType`] indicates how large the
/// proceeding payload is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    /// Variable length integer.
    ///
    /// Used for: `int32`, `int64`, `uint32`, `uint64`, `sint32`, `sint64`,
    /// `bool`, `enum`.
    Varint = 0,
    /// 64-bit integer.
    ///
    /// Used for: `fixed64`, `sfixed64`, `double`.
    I64 = 1,
    /// Variable length field.
    ///
    /// Used for: `string`, `bytes`, `message`, packed `repeated` fields.
    Len = 2,
    /// Group start (deprecated).
    SGroup = 3,
    /// Group end (deprecated).
    EGroup = 4,
    /// 32-bit integer.
    ///
    /// Used for: `fixed32`, `sfixed32`, `float`.
    I32 = 5,
}

impl WireType {
    /// Try to decode a [`WireType`] from the provided raw value.
    pub fn from_val(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            3 => Ok(WireType::SGroup),
            4 => Ok(WireType::EGroup),
            5 => Ok(WireType::I32),
            _ => Err(DecodeError::InvalidWireType(value)),
        }
    }

    /// Return the raw value for this [`WireType`].
    pub const fn into_val(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, DecodeError> {
        WireType::from_val(value)
    }
}

/// Encodes the provided field number and wire type as a protobuf field key.
pub fn encode_key<B: BufMut>(tag: u32, wire_type: WireType, buf: &mut B) {
    let key = (tag << 3) | u32::from(wire_type.into_val());
    encode_varint(u64::from(key), buf);
}

/// Decodes a field key into its field number and [`WireType`].
pub fn decode_key<B: Buf>(buf: &mut B) -> Result<(u32, WireType), DecodeError> {
    let key = decode_varint(buf)?;

    // The first three bits of the key are the wire type.
    let wire_type = WireType::from_val((key & 0b111) as u8)?;

    // The remaining bits are the field number.
    let tag = key >> 3;
    if tag < u64::from(MINIMUM_TAG) || tag > u64::from(MAXIMUM_TAG) {
        return Err(DecodeError::TagOutOfRange(tag.min(u64::from(u32::MAX)) as u32));
    }

    Ok((tag as u32, wire_type))
}

/// Decodes the length prefix for a length-delimited field.
///
/// The caller is responsible for checking the decoded length against the
/// remaining buffer.
pub fn decode_len<B: Buf>(buf: &mut B) -> Result<usize, DecodeError> {
    let len = decode_varint(buf)?;
    usize::try_from(len).map_err(|_| DecodeError::LengthOverflow(len))
}

/// Skips over a field value based on its wire type.
///
/// Protobuf supports backwards and forwards compatibility by skipping fields
/// we don't know about. We "skip" a field by advancing our buffer past it.
pub fn skip_field<B: Buf>(wire_type: WireType, buf: &mut B) -> Result<(), DecodeError> {
    let skip_len = match wire_type {
        WireType::Varint => {
            // Read and discard the varint, which advances the buffer.
            decode_varint(buf)?;
            return Ok(());
        }
        WireType::I64 => 8,
        WireType::Len => decode_len(buf)?,
        WireType::I32 => 4,
        WireType::SGroup | WireType::EGroup => {
            return Err(DecodeError::GroupEncoding);
        }
    };

    if buf.remaining() < skip_len {
        return Err(DecodeError::Truncated);
    }
    buf.advance(skip_len);
    Ok(())
}

/// Maps a signed 32-bit integer onto the unsigned varint space.
///
/// Small-magnitude negative numbers stay short on the wire; used for `sint32`.
pub const fn zigzag_encode_32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// Inverse of [`zigzag_encode_32`].
pub const fn zigzag_decode_32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ (-((n & 1) as i32))
}

/// Maps a signed 64-bit integer onto the unsigned varint space; used for `sint64`.
pub const fn zigzag_encode_64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`zigzag_encode_64`].
pub const fn zigzag_decode_64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}
