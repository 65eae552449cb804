//! Error types for schema construction, decoding, and encoding.

use thiserror::Error;

/// A message could not be decoded from its wire bytes.
///
/// Every variant means the input is not a valid encoding of the requested
/// message type. Callers recover by rejecting the input; nothing is retried
/// internally.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ended in the middle of a value.
    #[error("unexpected end of buffer")]
    Truncated,
    /// A varint ran past 10 bytes or set bits above bit 63.
    #[error("varint exceeds 64 bits")]
    VarintOverflow,
    /// The low three bits of a field key held a value outside 0..=5.
    #[error("invalid 'wire type' value: {0}")]
    InvalidWireType(u8),
    /// A field key carried a field number outside `1..=2^29-1`.
    #[error("field number {0} out of range")]
    TagOutOfRange(u32),
    /// The deprecated group encoding is not supported.
    #[error("deprecated group encoding not supported")]
    GroupEncoding,
    /// A length prefix does not fit in addressable memory.
    #[error("length prefix {0} exceeds platform addressable memory")]
    LengthOverflow(u64),
}

/// A schema registry could not be built from descriptor bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The buffer does not decode as a `FileDescriptorSet`.
    #[error("malformed descriptor: {0}")]
    InvalidDescriptor(#[from] DecodeError),
    /// A message, enum, or field descriptor is missing its name.
    #[error("missing name in descriptor")]
    MissingName,
    /// A field descriptor is missing its number, or the number is not positive.
    #[error("missing or invalid field number for '{field}' in '{message}'")]
    InvalidFieldNumber { message: String, field: String },
    /// A field declared a type value outside 1..=18.
    #[error("invalid field type {value} for '{field}' in '{message}'")]
    InvalidFieldType {
        message: String,
        field: String,
        value: i32,
    },
    /// A field declared a label value outside 1..=3.
    #[error("invalid field label {value} for '{field}' in '{message}'")]
    InvalidLabel {
        message: String,
        field: String,
        value: i32,
    },
    /// A field references a message or enum type absent from the set.
    #[error("unresolved type reference '{type_name}' for field '{field}' in '{message}'")]
    UnresolvedTypeReference {
        message: String,
        field: String,
        type_name: String,
    },
    /// A field uses the deprecated group type.
    #[error("group field '{field}' in '{message}' is not supported")]
    UnsupportedGroup { message: String, field: String },
}

/// A value could not be encoded for its declared field.
///
/// Encoding never silently drops invalid input; shape mismatches and
/// unresolvable enum values always fail loudly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A message-typed field was given something other than a message value.
    #[error("not an object: field '{field}'")]
    NotAnObject { field: String },
    /// A repeated field was given something other than a list.
    #[error("not an array: field '{field}'")]
    NotAnArray { field: String },
    /// An enum field was given a name or number absent from the enum.
    #[error("unknown enum value '{value}' for field '{field}'")]
    UnknownEnumValue { field: String, value: String },
}
