//! The decode half of the codec engine.

use bytes::Buf;

use crate::error::DecodeError;
use crate::leb128::decode_varint;
use crate::schema::{FieldKind, Schema};
use crate::value::{int64_value, uint64_value, FieldMap, Value};
use crate::wire::{self, WireType};

/// Decode one message body from `bytes` according to the descriptor at
/// `index`.
///
/// Walks key after key until the buffer is exhausted. Unknown field numbers
/// are skipped by wire type; so are records whose wire type does not match
/// the field's declared kind, which keeps the cursor consistent without
/// failing the whole message. Singular fields overwrite on repetition (last
/// occurrence wins), repeated fields append.
pub(crate) fn decode_message(
    schema: &Schema,
    index: usize,
    bytes: &[u8],
) -> Result<FieldMap, DecodeError> {
    let descriptor = &schema.messages[index];
    let mut buf = bytes;
    let mut fields = FieldMap::new();

    while buf.has_remaining() {
        let (number, wire_type) = wire::decode_key(&mut buf)?;

        let Some(field) = descriptor.field_by_number(number) else {
            wire::skip_field(wire_type, &mut buf)?;
            continue;
        };

        let expected = field.kind.wire_type();

        if field.label.is_repeated() && wire_type == WireType::Len && expected != WireType::Len {
            // Packed encoding: one length-delimited record holding scalar
            // values back to back.
            let mut span = read_span(&mut buf)?;
            let list = repeated_entry(&mut fields, &field.name);
            while span.has_remaining() {
                list.push(decode_scalar(schema, field.kind, &mut span)?);
            }
            continue;
        }

        if wire_type != expected {
            wire::skip_field(wire_type, &mut buf)?;
            continue;
        }

        let value = decode_scalar(schema, field.kind, &mut buf)?;
        if field.label.is_repeated() {
            repeated_entry(&mut fields, &field.name).push(value);
        } else {
            fields.insert(field.name.clone(), value);
        }
    }

    Ok(fields)
}

/// Decode a single value of `kind` from the front of `buf`.
fn decode_scalar(
    schema: &Schema,
    kind: FieldKind,
    buf: &mut &[u8],
) -> Result<Value, DecodeError> {
    let value = match kind {
        // int32 is sign-extended through 64 bits on the wire.
        FieldKind::Int32 => Value::I32(decode_varint(buf)? as i32),
        FieldKind::Int64 => int64_value(decode_varint(buf)? as i64),
        FieldKind::Uint32 => Value::U32(decode_varint(buf)? as u32),
        FieldKind::Uint64 => uint64_value(decode_varint(buf)?),
        FieldKind::Sint32 => Value::I32(wire::zigzag_decode_32(decode_varint(buf)? as u32)),
        FieldKind::Sint64 => int64_value(wire::zigzag_decode_64(decode_varint(buf)?)),
        FieldKind::Bool => Value::Bool(decode_varint(buf)? != 0),
        FieldKind::Fixed32 => {
            check_remaining(buf, 4)?;
            Value::U32(buf.get_u32_le())
        }
        FieldKind::Sfixed32 => {
            check_remaining(buf, 4)?;
            Value::I32(buf.get_i32_le())
        }
        FieldKind::Float => {
            check_remaining(buf, 4)?;
            Value::F32(buf.get_f32_le())
        }
        FieldKind::Fixed64 => {
            check_remaining(buf, 8)?;
            uint64_value(buf.get_u64_le())
        }
        FieldKind::Sfixed64 => {
            check_remaining(buf, 8)?;
            int64_value(buf.get_i64_le())
        }
        FieldKind::Double => {
            check_remaining(buf, 8)?;
            Value::F64(buf.get_f64_le())
        }
        FieldKind::String => {
            let span = read_span(buf)?;
            Value::String(String::from_utf8_lossy(span).into_owned())
        }
        FieldKind::Bytes => {
            let span = read_span(buf)?;
            Value::Bytes(span.to_vec())
        }
        FieldKind::Enum(enum_index) => {
            let raw = decode_varint(buf)? as i32;
            match schema.enums[enum_index].name_for(raw) {
                Some(name) => Value::String(name.to_string()),
                // No symbolic name for this number, surface the raw value.
                None => Value::I32(raw),
            }
        }
        FieldKind::Message(message_index) => {
            let span = read_span(buf)?;
            Value::Message(decode_message(schema, message_index, span)?)
        }
    };

    Ok(value)
}

/// Read a length-delimited span, advancing the buffer past it.
fn read_span<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], DecodeError> {
    let len = wire::decode_len(buf)?;
    if buf.len() < len {
        return Err(DecodeError::Truncated);
    }
    let (span, rest) = buf.split_at(len);
    *buf = rest;
    Ok(span)
}

fn check_remaining(buf: &[u8], needed: usize) -> Result<(), DecodeError> {
    if buf.len() < needed {
        return Err(DecodeError::Truncated);
    }
    Ok(())
}

fn repeated_entry<'a>(fields: &'a mut FieldMap, name: &str) -> &'a mut Vec<Value> {
    let entry = fields
        .entry(name.to_string())
        .or_insert_with(|| Value::List(Vec::new()));
    match entry {
        Value::List(list) => list,
        // Repeated entries are only ever written by this function.
        _ => unreachable!("repeated field entry is always a list"),
    }
}
