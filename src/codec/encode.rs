//! The encode half of the codec engine.

use bytes::BufMut;

use crate::error::EncodeError;
use crate::leb128::encode_varint;
use crate::schema::{FieldDescriptor, FieldKind, Schema};
use crate::value::{FieldMap, Value};
use crate::wire::{encode_key, zigzag_encode_32, zigzag_encode_64};

/// Encode one message body from `fields` according to the descriptor at
/// `index`, appending to `buf`.
///
/// Fields are written in the descriptor's declaration order, not the map's
/// iteration order, so output is canonical and round-trips bit-exact.
/// Absent and null fields are omitted entirely; map keys that name no
/// declared field are ignored. Repeated scalars are written one tag+value
/// pair per element (the decoder accepts the packed form as well).
pub(crate) fn encode_message(
    schema: &Schema,
    index: usize,
    fields: &FieldMap,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    let descriptor = &schema.messages[index];

    for field in &descriptor.fields {
        let Some(value) = fields.get(&field.name) else {
            continue;
        };
        if value.is_null() {
            continue;
        }

        if field.label.is_repeated() {
            let Value::List(items) = value else {
                return Err(EncodeError::NotAnArray {
                    field: field.name.clone(),
                });
            };
            for item in items {
                encode_field(schema, field, item, buf)?;
            }
        } else {
            encode_field(schema, field, value, buf)?;
        }
    }

    Ok(())
}

/// Encode a single tag+value record.
fn encode_field(
    schema: &Schema,
    field: &FieldDescriptor,
    value: &Value,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    encode_key(field.number, field.kind.wire_type(), buf);

    match field.kind {
        // Negative int32 values are sign-extended to 64 bits on the wire.
        FieldKind::Int32 => {
            encode_varint(value.to_i32() as i64 as u64, buf);
        }
        FieldKind::Int64 => {
            encode_varint(value.to_i64() as u64, buf);
        }
        FieldKind::Uint32 => {
            encode_varint(u64::from(value.to_u32()), buf);
        }
        FieldKind::Uint64 => {
            encode_varint(value.to_u64(), buf);
        }
        FieldKind::Sint32 => {
            encode_varint(u64::from(zigzag_encode_32(value.to_i32())), buf);
        }
        FieldKind::Sint64 => {
            encode_varint(zigzag_encode_64(value.to_i64()), buf);
        }
        FieldKind::Bool => {
            buf.put_u8(u8::from(value.to_bool()));
        }
        FieldKind::Fixed32 => {
            buf.put_u32_le(value.to_u32());
        }
        FieldKind::Sfixed32 => {
            buf.put_i32_le(value.to_i32());
        }
        FieldKind::Float => {
            buf.put_f32_le(value.to_f32());
        }
        FieldKind::Fixed64 => {
            buf.put_u64_le(value.to_u64());
        }
        FieldKind::Sfixed64 => {
            buf.put_i64_le(value.to_i64());
        }
        FieldKind::Double => {
            buf.put_f64_le(value.to_f64());
        }
        FieldKind::String => {
            let text = value.to_text();
            encode_varint(text.len() as u64, buf);
            buf.extend_from_slice(text.as_bytes());
        }
        FieldKind::Bytes => {
            let bytes = value.to_byte_vec();
            encode_varint(bytes.len() as u64, buf);
            buf.extend_from_slice(&bytes);
        }
        FieldKind::Enum(enum_index) => {
            let number = resolve_enum(schema, enum_index, field, value)?;
            encode_varint(number as i64 as u64, buf);
        }
        FieldKind::Message(message_index) => {
            let Value::Message(nested) = value else {
                return Err(EncodeError::NotAnObject {
                    field: field.name.clone(),
                });
            };
            // Dynamic values have no precomputed size, so the body goes
            // through a scratch buffer to obtain the length prefix.
            let mut body = Vec::new();
            encode_message(schema, message_index, nested, &mut body)?;
            encode_varint(body.len() as u64, buf);
            buf.extend_from_slice(&body);
        }
    }

    Ok(())
}

/// Resolve an enum input to its wire number. Numeric input resolves by
/// number, anything else by symbolic name.
fn resolve_enum(
    schema: &Schema,
    enum_index: usize,
    field: &FieldDescriptor,
    value: &Value,
) -> Result<i32, EncodeError> {
    let enumeration = &schema.enums[enum_index];

    match value {
        Value::I32(_)
        | Value::U32(_)
        | Value::I64(_)
        | Value::U64(_)
        | Value::F32(_)
        | Value::F64(_) => {
            let number = value.to_i32();
            if enumeration.name_for(number).is_some() {
                Ok(number)
            } else {
                Err(EncodeError::UnknownEnumValue {
                    field: field.name.clone(),
                    value: number.to_string(),
                })
            }
        }
        other => {
            let name = other.to_text();
            enumeration
                .number_for(&name)
                .ok_or_else(|| EncodeError::UnknownEnumValue {
                    field: field.name.clone(),
                    value: name,
                })
        }
    }
}
