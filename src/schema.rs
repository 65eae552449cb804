//! The runtime type registry and its resolved descriptors.
//!
//! [`Schema::new`] turns serialized descriptor bytes into an immutable
//! registry of message types, each field carrying a [`FieldKind`] resolved
//! once at build time so the codec never re-dispatches on declared type
//! names per call. The registry is safely shared across threads: nothing is
//! mutated after construction.

use std::collections::HashMap;

use crate::codec;
use crate::descriptor::{
    DescriptorProto, EnumDescriptorProto, FieldType, FileDescriptorSet, Label,
};
use crate::error::{DecodeError, EncodeError, SchemaError};
use crate::meta;
use crate::value::FieldMap;
use crate::wire::{WireType, MAXIMUM_TAG, MINIMUM_TAG};

/// Declared type of a field, with message/enum references resolved to
/// indices into the owning [`Schema`]'s tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Enum(usize),
    Message(usize),
}

impl FieldKind {
    /// The wire type a single value of this kind is encoded with.
    pub(crate) fn wire_type(self) -> WireType {
        match self {
            FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::Uint32
            | FieldKind::Uint64
            | FieldKind::Sint32
            | FieldKind::Sint64
            | FieldKind::Bool
            | FieldKind::Enum(_) => WireType::Varint,
            FieldKind::Fixed64 | FieldKind::Sfixed64 | FieldKind::Double => WireType::I64,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message(_) => WireType::Len,
            FieldKind::Fixed32 | FieldKind::Sfixed32 | FieldKind::Float => WireType::I32,
        }
    }
}

/// A resolved field: name, wire identity, label, and cached kind.
#[derive(Debug, Clone)]
pub(crate) struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) number: u32,
    pub(crate) label: Label,
    pub(crate) kind: FieldKind,
}

/// A resolved message type: fields in declaration order plus a field-number
/// lookup table for decoding.
#[derive(Debug, Clone)]
pub(crate) struct MessageDescriptor {
    pub(crate) full_name: String,
    pub(crate) fields: Vec<FieldDescriptor>,
    by_number: HashMap<u32, usize>,
}

impl MessageDescriptor {
    pub(crate) fn new(full_name: String, fields: Vec<FieldDescriptor>) -> Self {
        let by_number = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.number, index))
            .collect();
        MessageDescriptor {
            full_name,
            fields,
            by_number,
        }
    }

    pub(crate) fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.by_number.get(&number).map(|&index| &self.fields[index])
    }
}

/// A resolved enum type: symbolic name to number and back.
#[derive(Debug, Clone)]
pub(crate) struct EnumDescriptor {
    pub(crate) full_name: String,
    by_name: HashMap<String, i32>,
    by_number: HashMap<i32, String>,
}

impl EnumDescriptor {
    fn new(full_name: String, values: Vec<(String, i32)>) -> Self {
        let mut by_name = HashMap::with_capacity(values.len());
        let mut by_number = HashMap::with_capacity(values.len());
        for (name, number) in values {
            // Numbers need not be unique across names; the first name wins.
            by_number.entry(number).or_insert_with(|| name.clone());
            by_name.insert(name, number);
        }
        EnumDescriptor {
            full_name,
            by_name,
            by_number,
        }
    }

    pub(crate) fn number_for(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn name_for(&self, number: i32) -> Option<&str> {
        self.by_number.get(&number).map(String::as_str)
    }
}

/// An immutable registry of message types built from a serialized
/// `FileDescriptorSet`.
///
/// Lookup by fully-qualified name yields a [`MessageType`] handle bound to
/// this registry. Construction is the only fallible step; afterwards the
/// registry has no mutation API and can be shared freely.
#[derive(Debug)]
pub struct Schema {
    pub(crate) messages: Vec<MessageDescriptor>,
    pub(crate) enums: Vec<EnumDescriptor>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    /// Build a registry from serialized `FileDescriptorSet` bytes.
    ///
    /// The descriptor bytes are decoded by the same codec engine that
    /// handles user messages, driven by the statically-built meta-schema.
    pub fn new(descriptor_bytes: &[u8]) -> Result<Self, SchemaError> {
        let meta = meta::meta_schema();
        let fields = codec::decode_message(meta, meta::FILE_DESCRIPTOR_SET, descriptor_bytes)?;
        let set = FileDescriptorSet::from_fields(&fields);
        Self::from_descriptor_set(&set)
    }

    pub(crate) fn from_descriptor_set(set: &FileDescriptorSet) -> Result<Self, SchemaError> {
        // First pass: register every message and enum under its
        // fully-qualified name so field resolution can see the whole set.
        let mut msg_protos: Vec<(String, &DescriptorProto)> = Vec::new();
        let mut enums: Vec<EnumDescriptor> = Vec::new();

        for file in &set.file {
            let prefix = file.package.clone().unwrap_or_default();
            for message in &file.message_type {
                collect_messages(&prefix, message, &mut msg_protos, &mut enums)?;
            }
            for enumeration in &file.enum_type {
                enums.push(lower_enum(&prefix, enumeration)?);
            }
        }

        let by_name: HashMap<String, usize> = msg_protos
            .iter()
            .enumerate()
            .map(|(index, (full_name, _))| (full_name.clone(), index))
            .collect();
        let enums_by_name: HashMap<&str, usize> = enums
            .iter()
            .enumerate()
            .map(|(index, e)| (e.full_name.as_str(), index))
            .collect();

        // Second pass: resolve every field to a concrete kind.
        let mut messages = Vec::with_capacity(msg_protos.len());
        for (full_name, proto) in &msg_protos {
            let mut fields = Vec::with_capacity(proto.field.len());
            for field in &proto.field {
                fields.push(resolve_field(
                    full_name, field, &by_name, &enums_by_name,
                )?);
            }
            messages.push(MessageDescriptor::new(full_name.clone(), fields));
        }

        tracing::debug!(
            messages = messages.len(),
            enums = enums.len(),
            "built type registry"
        );

        Ok(Schema {
            messages,
            enums,
            by_name,
        })
    }

    /// Used by the meta-schema, whose descriptors are assembled directly.
    pub(crate) fn from_parts(messages: Vec<MessageDescriptor>) -> Self {
        let by_name = messages
            .iter()
            .enumerate()
            .map(|(index, m)| (m.full_name.clone(), index))
            .collect();
        Schema {
            messages,
            enums: Vec::new(),
            by_name,
        }
    }

    /// Look up a message type by fully-qualified name.
    ///
    /// Returns `None` for names absent from the descriptor set.
    pub fn message_type<'a>(&'a self, full_name: &str) -> Option<MessageType<'a>> {
        self.by_name.get(full_name).map(|&index| MessageType {
            schema: self,
            index,
        })
    }

    /// Fully-qualified names of every registered message type.
    pub fn message_names(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.full_name.as_str())
    }
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn collect_messages<'a>(
    prefix: &str,
    proto: &'a DescriptorProto,
    msg_protos: &mut Vec<(String, &'a DescriptorProto)>,
    enums: &mut Vec<EnumDescriptor>,
) -> Result<(), SchemaError> {
    let name = proto.name.as_deref().ok_or(SchemaError::MissingName)?;
    let full_name = qualify(prefix, name);

    for enumeration in &proto.enum_type {
        enums.push(lower_enum(&full_name, enumeration)?);
    }

    for nested in &proto.nested_type {
        collect_messages(&full_name, nested, msg_protos, enums)?;
    }

    msg_protos.push((full_name, proto));
    Ok(())
}

fn lower_enum(prefix: &str, proto: &EnumDescriptorProto) -> Result<EnumDescriptor, SchemaError> {
    let name = proto.name.as_deref().ok_or(SchemaError::MissingName)?;
    let full_name = qualify(prefix, name);

    let mut values = Vec::with_capacity(proto.value.len());
    for value in &proto.value {
        let value_name = value.name.clone().ok_or(SchemaError::MissingName)?;
        values.push((value_name, value.number.unwrap_or(0)));
    }

    Ok(EnumDescriptor::new(full_name, values))
}

fn resolve_field(
    message: &str,
    field: &crate::descriptor::FieldDescriptorProto,
    messages_by_name: &HashMap<String, usize>,
    enums_by_name: &HashMap<&str, usize>,
) -> Result<FieldDescriptor, SchemaError> {
    let name = field.name.clone().ok_or(SchemaError::MissingName)?;

    let number = field
        .number
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| (MINIMUM_TAG..=MAXIMUM_TAG).contains(n))
        .ok_or_else(|| SchemaError::InvalidFieldNumber {
            message: message.to_string(),
            field: name.clone(),
        })?;

    let label_value = field.label.unwrap_or(Label::Optional as i32);
    let label = Label::from_i32(label_value).ok_or_else(|| SchemaError::InvalidLabel {
        message: message.to_string(),
        field: name.clone(),
        value: label_value,
    })?;

    let type_value = field.r#type.unwrap_or(0);
    let field_type = FieldType::from_i32(type_value).ok_or_else(|| SchemaError::InvalidFieldType {
        message: message.to_string(),
        field: name.clone(),
        value: type_value,
    })?;

    let kind = match field_type {
        FieldType::Double => FieldKind::Double,
        FieldType::Float => FieldKind::Float,
        FieldType::Int64 => FieldKind::Int64,
        FieldType::Uint64 => FieldKind::Uint64,
        FieldType::Int32 => FieldKind::Int32,
        FieldType::Fixed64 => FieldKind::Fixed64,
        FieldType::Fixed32 => FieldKind::Fixed32,
        FieldType::Bool => FieldKind::Bool,
        FieldType::String => FieldKind::String,
        FieldType::Bytes => FieldKind::Bytes,
        FieldType::Uint32 => FieldKind::Uint32,
        FieldType::Sfixed32 => FieldKind::Sfixed32,
        FieldType::Sfixed64 => FieldKind::Sfixed64,
        FieldType::Sint32 => FieldKind::Sint32,
        FieldType::Sint64 => FieldKind::Sint64,
        FieldType::Group => {
            return Err(SchemaError::UnsupportedGroup {
                message: message.to_string(),
                field: name,
            });
        }
        FieldType::Message => {
            let type_name = field.type_name.as_deref().unwrap_or_default();
            // protoc emits absolute references with a leading dot.
            let key = type_name.strip_prefix('.').unwrap_or(type_name);
            let index = messages_by_name.get(key).copied().ok_or_else(|| {
                SchemaError::UnresolvedTypeReference {
                    message: message.to_string(),
                    field: name.clone(),
                    type_name: type_name.to_string(),
                }
            })?;
            FieldKind::Message(index)
        }
        FieldType::Enum => {
            let type_name = field.type_name.as_deref().unwrap_or_default();
            let key = type_name.strip_prefix('.').unwrap_or(type_name);
            let index = enums_by_name.get(key).copied().ok_or_else(|| {
                SchemaError::UnresolvedTypeReference {
                    message: message.to_string(),
                    field: name.clone(),
                    type_name: type_name.to_string(),
                }
            })?;
            FieldKind::Enum(index)
        }
    };

    Ok(FieldDescriptor {
        name,
        number,
        label,
        kind,
    })
}

/// A message type bound to its registry, the handle callers decode and
/// encode through.
#[derive(Clone, Copy)]
pub struct MessageType<'a> {
    schema: &'a Schema,
    index: usize,
}

impl<'a> MessageType<'a> {
    /// Fully-qualified name of this message type.
    pub fn full_name(&self) -> &'a str {
        &self.schema.messages[self.index].full_name
    }

    /// Decode wire bytes into a field map for this message type.
    ///
    /// Unknown wire fields are skipped; truncated or otherwise malformed
    /// input fails with a [`DecodeError`].
    pub fn parse(&self, bytes: &[u8]) -> Result<FieldMap, DecodeError> {
        codec::decode_message(self.schema, self.index, bytes)
    }

    /// Encode a field map into wire bytes for this message type.
    ///
    /// Fields are written in declaration order; absent and null fields are
    /// omitted; map keys that name no declared field are ignored.
    pub fn serialize(&self, fields: &FieldMap) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::new();
        codec::encode_message(self.schema, self.index, fields, &mut buf)?;
        Ok(buf)
    }
}

impl std::fmt::Debug for MessageType<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageType")
            .field("full_name", &self.full_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        EnumValueDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    };

    fn field(name: &str, number: i32, r#type: FieldType, type_name: Option<&str>) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(r#type as i32),
            type_name: type_name.map(str::to_string),
            default_value: None,
        }
    }

    fn test_set() -> FileDescriptorSet {
        FileDescriptorSet {
            file: vec![FileDescriptorProto {
                package: Some("test".to_string()),
                message_type: vec![DescriptorProto {
                    name: Some("Outer".to_string()),
                    field: vec![
                        field("id", 1, FieldType::Int32, None),
                        field("inner", 2, FieldType::Message, Some(".test.Outer.Inner")),
                        field("color", 3, FieldType::Enum, Some(".test.Outer.Color")),
                    ],
                    nested_type: vec![DescriptorProto {
                        name: Some("Inner".to_string()),
                        field: vec![field("value", 1, FieldType::String, None)],
                        ..Default::default()
                    }],
                    enum_type: vec![EnumDescriptorProto {
                        name: Some("Color".to_string()),
                        value: vec![
                            EnumValueDescriptorProto {
                                name: Some("RED".to_string()),
                                number: Some(0),
                            },
                            EnumValueDescriptorProto {
                                name: Some("BLUE".to_string()),
                                number: Some(2),
                            },
                        ],
                    }],
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_nested_types_register_under_parent_scope() {
        let schema = Schema::from_descriptor_set(&test_set()).unwrap();

        assert!(schema.message_type("test.Outer").is_some());
        assert!(schema.message_type("test.Outer.Inner").is_some());
        assert!(schema.message_type("test.Inner").is_none());
        assert!(schema.message_type("Outer").is_none());
    }

    #[test]
    fn test_field_kinds_resolve_to_indices() {
        let schema = Schema::from_descriptor_set(&test_set()).unwrap();
        let outer = schema.message_type("test.Outer").unwrap();
        let desc = &schema.messages[schema.by_name["test.Outer"]];

        assert_eq!(outer.full_name(), "test.Outer");
        assert_eq!(desc.field_by_number(1).unwrap().kind, FieldKind::Int32);

        let inner_kind = desc.field_by_number(2).unwrap().kind;
        let FieldKind::Message(inner_index) = inner_kind else {
            panic!("expected message kind, got {inner_kind:?}");
        };
        assert_eq!(schema.messages[inner_index].full_name, "test.Outer.Inner");

        let color_kind = desc.field_by_number(3).unwrap().kind;
        let FieldKind::Enum(color_index) = color_kind else {
            panic!("expected enum kind, got {color_kind:?}");
        };
        let color = &schema.enums[color_index];
        assert_eq!(color.full_name, "test.Outer.Color");
        assert_eq!(color.number_for("BLUE"), Some(2));
        assert_eq!(color.name_for(0), Some("RED"));
        assert_eq!(color.number_for("GREEN"), None);
    }

    #[test]
    fn test_unresolved_reference_fails_construction() {
        let mut set = test_set();
        set.file[0].message_type[0].field[1].type_name = Some(".test.Missing".to_string());

        let err = Schema::from_descriptor_set(&set).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedTypeReference { .. }));
    }

    #[test]
    fn test_group_field_is_rejected() {
        let mut set = test_set();
        set.file[0].message_type[0].field[0].r#type = Some(FieldType::Group as i32);

        let err = Schema::from_descriptor_set(&set).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedGroup { .. }));
    }

    #[test]
    fn test_invalid_field_number_is_rejected() {
        let mut set = test_set();
        set.file[0].message_type[0].field[0].number = Some(0);

        let err = Schema::from_descriptor_set(&set).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidFieldNumber { .. }));
    }
}
