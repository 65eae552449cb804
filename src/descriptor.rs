//! Descriptor types for protobuf `FileDescriptorSet`.
//!
//! These types mirror the subset of `google/protobuf/descriptor.proto` the
//! engine needs for serialization. They are lowered from the value tree the
//! codec produces when run against the statically-built meta-schema (see
//! [`crate::meta`]), then resolved into the runtime registry by
//! [`crate::schema`].

use crate::value::{FieldMap, Value};

/// A collection of file descriptors.
/// Corresponds to google.protobuf.FileDescriptorSet.
#[derive(Debug, Clone, Default)]
pub(crate) struct FileDescriptorSet {
    /// The file descriptors.
    pub file: Vec<FileDescriptorProto>, // field 1
}

/// Describes a complete .proto file.
/// Corresponds to google.protobuf.FileDescriptorProto.
#[derive(Debug, Clone, Default)]
pub(crate) struct FileDescriptorProto {
    /// The package name.
    pub package: Option<String>, // field 2
    /// All top-level message definitions in this file.
    pub message_type: Vec<DescriptorProto>, // field 4
    /// All top-level enum definitions in this file.
    pub enum_type: Vec<EnumDescriptorProto>, // field 5
}

/// Describes a message type.
/// Corresponds to google.protobuf.DescriptorProto.
#[derive(Debug, Clone, Default)]
pub(crate) struct DescriptorProto {
    /// The message name.
    pub name: Option<String>, // field 1
    /// Fields of the message, in declaration order.
    pub field: Vec<FieldDescriptorProto>, // field 2
    /// Nested message types.
    pub nested_type: Vec<DescriptorProto>, // field 3
    /// Nested enum types.
    pub enum_type: Vec<EnumDescriptorProto>, // field 4
}

/// Describes a field within a message.
/// Corresponds to google.protobuf.FieldDescriptorProto.
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldDescriptorProto {
    /// The field name.
    pub name: Option<String>, // field 1
    /// The field number. The sole wire identity of the field: renaming a
    /// field never changes wire bytes, renumbering always does.
    pub number: Option<i32>, // field 3
    /// The field label (optional, required, repeated).
    pub label: Option<i32>, // field 4
    /// The field type.
    pub r#type: Option<i32>, // field 5
    /// For message and enum types, the fully-qualified type name.
    pub type_name: Option<String>, // field 6
    /// The default value as a string. Carried for completeness; unset
    /// fields decode to absent, never to this default.
    pub default_value: Option<String>, // field 7
}

/// Describes an enum type.
/// Corresponds to google.protobuf.EnumDescriptorProto.
#[derive(Debug, Clone, Default)]
pub(crate) struct EnumDescriptorProto {
    /// The enum name.
    pub name: Option<String>, // field 1
    /// The enum values.
    pub value: Vec<EnumValueDescriptorProto>, // field 2
}

/// Describes an enum value.
/// Corresponds to google.protobuf.EnumValueDescriptorProto.
#[derive(Debug, Clone, Default)]
pub(crate) struct EnumValueDescriptorProto {
    /// The value name.
    pub name: Option<String>, // field 1
    /// The value number.
    pub number: Option<i32>, // field 2
}

/// Field type enumeration.
/// Corresponds to google.protobuf.FieldDescriptorProto.Type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub(crate) enum FieldType {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl FieldType {
    /// Convert from the raw descriptor value.
    pub(crate) fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Double),
            2 => Some(Self::Float),
            3 => Some(Self::Int64),
            4 => Some(Self::Uint64),
            5 => Some(Self::Int32),
            6 => Some(Self::Fixed64),
            7 => Some(Self::Fixed32),
            8 => Some(Self::Bool),
            9 => Some(Self::String),
            10 => Some(Self::Group),
            11 => Some(Self::Message),
            12 => Some(Self::Bytes),
            13 => Some(Self::Uint32),
            14 => Some(Self::Enum),
            15 => Some(Self::Sfixed32),
            16 => Some(Self::Sfixed64),
            17 => Some(Self::Sint32),
            18 => Some(Self::Sint64),
            _ => None,
        }
    }
}

/// Field label enumeration.
/// Corresponds to google.protobuf.FieldDescriptorProto.Label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub(crate) enum Label {
    Optional = 1,
    Required = 2,
    Repeated = 3,
}

impl Label {
    /// Convert from the raw descriptor value.
    pub(crate) fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Optional),
            2 => Some(Self::Required),
            3 => Some(Self::Repeated),
            _ => None,
        }
    }

    pub(crate) fn is_repeated(self) -> bool {
        matches!(self, Label::Repeated)
    }
}

// Lowering from the decoded value tree. The shapes are guaranteed by the
// meta-schema (message fields decode to Message values, repeated fields to
// List values), so mismatches are simply dropped.

fn message_list<'a>(fields: &'a FieldMap, name: &str) -> impl Iterator<Item = &'a FieldMap> {
    let items = match fields.get(name) {
        Some(Value::List(items)) => items.as_slice(),
        _ => &[],
    };
    items.iter().filter_map(Value::as_message)
}

fn string_field(fields: &FieldMap, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_string)
}

fn int32_field(fields: &FieldMap, name: &str) -> Option<i32> {
    fields.get(name).and_then(Value::as_i32)
}

impl FileDescriptorSet {
    pub(crate) fn from_fields(fields: &FieldMap) -> Self {
        FileDescriptorSet {
            file: message_list(fields, "file")
                .map(FileDescriptorProto::from_fields)
                .collect(),
        }
    }
}

impl FileDescriptorProto {
    fn from_fields(fields: &FieldMap) -> Self {
        FileDescriptorProto {
            package: string_field(fields, "package"),
            message_type: message_list(fields, "message_type")
                .map(DescriptorProto::from_fields)
                .collect(),
            enum_type: message_list(fields, "enum_type")
                .map(EnumDescriptorProto::from_fields)
                .collect(),
        }
    }
}

impl DescriptorProto {
    fn from_fields(fields: &FieldMap) -> Self {
        DescriptorProto {
            name: string_field(fields, "name"),
            field: message_list(fields, "field")
                .map(FieldDescriptorProto::from_fields)
                .collect(),
            nested_type: message_list(fields, "nested_type")
                .map(DescriptorProto::from_fields)
                .collect(),
            enum_type: message_list(fields, "enum_type")
                .map(EnumDescriptorProto::from_fields)
                .collect(),
        }
    }
}

impl FieldDescriptorProto {
    fn from_fields(fields: &FieldMap) -> Self {
        FieldDescriptorProto {
            name: string_field(fields, "name"),
            number: int32_field(fields, "number"),
            label: int32_field(fields, "label"),
            r#type: int32_field(fields, "type"),
            type_name: string_field(fields, "type_name"),
            default_value: string_field(fields, "default_value"),
        }
    }
}

impl EnumDescriptorProto {
    fn from_fields(fields: &FieldMap) -> Self {
        EnumDescriptorProto {
            name: string_field(fields, "name"),
            value: message_list(fields, "value")
                .map(EnumValueDescriptorProto::from_fields)
                .collect(),
        }
    }
}

impl EnumValueDescriptorProto {
    fn from_fields(fields: &FieldMap) -> Self {
        EnumValueDescriptorProto {
            name: string_field(fields, "name"),
            number: int32_field(fields, "number"),
        }
    }
}
