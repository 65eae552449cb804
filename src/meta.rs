//! The statically-constructed meta-schema: a descriptor of descriptors.
//!
//! A serialized schema is itself a protobuf message
//! (`google.protobuf.FileDescriptorSet`), so descriptor bytes are decoded by
//! the same codec engine as user messages. Building the meta-schema directly
//! in code, rather than decoding it from bytes, breaks the bootstrapping
//! cycle.
//!
//! The `label` and `type` fields are declared `int32` here even though
//! descriptor.proto declares them as enums; the two are wire-identical and
//! the raw numbers are what [`crate::descriptor`] wants anyway. Descriptor
//! fields this model does not carry (options, oneofs, services, source
//! info) fall to the codec's unknown-field skip path.

use std::sync::OnceLock;

use crate::descriptor::Label;
use crate::schema::{FieldDescriptor, FieldKind, MessageDescriptor, Schema};

/// Index of `google.protobuf.FileDescriptorSet` in the meta-schema.
pub(crate) const FILE_DESCRIPTOR_SET: usize = 0;
const FILE_DESCRIPTOR_PROTO: usize = 1;
const DESCRIPTOR_PROTO: usize = 2;
const ENUM_DESCRIPTOR_PROTO: usize = 3;
const FIELD_DESCRIPTOR_PROTO: usize = 4;
const ENUM_VALUE_DESCRIPTOR_PROTO: usize = 5;

/// The schema the descriptor decoder runs against.
pub(crate) fn meta_schema() -> &'static Schema {
    static META: OnceLock<Schema> = OnceLock::new();
    META.get_or_init(build)
}

fn optional(name: &str, number: u32, kind: FieldKind) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        number,
        label: Label::Optional,
        kind,
    }
}

fn repeated(name: &str, number: u32, kind: FieldKind) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        number,
        label: Label::Repeated,
        kind,
    }
}

fn message(full_name: &str, fields: Vec<FieldDescriptor>) -> MessageDescriptor {
    MessageDescriptor::new(full_name.to_string(), fields)
}

fn build() -> Schema {
    let messages = vec![
        message(
            "google.protobuf.FileDescriptorSet",
            vec![repeated("file", 1, FieldKind::Message(FILE_DESCRIPTOR_PROTO))],
        ),
        message(
            "google.protobuf.FileDescriptorProto",
            vec![
                optional("name", 1, FieldKind::String),
                optional("package", 2, FieldKind::String),
                repeated("message_type", 4, FieldKind::Message(DESCRIPTOR_PROTO)),
                repeated("enum_type", 5, FieldKind::Message(ENUM_DESCRIPTOR_PROTO)),
            ],
        ),
        message(
            "google.protobuf.DescriptorProto",
            vec![
                optional("name", 1, FieldKind::String),
                repeated("field", 2, FieldKind::Message(FIELD_DESCRIPTOR_PROTO)),
                repeated("nested_type", 3, FieldKind::Message(DESCRIPTOR_PROTO)),
                repeated("enum_type", 4, FieldKind::Message(ENUM_DESCRIPTOR_PROTO)),
            ],
        ),
        message(
            "google.protobuf.EnumDescriptorProto",
            vec![
                optional("name", 1, FieldKind::String),
                repeated("value", 2, FieldKind::Message(ENUM_VALUE_DESCRIPTOR_PROTO)),
            ],
        ),
        message(
            "google.protobuf.FieldDescriptorProto",
            vec![
                optional("name", 1, FieldKind::String),
                optional("number", 3, FieldKind::Int32),
                optional("label", 4, FieldKind::Int32),
                optional("type", 5, FieldKind::Int32),
                optional("type_name", 6, FieldKind::String),
                optional("default_value", 7, FieldKind::String),
            ],
        ),
        message(
            "google.protobuf.EnumValueDescriptorProto",
            vec![
                optional("name", 1, FieldKind::String),
                optional("number", 2, FieldKind::Int32),
            ],
        ),
    ];

    Schema::from_parts(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_schema_indices_line_up() {
        let meta = meta_schema();

        let expected = [
            (FILE_DESCRIPTOR_SET, "google.protobuf.FileDescriptorSet"),
            (FILE_DESCRIPTOR_PROTO, "google.protobuf.FileDescriptorProto"),
            (DESCRIPTOR_PROTO, "google.protobuf.DescriptorProto"),
            (ENUM_DESCRIPTOR_PROTO, "google.protobuf.EnumDescriptorProto"),
            (FIELD_DESCRIPTOR_PROTO, "google.protobuf.FieldDescriptorProto"),
            (
                ENUM_VALUE_DESCRIPTOR_PROTO,
                "google.protobuf.EnumValueDescriptorProto",
            ),
        ];
        for (index, name) in expected {
            assert_eq!(meta.messages[index].full_name, name);
        }
    }

    #[test]
    fn test_meta_message_references_point_at_their_targets() {
        let meta = meta_schema();

        let set = &meta.messages[FILE_DESCRIPTOR_SET];
        let file = set.field_by_number(1).unwrap();
        assert!(file.label.is_repeated());
        assert_eq!(file.kind, FieldKind::Message(FILE_DESCRIPTOR_PROTO));

        let field_proto = &meta.messages[FIELD_DESCRIPTOR_PROTO];
        assert_eq!(field_proto.field_by_number(3).unwrap().name, "number");
        assert_eq!(field_proto.field_by_number(3).unwrap().kind, FieldKind::Int32);
        assert_eq!(field_proto.field_by_number(6).unwrap().name, "type_name");
    }
}
