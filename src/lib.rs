//! Schema-driven protobuf codec.
//!
//! `protodyn` decodes and encodes [protobuf](https://protobuf.dev) messages
//! without generated code: a [`Schema`] is built at runtime from serialized
//! `FileDescriptorSet` bytes (the output of `protoc --descriptor_set_out`),
//! and each message type it contains can then [`parse`](MessageType::parse)
//! wire bytes into a dynamic [`Value`] map and
//! [`serialize`](MessageType::serialize) such a map back into the exact
//! bytes a compliant protobuf implementation would produce.
//!
//! The descriptor bytes are themselves a protobuf message, so schema
//! construction runs the same codec engine against a statically-built
//! meta-schema.
//!
//! ```
//! use protodyn::{Schema, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // A descriptor set declaring `message Pair { optional int32 id = 1; }`
//! // in package `demo`, as produced by protoc.
//! let descriptor_bytes: &[u8] = &[
//!     0x0A, 0x1A, // file[0], 26 bytes
//!     0x12, 0x04, b'd', b'e', b'm', b'o', // package "demo"
//!     0x22, 0x12, // message_type[0], 18 bytes
//!     0x0A, 0x04, b'P', b'a', b'i', b'r', // name "Pair"
//!     0x12, 0x0A, // field[0], 10 bytes
//!     0x0A, 0x02, b'i', b'd', // name "id"
//!     0x18, 0x01, // number 1
//!     0x20, 0x01, // label optional
//!     0x28, 0x05, // type int32
//! ];
//!
//! let schema = Schema::new(descriptor_bytes)?;
//! let pair = schema.message_type("demo.Pair").unwrap();
//!
//! let fields = pair.parse(&[0x08, 0x2A])?;
//! assert_eq!(fields["id"], Value::I32(42));
//!
//! assert_eq!(pair.serialize(&fields)?, vec![0x08, 0x2A]);
//! # Ok(())
//! # }
//! ```

pub mod error;
// Publically export `leb128` and `wire` because the primitives are useful
// on their own.
pub mod leb128;
pub mod wire;

mod codec;
mod descriptor;
mod meta;
mod schema;
mod value;

pub use error::{DecodeError, EncodeError, SchemaError};
pub use schema::{MessageType, Schema};
pub use value::{FieldMap, Value, MAX_SAFE_INTEGER};
