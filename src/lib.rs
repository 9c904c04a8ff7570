//! Stow: a self-describing tagged binary object codec.
//!
//! Every value is written as a one-byte type tag followed by its payload.
//! Integers and lengths use LEB128 varints, so integers of any size round-trip
//! exactly. Values that are not built-in shapes either go through a registered
//! extension codec or are reduced to a reconstructor, arguments and optional
//! state and rebuilt on decode.
//!
//! # Architecture
//!
//! - **`varint`**: Unsigned and signed LEB128 over arbitrary-precision integers
//! - **`types`**: `Value`, and the `Reduce`/`Object` traits for user types
//! - **`codec`**: Tag table, encoder, decoder, extension registry and builder
//! - **`reconstruct`**: Collaborators for rebuilding objects on decode
//! - **`ext`**: Bundled extensions (mapping proxies and memory views)
//! - **`stream`**: Async value reader and writer over tokio transports
//!
//! # Example
//!
//! ```
//! use stow::Value;
//!
//! let bytes = stow::dump(&Value::List(vec![Value::Int(1), Value::Int(2)])).unwrap();
//! assert_eq!(&bytes[..], &[0x05, 0x02, 0x00, 0x01, 0x00, 0x02]);
//! assert_eq!(stow::load(&bytes).unwrap(), Value::List(vec![Value::Int(1), Value::Int(2)]));
//! ```

use std::io::{Read, Write};
use std::sync::OnceLock;

use bytes::Bytes;

pub mod codec;
pub mod error;
pub mod ext;
pub mod reconstruct;
pub mod source;
pub mod stream;
pub mod types;
pub mod varint;

pub use codec::{Codec, CodecBuilder, Decoder, Encoder, Extension};
pub use error::{CodecError, Result};
pub use reconstruct::{ApplyState, Namespace, NamespaceResolver, Reconstruct, SetState};
pub use types::{Complex, Dict, Object, Reduce, Reduction, TypeRef, Value};

/// The shared codec behind the free functions: bundled extensions, an empty
/// namespace and no default reconstructor.
pub fn default_codec() -> &'static Codec {
    static DEFAULT: OnceLock<Codec> = OnceLock::new();
    DEFAULT.get_or_init(Codec::default)
}

/// Encodes `value` with the default codec.
pub fn dump(value: &Value) -> Result<Bytes> {
    default_codec().dump(value)
}

/// Decodes the first value in `data` with the default codec. Trailing bytes
/// are ignored.
pub fn load(data: &[u8]) -> Result<Value> {
    default_codec().load(data)
}

/// Encodes `value` with the default codec and writes it to `writer`.
pub fn dump_to(writer: impl Write, value: &Value) -> Result<()> {
    default_codec().dump_to(writer, value)
}

/// Decodes one value from `reader` with the default codec, leaving any
/// following bytes unread.
pub fn load_from(reader: impl Read) -> Result<Value> {
    default_codec().load_from(reader)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use num_bigint::BigInt;

    use super::*;

    #[test]
    fn dump_int() {
        assert_eq!(&dump(&Value::Int(42)).unwrap()[..], &[0x00, 0x2A]);
    }

    #[test]
    fn dump_str() {
        assert_eq!(&dump(&Value::from("hi")).unwrap()[..], &[0x03, 0x02, 0x68, 0x69]);
    }

    #[test]
    fn dump_list() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(
            &dump(&list).unwrap()[..],
            &[0x05, 0x02, 0x00, 0x01, 0x00, 0x02]
        );
    }

    #[test]
    fn dump_dict() {
        let dict = Value::Dict(vec![(Value::from("a"), Value::Int(1))]);
        assert_eq!(
            &dump(&dict).unwrap()[..],
            &[0x07, 0x01, 0x03, 0x01, 0x61, 0x00, 0x01]
        );
    }

    #[test]
    fn big_integers_round_trip() {
        let big: BigInt = "-123456789012345678901234567890123456789".parse().unwrap();
        let value = Value::big(big.clone());
        assert_eq!(value, Value::BigInt(big));
        assert_eq!(load(&dump(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn nested_structure_round_trips() {
        let value = Value::Dict(vec![
            (
                Value::from("items"),
                Value::List(vec![Value::Tuple(vec![Value::Int(1), Value::from("one")])]),
            ),
            (Value::Int(2), Value::Set(vec![Value::Bool(false), Value::None])),
            (Value::from("raw"), Value::Bytes(vec![0, 255])),
        ]);
        assert_eq!(load(&dump(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn reader_stops_after_first_value() {
        let mut data = Vec::new();
        dump_to(&mut data, &Value::from("first")).unwrap();
        dump_to(&mut data, &Value::Int(2)).unwrap();

        let mut reader = Cursor::new(data);
        assert_eq!(load_from(&mut reader).unwrap(), Value::from("first"));
        assert_eq!(load_from(&mut reader).unwrap(), Value::Int(2));
        assert!(matches!(load_from(&mut reader), Err(CodecError::UnexpectedEof)));
    }

    #[test]
    fn default_codec_is_shared() {
        assert!(std::ptr::eq(default_codec(), default_codec()));
    }
}
