//! Recursive encoding: `Value` → bytes.

use bytes::{BufMut, BytesMut};
use num_bigint::BigInt;

use super::{Codec, generic};
use crate::error::Result;
use crate::types::{Object, Value};
use crate::varint;

/// Writes tagged values into a buffer.
///
/// Nothing is rolled back on failure: after an error the buffer may hold a
/// truncated record. [`Codec::dump`] encodes into a fresh buffer, so only
/// callers driving an `Encoder` directly can observe this.
///
/// There is no cycle detection. An object whose reduction yields itself,
/// directly or through its arguments, recurses until the stack is exhausted.
pub struct Encoder<'a> {
    codec: &'a Codec,
    buf: &'a mut BytesMut,
}

impl<'a> Encoder<'a> {
    pub fn new(codec: &'a Codec, buf: &'a mut BytesMut) -> Self {
        Self { codec, buf }
    }

    pub fn codec(&self) -> &'a Codec {
        self.codec
    }

    /// Encodes one tagged value, recursing into children.
    pub fn encode(&mut self, value: &Value) -> Result<()> {
        let t = self.codec.tag_for(value);
        if let Value::Object(obj) = value {
            return self.encode_object(t, &**obj);
        }

        self.put_tag(t);
        match value {
            // Objects were routed above.
            Value::None | Value::Object(_) => {}
            Value::Bool(b) => self.buf.put_u8(u8::from(*b)),
            Value::Int(i) => self.put_signed(*i),
            Value::BigInt(i) => self.put_signed_big(i),
            Value::Float(f) => self.put_float(*f),
            Value::Complex(c) => {
                self.put_float(c.re);
                self.put_float(c.im);
            }
            Value::Bytes(b) => self.put_bytes(b),
            Value::Str(s) => self.put_str(s),
            Value::Tuple(items) | Value::List(items) | Value::Set(items) => {
                self.put_sequence(items)?;
            }
            Value::Dict(entries) => self.put_dict(entries)?,
            Value::Type(t) => {
                self.put_str(&t.namespace);
                self.put_str(&t.name);
            }
        }
        Ok(())
    }

    fn encode_object(&mut self, t: u8, obj: &dyn Object) -> Result<()> {
        let codec = self.codec;
        match codec.registry.by_tag(t) {
            Some(ext) => {
                self.put_tag(t);
                ext.encode(obj, self)
            }
            None => generic::encode_generic(self, obj),
        }
    }

    pub fn put_tag(&mut self, t: u8) {
        self.buf.put_u8(t);
    }

    pub fn put_signed(&mut self, value: i64) {
        varint::encode_i64(&mut *self.buf, value);
    }

    pub fn put_signed_big(&mut self, value: &BigInt) {
        varint::encode_signed(&mut *self.buf, value);
    }

    pub fn put_unsigned(&mut self, value: u64) {
        varint::encode_u64(&mut *self.buf, value);
    }

    /// IEEE-754 double, little-endian.
    pub fn put_float(&mut self, value: f64) {
        self.buf.put_f64_le(value);
    }

    /// Length-prefixed raw bytes.
    pub fn put_bytes(&mut self, value: &[u8]) {
        self.put_unsigned(value.len() as u64);
        self.buf.put_slice(value);
    }

    /// Length-prefixed UTF-8 (length in bytes, not chars).
    pub fn put_str(&mut self, value: &str) {
        self.put_bytes(value.as_bytes());
    }

    /// Count followed by each item, in order.
    pub fn put_sequence(&mut self, items: &[Value]) -> Result<()> {
        self.put_unsigned(items.len() as u64);
        for item in items {
            self.encode(item)?;
        }
        Ok(())
    }

    /// Count followed by key, value pairs, in order.
    pub fn put_dict(&mut self, entries: &[(Value, Value)]) -> Result<()> {
        self.put_unsigned(entries.len() as u64);
        for (key, value) in entries {
            self.encode(key)?;
            self.encode(value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tag;
    use crate::types::{Complex, Reduce, Reduction, TypeRef};

    fn encode(value: &Value) -> Vec<u8> {
        let codec = Codec::default();
        let mut buf = BytesMut::new();
        Encoder::new(&codec, &mut buf).encode(value).unwrap();
        buf.to_vec()
    }

    #[test]
    fn encode_none_and_bools() {
        assert_eq!(encode(&Value::None), [tag::NONE]);
        assert_eq!(encode(&Value::Bool(true)), [tag::BOOL, 0x01]);
        assert_eq!(encode(&Value::Bool(false)), [tag::BOOL, 0x00]);
    }

    #[test]
    fn encode_small_int() {
        assert_eq!(encode(&Value::Int(42)), [tag::INT, 0x2A]);
        assert_eq!(encode(&Value::Int(-1)), [tag::INT, 0x7F]);
        assert_eq!(encode(&Value::Int(128)), [tag::INT, 0x80, 0x01]);
    }

    #[test]
    fn encode_float_little_endian() {
        let bytes = encode(&Value::Float(1.5));
        assert_eq!(bytes[0], tag::FLOAT);
        assert_eq!(&bytes[1..], &1.5f64.to_le_bytes());
    }

    #[test]
    fn encode_complex_parts_in_order() {
        let bytes = encode(&Value::Complex(Complex::new(1.0, -2.0)));
        assert_eq!(bytes[0], tag::COMPLEX);
        assert_eq!(&bytes[1..9], &1.0f64.to_le_bytes());
        assert_eq!(&bytes[9..], &(-2.0f64).to_le_bytes());
    }

    #[test]
    fn encode_text_and_bytes() {
        assert_eq!(encode(&Value::from("hi")), [tag::STR, 0x02, 0x68, 0x69]);
        assert_eq!(encode(&Value::from("")), [tag::STR, 0x00]);
        assert_eq!(
            encode(&Value::Bytes(vec![0xDE, 0xAD])),
            [tag::BYTES, 0x02, 0xDE, 0xAD]
        );
        // Length counts UTF-8 bytes.
        assert_eq!(encode(&Value::from("é"))[1], 2);
    }

    #[test]
    fn encode_long_string_uses_multibyte_length() {
        let s = "a".repeat(200);
        let bytes = encode(&Value::Str(s));
        assert_eq!(&bytes[..3], &[tag::STR, 0xC8, 0x01]);
        assert_eq!(bytes.len(), 203);
    }

    #[test]
    fn encode_containers() {
        let items = vec![Value::Int(1), Value::Int(2)];
        assert_eq!(
            encode(&Value::List(items.clone())),
            [tag::LIST, 0x02, tag::INT, 0x01, tag::INT, 0x02]
        );
        assert_eq!(encode(&Value::Tuple(items.clone()))[0], tag::TUPLE);
        assert_eq!(encode(&Value::Set(items))[0], tag::SET);
        assert_eq!(encode(&Value::List(Vec::new())), [tag::LIST, 0x00]);
    }

    #[test]
    fn encode_dict_pairs() {
        let dict = Value::Dict(vec![(Value::from("a"), Value::Int(1))]);
        assert_eq!(
            encode(&dict),
            [tag::DICT, 0x01, tag::STR, 0x01, b'a', tag::INT, 0x01]
        );
    }

    #[test]
    fn encode_type_reference() {
        let bytes = encode(&Value::Type(TypeRef::new("m", "T")));
        assert_eq!(bytes, [tag::TYPE, 0x01, b'm', 0x01, b'T']);
    }

    #[test]
    fn encode_big_int() {
        let big = BigInt::from(u64::MAX);
        let bytes = encode(&Value::big(big));
        assert_eq!(bytes[0], tag::INT);
        // 64 magnitude bits plus a clear sign bit need ten groups.
        assert_eq!(bytes.len(), 11);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Opaque;

    impl Reduce for Opaque {
        fn reduce(&self) -> Option<Reduction> {
            None
        }
    }

    #[test]
    fn unreducible_object_is_unsupported() {
        let codec = Codec::default();
        let mut buf = BytesMut::new();
        let err = Encoder::new(&codec, &mut buf)
            .encode(&Value::object(Opaque))
            .unwrap_err();
        assert!(matches!(err, crate::CodecError::UnsupportedType(ref name) if name.contains("Opaque")));
    }

    #[test]
    fn failure_inside_container_leaves_prefix() {
        let codec = Codec::default();
        let mut buf = BytesMut::new();
        let value = Value::List(vec![Value::Int(7), Value::object(Opaque)]);
        assert!(Encoder::new(&codec, &mut buf).encode(&value).is_err());
        assert_eq!(&buf[..], &[tag::LIST, 0x02, tag::INT, 0x07]);
    }
}
