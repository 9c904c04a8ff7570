//! Recursive decoding: bytes → `Value`.

use super::{Codec, Dispatch, generic, tag};
use crate::error::{CodecError, Result};
use crate::source::Source;
use crate::types::{Complex, Dict, TypeRef, Value};
use crate::varint::{self, Int};

/// Upper bound on capacity reserved up front for a decoded sequence. Counts
/// come off the wire, so larger collections grow as items actually arrive.
const PREALLOC_LIMIT: usize = 1024;

/// Reads tagged values from a [`Source`].
///
/// Each call to [`decode`](Decoder::decode) consumes exactly the bytes the
/// matching encoder wrote, so consecutive values can be read back to back.
///
/// Recursion follows the nesting of the input and is not bounded. Untrusted
/// input with deeply nested containers or object records can exhaust the
/// stack.
pub struct Decoder<'a> {
    codec: &'a Codec,
    src: &'a mut dyn Source,
}

impl<'a> Decoder<'a> {
    pub fn new(codec: &'a Codec, src: &'a mut dyn Source) -> Self {
        Self { codec, src }
    }

    pub fn codec(&self) -> &'a Codec {
        self.codec
    }

    /// Decodes one tagged value.
    pub fn decode(&mut self) -> Result<Value> {
        let t = self.src.take_u8()?;
        let codec = self.codec;
        match codec.decoder_for(t)? {
            Dispatch::Builtin(t) => self.decode_builtin(t),
            Dispatch::Extension(ext) => ext.decode(self),
        }
    }

    fn decode_builtin(&mut self, t: u8) -> Result<Value> {
        match t {
            tag::INT => self.read_int(),
            tag::FLOAT => Ok(Value::Float(self.read_float()?)),
            tag::COMPLEX => {
                let re = self.read_float()?;
                let im = self.read_float()?;
                Ok(Value::Complex(Complex { re, im }))
            }
            tag::BYTES => Ok(Value::Bytes(self.read_bytes()?)),
            tag::STR => Ok(Value::Str(self.read_str()?)),
            tag::TUPLE => Ok(Value::Tuple(self.read_sequence()?)),
            tag::LIST => Ok(Value::List(self.read_sequence()?)),
            tag::SET => Ok(Value::Set(self.read_sequence()?)),
            tag::DICT => Ok(Value::Dict(self.read_dict()?)),
            tag::BOOL => Ok(Value::Bool(self.read_bool()?)),
            tag::TYPE => {
                let type_ref = self.read_type_ref()?;
                // Fail here rather than at first use of the reference.
                self.codec.resolve(&type_ref)?;
                Ok(Value::Type(type_ref))
            }
            tag::NONE => Ok(Value::None),
            tag::OBJ => generic::decode_generic(self),
            other => Err(CodecError::UnknownTag(other)),
        }
    }

    /// Reads a signed varint as an int value.
    pub fn read_int(&mut self) -> Result<Value> {
        Ok(match varint::decode_int(&mut *self.src)? {
            Int::Small(i) => Value::Int(i),
            Int::Big(i) => Value::BigInt(i),
        })
    }

    /// Reads a signed varint that must fit in an `i64`.
    pub fn read_signed(&mut self) -> Result<i64> {
        varint::decode_i64(&mut *self.src)
    }

    /// Reads an unsigned varint that must fit in a `u64`.
    pub fn read_unsigned(&mut self) -> Result<u64> {
        varint::decode_u64(&mut *self.src)
    }

    /// Reads a length or count prefix.
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_unsigned()?;
        usize::try_from(len)
            .map_err(|_| CodecError::InvalidEncoding(format!("length {len} does not fit in memory")))
    }

    pub fn read_float(&mut self) -> Result<f64> {
        let mut raw = [0u8; 8];
        self.src.take_into(&mut raw)?;
        Ok(f64::from_le_bytes(raw))
    }

    /// Reads a single 0/1 byte.
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.src.take_u8()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            b => Err(CodecError::InvalidEncoding(format!(
                "invalid bool byte: 0x{b:02X}"
            ))),
        }
    }

    /// Reads length-prefixed raw bytes.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len()?;
        self.src.take_vec(len)
    }

    /// Reads length-prefixed UTF-8.
    pub fn read_str(&mut self) -> Result<String> {
        let data = self.read_bytes()?;
        String::from_utf8(data)
            .map_err(|e| CodecError::InvalidEncoding(format!("invalid UTF-8 string: {e}")))
    }

    /// Reads a count followed by that many tagged values.
    pub fn read_sequence(&mut self) -> Result<Vec<Value>> {
        let len = self.read_len()?;
        let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            items.push(self.decode()?);
        }
        Ok(items)
    }

    /// Reads a count followed by that many key, value pairs.
    pub fn read_dict(&mut self) -> Result<Dict> {
        let len = self.read_len()?;
        let mut entries = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            let key = self.decode()?;
            let value = self.decode()?;
            entries.push((key, value));
        }
        Ok(entries)
    }

    fn read_type_ref(&mut self) -> Result<TypeRef> {
        let namespace = self.read_str()?;
        let name = self.read_str()?;
        Ok(TypeRef { namespace, name })
    }
}
