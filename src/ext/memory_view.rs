//! Typed byte buffers (tag 15).

use std::any::TypeId;

use crate::codec::{Decoder, Encoder, Extension, tag};
use crate::error::{CodecError, Result};
use crate::types::{Object, Reduce, Reduction, Value};

/// A contiguous buffer of fixed-size items described by a single-item
/// struct format such as `"B"`, `"<i"` or `"d"`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryView {
    format: String,
    data: Vec<u8>,
}

impl MemoryView {
    /// Fails if the format is not a single known item code, or if `data` is
    /// not a whole number of items.
    pub fn new(format: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let format = format.into();
        let size = item_size(&format)?;
        if data.len() % size != 0 {
            return Err(CodecError::InvalidEncoding(format!(
                "{} bytes is not a multiple of the {size}-byte item size of {format:?}",
                data.len()
            )));
        }
        Ok(Self { format, data })
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn item_size(&self) -> usize {
        // Validated in `new`.
        item_size(&self.format).unwrap_or(1)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.data.len() / self.item_size()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl Reduce for MemoryView {
    fn reduce(&self) -> Option<Reduction> {
        None
    }
}

/// Size in bytes of one item of a struct format.
fn item_size(format: &str) -> Result<usize> {
    let code = format.strip_prefix(['@', '=', '<', '>', '!']).unwrap_or(format);
    let size = match code {
        "x" | "c" | "b" | "B" | "?" => 1,
        "h" | "H" | "e" => 2,
        "i" | "I" | "l" | "L" | "f" => 4,
        "q" | "Q" | "n" | "N" | "P" | "d" => 8,
        _ => {
            return Err(CodecError::InvalidEncoding(format!(
                "unsupported memoryview format {format:?}"
            )));
        }
    };
    Ok(size)
}

/// Encodes [`MemoryView`] as its format string and bytes under tag 15.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryViewCodec;

impl Extension for MemoryViewCodec {
    fn tag(&self) -> u8 {
        tag::MEMVIEW
    }

    fn name(&self) -> &'static str {
        "memoryview"
    }

    fn handles(&self) -> TypeId {
        TypeId::of::<MemoryView>()
    }

    fn encode(&self, object: &dyn Object, enc: &mut Encoder<'_>) -> Result<()> {
        let view = object
            .as_any()
            .downcast_ref::<MemoryView>()
            .ok_or_else(|| CodecError::UnsupportedType(object.type_name().to_owned()))?;
        enc.put_str(&view.format);
        enc.put_bytes(&view.data);
        Ok(())
    }

    fn decode(&self, dec: &mut Decoder<'_>) -> Result<Value> {
        let format = dec.read_str()?;
        let data = dec.read_bytes()?;
        Ok(Value::object(MemoryView::new(format, data)?))
    }
}
