//! The tagged object codec.
//!
//! Every encoded value is a one-byte type tag followed by a tag-specific
//! payload. Containers and object records recurse, so a value tree is written
//! depth-first and read back in the same order. Integers and lengths are
//! LEB128 varints; floats are little-endian IEEE-754 doubles.

pub mod generic;
pub mod tag;

mod builder;
mod decode;
mod encode;
mod registry;

use std::any::Any;
use std::io::{Read, Write};
use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};

pub use builder::CodecBuilder;
pub use decode::Decoder;
pub use encode::Encoder;
pub use registry::Extension;

use crate::error::{CodecError, Result};
use crate::reconstruct::{ApplyState, Namespace, NamespaceResolver, Reconstruct, SetState};
use crate::source::IoSource;
use crate::types::{TypeRef, Value};
use registry::Registry;

/// How the decoder handles a tag byte.
pub enum Dispatch<'a> {
    Builtin(u8),
    Extension(&'a dyn Extension),
}

/// An immutable codec configuration: the extension registry plus the
/// collaborators used by the generic object path.
///
/// A `Codec` is `Send + Sync` and can be shared across threads; encoding and
/// decoding only borrow it.
pub struct Codec {
    registry: Registry,
    resolver: Arc<dyn NamespaceResolver>,
    default_reconstructor: Option<Arc<dyn Reconstruct>>,
    state_applier: Arc<dyn ApplyState>,
}

impl Default for Codec {
    /// The bundled extensions, an empty namespace and [`SetState`].
    fn default() -> Self {
        Self {
            registry: Registry::standard(),
            resolver: Arc::new(Namespace::new()),
            default_reconstructor: None,
            state_applier: Arc::new(SetState),
        }
    }
}

impl Codec {
    pub fn builder() -> CodecBuilder {
        CodecBuilder::new()
    }

    /// The tag `value` is written under.
    ///
    /// Objects with a registered extension get its tag; every other object
    /// falls back to OBJ.
    pub fn tag_for(&self, value: &Value) -> u8 {
        match value {
            Value::None => tag::NONE,
            Value::Bool(_) => tag::BOOL,
            Value::Int(_) | Value::BigInt(_) => tag::INT,
            Value::Float(_) => tag::FLOAT,
            Value::Complex(_) => tag::COMPLEX,
            Value::Bytes(_) => tag::BYTES,
            Value::Str(_) => tag::STR,
            Value::Tuple(_) => tag::TUPLE,
            Value::List(_) => tag::LIST,
            Value::Set(_) => tag::SET,
            Value::Dict(_) => tag::DICT,
            Value::Type(_) => tag::TYPE,
            Value::Object(obj) => self
                .registry
                .by_type(Any::type_id(obj.as_any()))
                .map_or(tag::OBJ, |ext| ext.tag()),
        }
    }

    /// Selects the decoder for a tag byte.
    pub fn decoder_for(&self, t: u8) -> Result<Dispatch<'_>> {
        if tag::is_builtin(t) {
            return Ok(Dispatch::Builtin(t));
        }
        match self.registry.by_tag(t) {
            Some(ext) => Ok(Dispatch::Extension(ext)),
            None => Err(CodecError::UnknownTag(t)),
        }
    }

    /// Finds the reconstructor a type reference names.
    pub fn resolve(&self, type_ref: &TypeRef) -> Result<Arc<dyn Reconstruct>> {
        self.resolver
            .resolve(&type_ref.namespace, &type_ref.name)
            .ok_or_else(|| CodecError::unresolved(&type_ref.namespace, &type_ref.name))
    }

    /// Rebuilds an object record that carried no explicit reconstructor.
    ///
    /// Without a configured default, the first argument must be a type
    /// reference; it is resolved and called with the remaining arguments.
    pub fn reconstruct_default(&self, args: Vec<Value>) -> Result<Value> {
        if let Some(reconstructor) = &self.default_reconstructor {
            return reconstructor.reconstruct(args);
        }
        let mut args = args.into_iter();
        match args.next() {
            Some(Value::Type(type_ref)) => self.resolve(&type_ref)?.reconstruct(args.collect()),
            Some(other) => Err(CodecError::InvalidEncoding(format!(
                "default reconstruction needs a type as first argument, got {}",
                other.kind()
            ))),
            None => Err(CodecError::invalid(
                "default reconstruction needs a type as first argument, got no arguments",
            )),
        }
    }

    /// Applies decoded state to a reconstructed value.
    pub fn apply_state(&self, target: Value, state: Value) -> Result<Value> {
        self.state_applier.apply_state(target, state)
    }

    /// Encodes `value` into a fresh buffer.
    pub fn dump(&self, value: &Value) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.dump_into(&mut buf, value)?;
        Ok(buf.freeze())
    }

    /// Appends the encoding of `value` to `buf`. On error `buf` may hold a
    /// partial record.
    pub fn dump_into(&self, buf: &mut BytesMut, value: &Value) -> Result<()> {
        let start = buf.len();
        Encoder::new(self, buf).encode(value)?;
        tracing::trace!(kind = value.kind(), len = buf.len() - start, "encoded value");
        Ok(())
    }

    /// Encodes `value` and writes it to `writer`.
    ///
    /// The value is fully encoded before anything is written, so an encoding
    /// failure leaves the writer untouched.
    pub fn dump_to(&self, mut writer: impl Write, value: &Value) -> Result<()> {
        let bytes = self.dump(value)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Decodes one value from the front of `data`. Trailing bytes are ignored.
    pub fn load(&self, data: &[u8]) -> Result<Value> {
        let mut cursor = data;
        let value = self.load_buf(&mut cursor)?;
        if !cursor.is_empty() {
            tracing::trace!(trailing = cursor.len(), "ignoring bytes after value");
        }
        Ok(value)
    }

    /// Decodes one value, advancing `buf` past exactly the bytes it used.
    pub fn load_buf(&self, buf: &mut impl Buf) -> Result<Value> {
        Decoder::new(self, buf)
            .decode()
            .inspect_err(|e| tracing::debug!(error = %e, "decode failed"))
    }

    /// Decodes one value from a blocking reader, consuming only its bytes.
    pub fn load_from(&self, reader: impl Read) -> Result<Value> {
        let mut src = IoSource::new(reader);
        Decoder::new(self, &mut src)
            .decode()
            .inspect_err(|e| tracing::debug!(error = %e, "decode failed"))
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("extensions", &self.registry.len())
            .field("default_reconstructor", &self.default_reconstructor.is_some())
            .finish_non_exhaustive()
    }
}
