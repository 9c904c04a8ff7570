//! Extension codecs and the tag registry.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Decoder, Encoder, tag};
use crate::error::{CodecError, Result};
use crate::types::{Object, Value};

/// A codec for one concrete object type under its own tag.
///
/// The encoder selects an extension by the exact [`TypeId`] of an object, so
/// wrappers and look-alike types are never routed to it by accident.
pub trait Extension: Send + Sync + 'static {
    /// Tag byte written before the payload.
    fn tag(&self) -> u8;

    fn name(&self) -> &'static str;

    /// The concrete type this extension encodes.
    fn handles(&self) -> TypeId;

    /// Writes the payload. The tag byte has already been written.
    fn encode(&self, object: &dyn Object, enc: &mut Encoder<'_>) -> Result<()>;

    /// Reads the payload written by [`encode`](Extension::encode).
    fn decode(&self, dec: &mut Decoder<'_>) -> Result<Value>;
}

/// Registered extensions, indexed both ways.
#[derive(Default)]
pub(crate) struct Registry {
    by_tag: HashMap<u8, Arc<dyn Extension>>,
    by_type: HashMap<TypeId, Arc<dyn Extension>>,
}

impl Registry {
    pub(crate) fn register(&mut self, ext: Arc<dyn Extension>) -> Result<()> {
        let t = ext.tag();
        if tag::is_builtin(t) {
            return Err(CodecError::Registration(format!(
                "tag {t} is reserved for a built-in type"
            )));
        }
        if let Some(existing) = self.by_tag.get(&t) {
            return Err(CodecError::Registration(format!(
                "tag {t} is already claimed by {}",
                existing.name()
            )));
        }
        if let Some(existing) = self.by_type.get(&ext.handles()) {
            return Err(CodecError::Registration(format!(
                "{} and {} handle the same type",
                existing.name(),
                ext.name()
            )));
        }
        tracing::debug!(tag = t, name = ext.name(), "registered extension codec");
        self.by_type.insert(ext.handles(), ext.clone());
        self.by_tag.insert(t, ext);
        Ok(())
    }

    /// The bundled extensions, known not to conflict.
    pub(crate) fn standard() -> Self {
        let mut registry = Self::default();
        for ext in crate::ext::standard() {
            registry.by_type.insert(ext.handles(), ext.clone());
            registry.by_tag.insert(ext.tag(), ext);
        }
        registry
    }

    pub(crate) fn by_tag(&self, t: u8) -> Option<&dyn Extension> {
        self.by_tag.get(&t).map(|ext| &**ext)
    }

    pub(crate) fn by_type(&self, id: TypeId) -> Option<&dyn Extension> {
        self.by_type.get(&id).map(|ext| &**ext)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_tag.len()
    }
}
