//! Read-only mapping views (tag 14).

use std::any::TypeId;

use crate::codec::{Decoder, Encoder, Extension, tag};
use crate::error::{CodecError, Result};
use crate::types::{Dict, Object, Reduce, Reduction, Value};

/// A read-only view of a mapping.
///
/// Has no reduction of its own; it only travels through [`MappingProxyCodec`].
#[derive(Debug, Clone, PartialEq)]
pub struct MappingProxy {
    entries: Dict,
}

impl MappingProxy {
    pub fn new(entries: Dict) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Dict {
        self.entries
    }
}

impl Reduce for MappingProxy {
    fn reduce(&self) -> Option<Reduction> {
        None
    }
}

/// Encodes [`MappingProxy`] as a dict payload under tag 14.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingProxyCodec;

impl Extension for MappingProxyCodec {
    fn tag(&self) -> u8 {
        tag::MAPPROXY
    }

    fn name(&self) -> &'static str {
        "mappingproxy"
    }

    fn handles(&self) -> TypeId {
        TypeId::of::<MappingProxy>()
    }

    fn encode(&self, object: &dyn Object, enc: &mut Encoder<'_>) -> Result<()> {
        let proxy = object
            .as_any()
            .downcast_ref::<MappingProxy>()
            .ok_or_else(|| CodecError::UnsupportedType(object.type_name().to_owned()))?;
        enc.put_dict(&proxy.entries)
    }

    fn decode(&self, dec: &mut Decoder<'_>) -> Result<Value> {
        Ok(Value::object(MappingProxy::new(dec.read_dict()?)))
    }
}
