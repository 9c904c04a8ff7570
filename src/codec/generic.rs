//! Generic reconstruction: the OBJ fallback for objects without an extension.
//!
//! Payload layout, each slot written by the recursive encoder:
//!
//! ```text
//! [reconstructor | NONE] [count] [arg]* [state | NONE]
//! ```
//!
//! A NONE reconstructor selects the codec's default reconstructor. Otherwise
//! the slot holds either a type reference, resolved through the codec's
//! namespace, or an inline object that is itself callable. A NONE state means
//! nothing is applied after construction.

use std::sync::Arc;

use super::{Decoder, Encoder, tag};
use crate::error::{CodecError, Result};
use crate::reconstruct::Reconstruct;
use crate::types::{Object, Value};

/// Encodes `object` as an OBJ record using its reduction.
///
/// The object is reduced and its reconstructor checked before anything is
/// written, so an unsupported type leaves the sink untouched.
pub fn encode_generic(enc: &mut Encoder<'_>, object: &dyn Object) -> Result<()> {
    let reduction = object
        .reduce()
        .ok_or_else(|| CodecError::UnsupportedType(object.type_name().to_owned()))?;

    match &reduction.reconstructor {
        None | Some(Value::Type(_)) => {}
        Some(Value::Object(r)) if r.as_reconstructor().is_some() => {}
        Some(other) => {
            return Err(CodecError::UnsupportedType(format!(
                "{}: reconstructor must be a type reference or a callable object, got {}",
                object.type_name(),
                other.kind()
            )));
        }
    }

    enc.put_tag(tag::OBJ);
    enc.encode(reduction.reconstructor.as_ref().unwrap_or(&Value::None))?;
    enc.put_sequence(&reduction.args)?;
    enc.encode(reduction.state.as_ref().unwrap_or(&Value::None))
}

/// What a decoded reconstructor slot calls.
enum Callee {
    Default,
    Named(Arc<dyn Reconstruct>),
    Inline(Box<dyn Object>),
}

/// Decodes an OBJ payload (the tag has been consumed) and rebuilds the value.
pub fn decode_generic(dec: &mut Decoder<'_>) -> Result<Value> {
    let codec = dec.codec();

    let callee = match dec.decode()? {
        Value::None => Callee::Default,
        Value::Type(type_ref) => Callee::Named(codec.resolve(&type_ref)?),
        Value::Object(obj) if obj.as_reconstructor().is_some() => Callee::Inline(obj),
        other => {
            return Err(CodecError::InvalidEncoding(format!(
                "reconstructor must be a type reference or a callable object, got {}",
                other.kind()
            )));
        }
    };
    let args = dec.read_sequence()?;

    let value = match callee {
        Callee::Default => codec.reconstruct_default(args)?,
        Callee::Named(r) => r.reconstruct(args)?,
        Callee::Inline(obj) => obj
            .as_reconstructor()
            .ok_or_else(|| CodecError::UnsupportedType(obj.type_name().to_owned()))?
            .reconstruct(args)?,
    };

    // State is only read once the object exists.
    match dec.decode()? {
        Value::None => Ok(value),
        state => {
            tracing::trace!(kind = value.kind(), "applying object state");
            codec.apply_state(value, state)
        }
    }
}
