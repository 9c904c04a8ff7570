//! Collaborators used by the generic object path.
//!
//! The codec never builds user objects itself. It asks a [`Reconstruct`] to
//! turn decoded arguments into a value, finds named reconstructors through a
//! [`NamespaceResolver`], and hands decoded state to an [`ApplyState`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{CodecError, Result};
use crate::types::{Reduce, TypeRef, Value};

/// Something callable with decoded arguments that produces a value.
pub trait Reconstruct: Send + Sync {
    fn reconstruct(&self, args: Vec<Value>) -> Result<Value>;
}

impl<F> Reconstruct for F
where
    F: Fn(Vec<Value>) -> Result<Value> + Send + Sync,
{
    fn reconstruct(&self, args: Vec<Value>) -> Result<Value> {
        self(args)
    }
}

/// Maps a (namespace, name) pair to a reconstructor.
///
/// Used when decoding type references and named reconstructors.
pub trait NamespaceResolver: Send + Sync {
    fn resolve(&self, namespace: &str, name: &str) -> Option<Arc<dyn Reconstruct>>;
}

/// A map-backed [`NamespaceResolver`].
#[derive(Clone, Default)]
pub struct Namespace {
    entries: HashMap<TypeRef, Arc<dyn Reconstruct>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines `namespace.name` as a closure reconstructor.
    pub fn define<F>(mut self, namespace: &str, name: &str, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert(TypeRef::new(namespace, name), f);
        self
    }

    /// Inserts or replaces a reconstructor.
    pub fn insert(&mut self, type_ref: TypeRef, reconstructor: impl Reconstruct + 'static) {
        self.entries.insert(type_ref, Arc::new(reconstructor));
    }

    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.entries.contains_key(&TypeRef::new(namespace, name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NamespaceResolver for Namespace {
    fn resolve(&self, namespace: &str, name: &str) -> Option<Arc<dyn Reconstruct>> {
        self.entries.get(&TypeRef::new(namespace, name)).cloned()
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Applies decoded state to a freshly reconstructed value.
pub trait ApplyState: Send + Sync {
    fn apply_state(&self, target: Value, state: Value) -> Result<Value>;
}

/// Default [`ApplyState`]: forwards to [`Reduce::set_state`] on objects and
/// rejects every other target.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetState;

impl ApplyState for SetState {
    fn apply_state(&self, mut target: Value, state: Value) -> Result<Value> {
        match &mut target {
            Value::Object(obj) => obj.set_state(state)?,
            other => {
                return Err(CodecError::InvalidEncoding(format!(
                    "cannot apply state to a {} value",
                    other.kind()
                )));
            }
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reduction;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        hits: i64,
    }

    impl Reduce for Counter {
        fn reduce(&self) -> Option<Reduction> {
            Some(Reduction::with_default(Vec::new()).state(self.hits))
        }

        fn set_state(&mut self, state: Value) -> Result<()> {
            self.hits = state
                .as_int()
                .ok_or_else(|| CodecError::invalid("counter state must be an int"))?;
            Ok(())
        }
    }

    #[test]
    fn namespace_resolves_defined_names() {
        let ns = Namespace::new().define("math", "double", |args| {
            let n = args.first().and_then(Value::as_int).unwrap_or(0);
            Ok(Value::Int(n * 2))
        });
        assert!(ns.contains("math", "double"));
        assert!(!ns.contains("math", "triple"));
        assert_eq!(ns.len(), 1);

        let double = ns.resolve("math", "double").unwrap();
        assert_eq!(double.reconstruct(vec![Value::Int(21)]).unwrap(), Value::Int(42));
        assert!(ns.resolve("other", "double").is_none());
    }

    #[test]
    fn set_state_forwards_to_object() {
        let target = Value::object(Counter { hits: 0 });
        let applied = SetState.apply_state(target, Value::Int(3)).unwrap();
        assert_eq!(applied.downcast_ref::<Counter>(), Some(&Counter { hits: 3 }));
    }

    #[test]
    fn set_state_rejects_plain_values() {
        let err = SetState
            .apply_state(Value::List(Vec::new()), Value::Int(1))
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidEncoding(_)));
    }

    #[test]
    fn set_state_propagates_object_errors() {
        let target = Value::object(Counter { hits: 0 });
        assert!(SetState.apply_state(target, Value::from("nope")).is_err());
    }
}
