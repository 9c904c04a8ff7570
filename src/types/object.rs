//! User-defined objects and the reduce capability.

use std::any::Any;
use std::fmt;

use crate::error::{CodecError, Result};
use crate::reconstruct::Reconstruct;
use crate::types::{TypeRef, Value};

/// How to rebuild an object: a reconstructor, its arguments, and optional
/// state applied after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// `None` selects the codec's default reconstructor.
    pub reconstructor: Option<Value>,
    pub args: Vec<Value>,
    pub state: Option<Value>,
}

impl Reduction {
    /// A reduction through a named reconstructor, looked up by the decoding
    /// codec's [`NamespaceResolver`](crate::NamespaceResolver).
    pub fn new(reconstructor: TypeRef, args: Vec<Value>) -> Self {
        Self {
            reconstructor: Some(Value::Type(reconstructor)),
            args,
            state: None,
        }
    }

    /// A reduction through an inline reconstructor object. The object travels
    /// in the record itself and must expose
    /// [`Reduce::as_reconstructor`].
    pub fn inline(reconstructor: impl Object, args: Vec<Value>) -> Self {
        Self {
            reconstructor: Some(Value::object(reconstructor)),
            args,
            state: None,
        }
    }

    /// A reduction through the default reconstructor.
    pub fn with_default(args: Vec<Value>) -> Self {
        Self {
            reconstructor: None,
            args,
            state: None,
        }
    }

    /// Attaches post-construction state.
    pub fn state(mut self, state: impl Into<Value>) -> Self {
        self.state = Some(state.into());
        self
    }
}

/// The reduce capability: describes a value as (reconstructor, args, state).
///
/// Implement this for any type that should travel through the generic object
/// path. Returning `None` from [`reduce`](Reduce::reduce) makes the type
/// unencodable unless an extension codec is registered for it.
pub trait Reduce: fmt::Debug + Send + Sync + 'static {
    fn reduce(&self) -> Option<Reduction>;

    /// Applies decoded state to a freshly reconstructed object.
    fn set_state(&mut self, state: Value) -> Result<()> {
        let _ = state;
        Err(CodecError::InvalidEncoding(format!(
            "{} does not accept state",
            self.type_name()
        )))
    }

    /// The callable view of this object, for types that serve as inline
    /// reconstructors in other objects' reductions.
    fn as_reconstructor(&self) -> Option<&dyn Reconstruct> {
        None
    }

    /// Name used in error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Object-safe view of a [`Reduce`] type, implemented automatically for every
/// `Reduce + Clone + PartialEq` type.
pub trait Object: Reduce {
    fn clone_object(&self) -> Box<dyn Object>;
    fn eq_object(&self, other: &dyn Object) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Reduce + Clone + PartialEq> Object for T {
    fn clone_object(&self) -> Box<dyn Object> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn Object) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| o == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for Box<dyn Object> {
    fn clone(&self) -> Self {
        (**self).clone_object()
    }
}

impl PartialEq for Box<dyn Object> {
    fn eq(&self, other: &Self) -> bool {
        (**self).eq_object(&**other)
    }
}
