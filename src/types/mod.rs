//! Value types carried by the codec.

mod object;
mod value;

pub use object::{Object, Reduce, Reduction};
pub use value::{Complex, Dict, TypeRef, Value};
