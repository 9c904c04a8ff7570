//! Bundled extension codecs.
//!
//! - **`MappingProxy`** (tag 14): a read-only mapping, written as a dict payload.
//! - **`MemoryView`** (tag 15): a typed byte buffer, written as its format
//!   string followed by the raw bytes.

mod mapping_proxy;
mod memory_view;

use std::sync::Arc;

pub use mapping_proxy::{MappingProxy, MappingProxyCodec};
pub use memory_view::{MemoryView, MemoryViewCodec};

use crate::codec::Extension;

/// The extensions installed by [`Codec::default`](crate::Codec) and
/// [`CodecBuilder::standard_extensions`](crate::CodecBuilder::standard_extensions).
pub fn standard() -> Vec<Arc<dyn Extension>> {
    vec![Arc::new(MappingProxyCodec), Arc::new(MemoryViewCodec)]
}
