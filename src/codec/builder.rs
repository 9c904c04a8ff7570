//! Codec builder.

use std::sync::Arc;

use super::Codec;
use super::registry::{Extension, Registry};
use crate::error::Result;
use crate::ext;
use crate::reconstruct::{ApplyState, Namespace, NamespaceResolver, Reconstruct, SetState};

/// Builder for configuring a [`Codec`].
///
/// Extensions are registered here and nowhere else, so a built codec's tag
/// table never changes while it is in use.
#[derive(Default)]
pub struct CodecBuilder {
    extensions: Vec<Arc<dyn Extension>>,
    resolver: Option<Arc<dyn NamespaceResolver>>,
    default_reconstructor: Option<Arc<dyn Reconstruct>>,
    state_applier: Option<Arc<dyn ApplyState>>,
}

impl CodecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resolver for type references and named reconstructors.
    pub fn resolver(mut self, resolver: impl NamespaceResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets the reconstructor used when an object record carries no explicit
    /// one.
    pub fn default_reconstructor(mut self, reconstructor: impl Reconstruct + 'static) -> Self {
        self.default_reconstructor = Some(Arc::new(reconstructor));
        self
    }

    /// Sets how decoded state is applied to reconstructed objects.
    pub fn state_applier(mut self, applier: impl ApplyState + 'static) -> Self {
        self.state_applier = Some(Arc::new(applier));
        self
    }

    /// Registers an extension codec.
    pub fn extension(mut self, ext: impl Extension) -> Self {
        self.extensions.push(Arc::new(ext));
        self
    }

    /// Registers the bundled MAPPROXY and MEMVIEW extensions.
    pub fn standard_extensions(mut self) -> Self {
        self.extensions.extend(ext::standard());
        self
    }

    /// Builds the codec. Fails if two extensions claim the same tag or type,
    /// or an extension claims a built-in tag.
    pub fn build(self) -> Result<Codec> {
        let mut registry = Registry::default();
        for ext in self.extensions {
            registry.register(ext)?;
        }
        Ok(Codec {
            registry,
            resolver: self
                .resolver
                .unwrap_or_else(|| Arc::new(Namespace::new())),
            default_reconstructor: self.default_reconstructor,
            state_applier: self.state_applier.unwrap_or_else(|| Arc::new(SetState)),
        })
    }
}
