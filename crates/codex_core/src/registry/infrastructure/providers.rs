//! Metadata provider capability table.
//!
//! A provider identifier selects which off-chain document, if any, backs a
//! Record's human-readable content. Only providers registered with
//! [`ProviderCapability::RichMetadata`] materialize a Metadata document; the
//! others persist hashes only.
//!
//! Lookups for identifiers absent from the table are answered according to
//! the `strict` flag: strict tables reject them, lenient tables treat them
//! as hash-only providers and let the caller log the fallback.

use std::collections::HashMap;

/// What the registry does with the content of a given provider.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ProviderCapability {
    /// Metadata document exists and pending updates are committed on modify
    RichMetadata,
    /// Only the on-chain hashes are mirrored
    HashesOnly,
}

/// Result of a capability lookup.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ProviderLookup {
    /// Provider is registered
    Known(ProviderCapability),
    /// Provider is unregistered and the table is lenient
    Fallback(ProviderCapability),
    /// Provider is unregistered and the table is strict
    Rejected,
}

#[derive(Debug, Clone)]
pub struct ProviderTable {
    capabilities: HashMap<String, ProviderCapability>,
    strict: bool,
}

impl Default for ProviderTable {
    /// Provider `"1"` is the registry's own metadata service.
    fn default() -> Self {
        Self {
            capabilities: HashMap::from([("1".to_string(), ProviderCapability::RichMetadata)]),
            strict: false,
        }
    }
}

impl ProviderTable {
    /// Empty lenient table.
    pub fn new() -> Self {
        Self { capabilities: HashMap::new(), strict: false }
    }

    pub fn with_provider(
        mut self,
        provider_id: impl Into<String>,
        capability: ProviderCapability,
    ) -> Self {
        self.capabilities.insert(provider_id.into(), capability);
        self
    }

    pub fn with_strict(self, strict: bool) -> Self {
        Self { strict, ..self }
    }

    pub fn lookup(&self, provider_id: &str) -> ProviderLookup {
        match self.capabilities.get(provider_id) {
            Some(capability) => ProviderLookup::Known(*capability),
            None if self.strict => ProviderLookup::Rejected,
            None => ProviderLookup::Fallback(ProviderCapability::HashesOnly),
        }
    }

    pub fn supports_rich_metadata(&self, provider_id: &str) -> bool {
        matches!(self.lookup(provider_id), ProviderLookup::Known(ProviderCapability::RichMetadata))
    }
}
