//! Registry configuration.
//!
//! Everything the registry needs to know at construction time. The replay
//! binary maps its command line onto a [`RegistryConfig`]; tests build one
//! directly.

use crate::registry::infrastructure::providers::{ProviderCapability, ProviderTable};

#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Capability of each metadata provider
    pub providers: ProviderTable,
    /// Maximum reservation retries per operation (None for unlimited)
    pub max_retries: Option<u32>,
    /// Reject requests carrying malformed addresses
    pub address_validation: bool,
}

impl RegistryConfig {
    pub fn with_providers(self, providers: ProviderTable) -> Self {
        Self { providers, ..self }
    }

    /// Register an additional rich-metadata provider.
    pub fn with_rich_provider(self, provider_id: impl Into<String>) -> Self {
        Self {
            providers: self.providers.with_provider(provider_id, ProviderCapability::RichMetadata),
            ..self
        }
    }

    /// Reject unregistered providers instead of treating them as hash-only.
    pub fn with_strict_providers(self, strict: bool) -> Self {
        Self { providers: self.providers.with_strict(strict), ..self }
    }

    pub fn with_max_retries(self, max_retries: Option<u32>) -> Self {
        Self { max_retries, ..self }
    }

    pub fn with_address_validation(self, address_validation: bool) -> Self {
        Self { address_validation, ..self }
    }
}
