//! # codex_core
//!
//! Record lifecycle, provenance ledger and metadata reconciliation for an
//! off-chain mirror of the Codex title registry.
//!
//! The registry is built from [`tower::Service`]s exchanging the request
//! types of [`registry::api`]. The document store and the chain client are
//! external collaborators behind the same interface; [`store::memory`] and
//! [`chain::memory`] provide in-memory implementations.
//!
//! ```ignore
//! let (mut lifecycle, chain, _store) = init_in_memory_registry(RegistryConfig::default());
//! chain.mint("42", hashes);
//! lifecycle.call(RecordRequest::Create { owner_address, token_id, transaction_hash }).await?;
//! ```
#[cfg(test)]
mod tests;

pub mod chain;
pub mod registry;
pub mod store;

pub mod codex_tracing {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize tracing for tests
    /// Logs are off unless `RUST_LOG` says otherwise.
    pub fn init() {
        INIT.call_once(|| {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

            let _ = fmt().with_target(false).with_test_writer().with_env_filter(filter).try_init();
        });
    }
}
