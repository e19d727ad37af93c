//! Codex title registry mirror.
//!
//! Off-chain mirror of Codex Records: tokens on a public ledger whose name,
//! description and files are committed on-chain as hashes while the readable
//! content lives in provider-hosted Metadata documents. Chain events are
//! applied through the [`lifecycle::RecordLifecycleService`], which records an
//! append-only provenance entry for every ownership-relevant event and commits
//! exactly the pending metadata update the chain acknowledged.
//!
//! ## Architecture
//!
//! - [`lifecycle`]: entry point, one request per chain event
//! - [`services::ledger`]: mints and persists provenance entries
//! - [`services::reconciler`]: matches asserted hashes against pending updates
//! - [`services::sequencer`]: serializes operations per token
//! - [`crate::store`] and [`crate::chain`]: external collaborators, reached
//!   through the request types of [`api`]
pub mod api;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod lifecycle;
pub mod model;
pub mod services;
pub mod validation;

use crate::{chain::memory::InMemoryChain, store::memory::InMemoryStore};

/// Standard lifecycle service stack, parameterized by chain client and store.
///
/// Uses the waiting queue on top of the sequencer, so concurrent operations
/// on one token wait for each other instead of failing.
pub type RecordLifecycleDefaultStack<C, St> = lifecycle::RecordLifecycleService<
    services::sequencer::WaitingQueueService<services::sequencer::SequencerService>,
    services::ledger::ProvenanceLedgerService<St>,
    C,
    St,
>;

/// Initialize a lifecycle service on top of the given chain client and store.
pub fn init_registry<C, St>(
    config: config::RegistryConfig,
    chain: C,
    store: St,
) -> RecordLifecycleDefaultStack<C, St>
where
    St: Clone,
{
    let max_retries = config.max_retries;
    let sequencer = tower::ServiceBuilder::new()
        .layer(tower::layer::layer_fn(move |inner| {
            services::sequencer::WaitingQueueService::new(inner, max_retries)
        }))
        .service(services::sequencer::SequencerService::default());
    let ledger = services::ledger::ProvenanceLedgerService::new(store.clone());

    lifecycle::RecordLifecycleService::new(sequencer, ledger, chain, store)
        .with_providers(config.providers)
        .with_address_validation(config.address_validation)
}

/// Initialize a lifecycle service backed by in-memory collaborators.
///
/// Returns handles on the chain and the store so callers can seed tokens and
/// Metadata documents and inspect what the registry persisted.
pub fn init_in_memory_registry(
    config: config::RegistryConfig,
) -> (RecordLifecycleDefaultStack<InMemoryChain, InMemoryStore>, InMemoryChain, InMemoryStore) {
    let chain = InMemoryChain::default();
    let store = InMemoryStore::default();
    (init_registry(config, chain.clone(), store.clone()), chain, store)
}
