//! Replay fixtures and reports.
//!
//! A fixture describes the state of the chain (readable tokens), the Metadata
//! documents published by providers, and the ordered chain events to apply.
//! Replaying it yields every touched Record with its linked provenance, plus
//! the events the registry refused.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Result, bail};
use codex_core::registry::{
    api::{RecordRequest, StoreRequest, StoreResponse},
    config::RegistryConfig,
    infrastructure::naming::{HashTriple, TokenId},
    init_in_memory_registry,
    model::{Metadata, ProvenanceEvent, Record},
};
use serde::{Deserialize, Serialize};
use tower::Service;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    /// Tokens readable from the contract, by token id
    #[serde(default)]
    pub tokens: BTreeMap<TokenId, HashTriple>,
    #[serde(default)]
    pub metadata: Vec<Metadata>,
    #[serde(default)]
    pub events: Vec<RecordRequest>,
}

#[derive(Debug, Serialize)]
pub struct RecordReport {
    pub record: Record,
    pub provenance: Vec<ProvenanceEvent>,
}

#[derive(Debug, Serialize)]
pub struct Failure {
    /// Position of the event in the fixture
    pub index: usize,
    pub event: RecordRequest,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub records: Vec<RecordReport>,
    pub failures: Vec<Failure>,
}

/// Apply every event of `fixture`, in order, to a fresh in-memory registry.
///
/// Refused events are reported, not fatal: the registry is expected to skip
/// them the way the live dispatcher would.
pub async fn replay(fixture: Fixture, config: RegistryConfig) -> Result<ReplayReport> {
    let (mut lifecycle, chain, mut store) = init_in_memory_registry(config);
    for (token_id, hashes) in fixture.tokens {
        chain.mint(token_id, hashes);
    }
    for metadata in fixture.metadata {
        store.call(StoreRequest::PutMetadata(metadata)).await?;
    }

    let mut token_ids = BTreeSet::new();
    let mut failures = Vec::new();
    for (index, event) in fixture.events.into_iter().enumerate() {
        if let Some(token_id) = event.token_id() {
            token_ids.insert(token_id.to_owned());
        }
        match lifecycle.call(event.clone()).await {
            Ok(_) => info!(index, "event applied"),
            Err(e) => {
                warn!(index, error = %e, "event refused");
                failures.push(Failure { index, event, error: e.to_string() });
            }
        }
    }

    let mut records = Vec::new();
    for token_id in token_ids {
        let record = match store.call(StoreRequest::GetRecord(token_id)).await? {
            StoreResponse::Record(Some(record)) => record,
            StoreResponse::Record(None) => continue,
            other => bail!("unexpected store response: {other:?}"),
        };
        let record = match store.call(StoreRequest::PopulateMetadata(record)).await? {
            StoreResponse::Record(Some(record)) => record,
            other => bail!("unexpected store response: {other:?}"),
        };
        let mut provenance = Vec::with_capacity(record.provenance.len());
        for id in &record.provenance {
            match store.call(StoreRequest::GetProvenanceEvent(*id)).await? {
                StoreResponse::ProvenanceEvent(Some(event)) => provenance.push(event),
                StoreResponse::ProvenanceEvent(None) => {
                    bail!("record {} links missing provenance entry {}", record.token_id, id)
                }
                other => bail!("unexpected store response: {other:?}"),
            }
        }
        records.push(RecordReport { record: *record, provenance });
    }

    Ok(ReplayReport { records, failures })
}
