//! In-memory document store.
//!
//! Backs the registry in tests and in the replay tool. Documents live in
//! [`DashMap`]s shared by every clone of the store. Commits and metadata
//! upserts are serialized by a single commit lock, which makes the version
//! checks and the writes of one [`Commit`] atomic with respect to each other.
//! Plain reads do not take the lock.
use std::{pin::Pin, sync::Arc, task::Poll};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tower::Service;
use tracing::{debug, info};
use uuid::Uuid;

use crate::registry::{
    api::{Commit, StoreRequest, StoreResponse},
    error::RegistryError,
    infrastructure::naming::TokenId,
    model::{Metadata, ModificationDetail, ProvenanceEvent, Record},
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Arc<DashMap<TokenId, Record>>,
    metadata: Arc<DashMap<String, Metadata>>,
    provenance: Arc<DashMap<Uuid, ProvenanceEvent>>,
    provenance_by_token: Arc<DashMap<TokenId, Vec<Uuid>>>,
    details: Arc<DashMap<Uuid, ModificationDetail>>,
    commit_lock: Arc<Mutex<()>>,
}

fn check_version(id: &str, stored: Option<u64>, expected: u64) -> Result<(), RegistryError> {
    let found = stored.unwrap_or_default();
    if found == expected {
        Ok(())
    } else {
        Err(RegistryError::VersionConflict(id.to_owned(), expected, found))
    }
}

impl InMemoryStore {
    fn get_record(&self, token_id: &TokenId) -> Option<Box<Record>> {
        self.records.get(token_id).map(|record| Box::new(record.to_owned()))
    }

    fn find_record(
        &self,
        token_id: &TokenId,
        provider_id: &str,
        provider_metadata_id: &str,
    ) -> Option<Box<Record>> {
        self.get_record(token_id).filter(|record| {
            record.provider_id.as_deref() == Some(provider_id)
                && record.provider_metadata_id.as_deref() == Some(provider_metadata_id)
        })
    }

    fn get_metadata(&self, id: &str) -> Option<Box<Metadata>> {
        self.metadata.get(id).map(|metadata| Box::new(metadata.to_owned()))
    }

    fn populate_metadata(&self, mut record: Box<Record>) -> Box<Record> {
        record.metadata =
            record.provider_metadata_id.as_deref().and_then(|id| self.get_metadata(id));
        record
    }

    /// Conditional upsert: version `0` inserts, any other version must match
    /// the stored copy.
    async fn put_metadata(&self, mut metadata: Metadata) -> Result<u64, RegistryError> {
        let _guard = self.commit_lock.lock().await;
        let stored = self.metadata.get(&metadata.id).map(|m| m.version);
        check_version(&metadata.id, stored, metadata.version)?;

        metadata.pending_updates.iter_mut().for_each(|update| update.file_hashes.sort());
        metadata.version += 1;
        let version = metadata.version;
        self.metadata.insert(metadata.id.clone(), metadata);
        Ok(version)
    }

    fn insert_provenance(&self, event: ProvenanceEvent, detail: Option<Box<ModificationDetail>>) {
        if let Some(detail) = detail {
            self.details.insert(detail.id, *detail);
        }
        self.provenance_by_token
            .entry(event.codex_record_token_id.clone())
            .or_default()
            .push(event.id);
        self.provenance.insert(event.id, event);
    }

    fn list_provenance(&self, token_id: &TokenId) -> Vec<ProvenanceEvent> {
        let ids =
            self.provenance_by_token.get(token_id).map(|ids| ids.to_owned()).unwrap_or_default();
        ids.iter().filter_map(|id| self.provenance.get(id).map(|event| event.to_owned())).collect()
    }

    async fn commit(&self, commit: Commit) -> Result<Commit, RegistryError> {
        let _guard = self.commit_lock.lock().await;

        if let Some(record) = &commit.record {
            let stored = self.records.get(&record.token_id).map(|r| r.version);
            check_version(&record.token_id, stored, record.version)?;
        }
        if let Some(metadata) = &commit.metadata {
            let stored = self.metadata.get(&metadata.id).map(|m| m.version);
            check_version(&metadata.id, stored, metadata.version)?;
        }

        let mut persisted = Commit::default();
        if let Some(mut record) = commit.record {
            record.version += 1;
            let mut stored = record.clone();
            stored.metadata = None;
            debug!("[store] commit record {} at version {}", record.token_id, record.version);
            self.records.insert(stored.token_id.clone(), stored);
            persisted.record = Some(record);
        }
        if let Some(mut metadata) = commit.metadata {
            metadata.version += 1;
            debug!("[store] commit metadata {} at version {}", metadata.id, metadata.version);
            self.metadata.insert(metadata.id.clone(), metadata.clone());
            persisted.metadata = Some(metadata);
        }
        // keep the populated link in sync with what was just written
        if let (Some(record), Some(metadata)) = (&mut persisted.record, &persisted.metadata)
            && record.metadata.is_some()
        {
            record.metadata = Some(Box::new(metadata.clone()));
        }
        Ok(persisted)
    }

    async fn remove_record(&self, token_id: &TokenId) {
        let _guard = self.commit_lock.lock().await;
        self.records.remove(token_id);
    }

    async fn remove_metadata(&self, id: &str) {
        let _guard = self.commit_lock.lock().await;
        self.metadata.remove(id);
    }
}

impl Service<StoreRequest> for InMemoryStore {
    type Response = StoreResponse;
    type Error = RegistryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: StoreRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                StoreRequest::GetRecord(token_id) => {
                    debug!("[store] GetRecord: {}", token_id);
                    Ok(StoreResponse::Record(this.get_record(&token_id)))
                }
                StoreRequest::FindRecord { token_id, provider_id, provider_metadata_id } => {
                    debug!(
                        "[store] FindRecord: {}, provider: {}, provider_metadata_id: {}",
                        token_id, provider_id, provider_metadata_id
                    );
                    Ok(StoreResponse::Record(this.find_record(
                        &token_id,
                        &provider_id,
                        &provider_metadata_id,
                    )))
                }
                StoreRequest::PopulateMetadata(record) => {
                    debug!("[store] PopulateMetadata: {}", record.token_id);
                    Ok(StoreResponse::Record(Some(this.populate_metadata(record))))
                }
                StoreRequest::GetMetadata(id) => {
                    debug!("[store] GetMetadata: {}", id);
                    Ok(StoreResponse::Metadata(this.get_metadata(&id)))
                }
                StoreRequest::PutMetadata(metadata) => {
                    info!("[store] PutMetadata: {}", metadata.id);
                    let version = this.put_metadata(metadata).await?;
                    debug!("[store] metadata at version {}", version);
                    Ok(StoreResponse::Ack)
                }
                StoreRequest::InsertProvenance { event, detail } => {
                    debug!("[store] InsertProvenance: {}", event.id);
                    this.insert_provenance(event, detail);
                    Ok(StoreResponse::Ack)
                }
                StoreRequest::GetProvenanceEvent(id) => Ok(StoreResponse::ProvenanceEvent(
                    this.provenance.get(&id).map(|e| e.to_owned()),
                )),
                StoreRequest::GetModificationDetail(id) => Ok(StoreResponse::ModificationDetail(
                    this.details.get(&id).map(|d| Box::new(d.to_owned())),
                )),
                StoreRequest::ListProvenance(token_id) => {
                    Ok(StoreResponse::ProvenanceEvents(this.list_provenance(&token_id)))
                }
                StoreRequest::Commit(commit) => {
                    info!(
                        "[store] Commit: record: {:?}, metadata: {:?}",
                        commit.record.as_ref().map(|r| &r.token_id),
                        commit.metadata.as_ref().map(|m| &m.id)
                    );
                    Ok(StoreResponse::Committed(Box::new(this.commit(*commit).await?)))
                }
                StoreRequest::RemoveRecord(token_id) => {
                    info!("[store] RemoveRecord: {}", token_id);
                    this.remove_record(&token_id).await;
                    Ok(StoreResponse::Ack)
                }
                StoreRequest::RemoveMetadata(id) => {
                    info!("[store] RemoveMetadata: {}", id);
                    this.remove_metadata(&id).await;
                    Ok(StoreResponse::Ack)
                }
            }
        })
    }
}
