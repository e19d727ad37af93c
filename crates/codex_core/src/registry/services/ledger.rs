//! Provenance ledger service.
//!
//! Mints the immutable provenance entry of one Record transition, persists
//! it through the store, and hands it back for linking into the Record.
//! Entries are persisted before the Record that references them is saved: a
//! failure between the two leaves an unlinked entry behind, never a Record
//! pointing at a missing one.
use std::{pin::Pin, task::Poll};

use tower::Service;
use tracing::{debug, info};

use crate::registry::{
    api::{LedgerRequest, LedgerResponse, StoreRequest, StoreResponse},
    error::RegistryError,
    infrastructure::naming::Address,
    model::{ModificationDetail, ProvenanceEvent, ProvenanceEventType},
};

#[derive(Debug, Clone)]
pub struct ProvenanceLedgerService<St> {
    store: St,
}

impl<St> ProvenanceLedgerService<St> {
    pub fn new(store: St) -> Self {
        Self { store }
    }
}

impl<St> ProvenanceLedgerService<St>
where
    St: Service<StoreRequest, Response = StoreResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    St::Future: Send,
{
    async fn persist(
        &mut self,
        event: ProvenanceEvent,
        detail: Option<Box<ModificationDetail>>,
    ) -> Result<(), RegistryError> {
        debug!(
            "[ledger] persisting {:?} entry {} of token {}",
            event.event_type, event.id, event.codex_record_token_id
        );
        match self.store.call(StoreRequest::InsertProvenance { event, detail }).await? {
            StoreResponse::Ack => Ok(()),
            _ => Err(RegistryError::InternalRegistryError),
        }
    }

    async fn record(&mut self, event: ProvenanceEvent) -> Result<LedgerResponse, RegistryError> {
        self.persist(event.clone(), None).await?;
        Ok(LedgerResponse::Recorded(event))
    }

    async fn record_modify(
        &mut self,
        mut event: ProvenanceEvent,
        detail: Box<ModificationDetail>,
    ) -> Result<LedgerResponse, RegistryError> {
        event.codex_record_modified_event = Some(detail.id);
        self.persist(event.clone(), Some(detail.clone())).await?;
        Ok(LedgerResponse::RecordedModification(event, detail))
    }
}

impl<St> Service<LedgerRequest> for ProvenanceLedgerService<St>
where
    St: Service<StoreRequest, Response = StoreResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    St::Future: Send,
{
    type Response = LedgerResponse;
    type Error = RegistryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: LedgerRequest) -> Self::Future {
        let mut this = self.clone();
        Box::pin(async move {
            match request {
                LedgerRequest::RecordCreate { owner_address, token_id, transaction_hash } => {
                    info!(
                        "[ledger] RecordCreate: token_id: {}, owner: {}, tx: {}",
                        token_id, owner_address, transaction_hash
                    );
                    this.record(ProvenanceEvent::new(
                        ProvenanceEventType::Create,
                        token_id,
                        Address::zero(),
                        owner_address,
                        transaction_hash,
                    ))
                    .await
                }
                LedgerRequest::RecordTransfer {
                    old_owner_address,
                    new_owner_address,
                    token_id,
                    transaction_hash,
                } => {
                    info!(
                        "[ledger] RecordTransfer: token_id: {}, from: {}, to: {}, tx: {}",
                        token_id, old_owner_address, new_owner_address, transaction_hash
                    );
                    this.record(ProvenanceEvent::new(
                        ProvenanceEventType::Transfer,
                        token_id,
                        old_owner_address,
                        new_owner_address,
                        transaction_hash,
                    ))
                    .await
                }
                LedgerRequest::RecordDestroy { owner_address, token_id, transaction_hash } => {
                    info!(
                        "[ledger] RecordDestroy: token_id: {}, owner: {}, tx: {}",
                        token_id, owner_address, transaction_hash
                    );
                    this.record(ProvenanceEvent::new(
                        ProvenanceEventType::Destroy,
                        token_id,
                        owner_address,
                        Address::zero(),
                        transaction_hash,
                    ))
                    .await
                }
                LedgerRequest::RecordModify {
                    current_owner_address,
                    token_id,
                    transaction_hash,
                    detail,
                } => {
                    info!(
                        "[ledger] RecordModify: token_id: {}, modifier: {}, tx: {}",
                        token_id, detail.modifier_address, transaction_hash
                    );
                    let event = ProvenanceEvent::new(
                        ProvenanceEventType::Modified,
                        token_id,
                        current_owner_address.clone(),
                        current_owner_address,
                        transaction_hash,
                    );
                    this.record_modify(event, detail).await
                }
            }
        })
    }
}
