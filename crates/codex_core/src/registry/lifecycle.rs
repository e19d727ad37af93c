//! Record lifecycle service.
//!
//! Entry point of the write path: the event dispatcher sends one
//! [`RecordRequest`] per chain event and this service applies it to the
//! mirrored Record. Every operation follows the same sequence:
//!
//! 1. reserve the token on the sequencer, so operations on one token never
//!    interleave,
//! 2. load the Record (and, for rich-metadata providers, its Metadata),
//! 3. validate the transition and reconcile pending metadata, without
//!    touching the store,
//! 4. mint and persist the provenance entry through the ledger,
//! 5. commit the Record and Metadata together, conditional on the versions
//!    they were loaded at,
//! 6. release the token.
//!
//! Validation failures happen before step 4 and leave no trace. A failure
//! between steps 4 and 5 leaves an unlinked provenance entry, which is
//! harmless. Operations are spawned onto the runtime so that dropping the
//! caller's future does not abandon an operation half way.
//!
//! ## Legal transitions
//!
//! | Request | Precondition | Provenance |
//! |---|---|---|
//! | `Create` | token not yet mirrored | `create` |
//! | `ConfirmMint` | Record exists | none |
//! | `Modify` | Record exists with that provider link | `modified` |
//! | `Transfer` | Record exists | `transfer` |
//! | `Destroy` | Record exists | `destroy` |
//! | `ApproveAddress` | Record exists | none |
//! | `ApproveOperator` | unsupported | none |
use std::{pin::Pin, sync::Arc, task::Poll};

use tower::Service;
use tracing::{debug, info, warn};

use crate::registry::{
    api::{
        ChainRequest, ChainResponse, Commit, LedgerRequest, LedgerResponse, RecordRequest,
        RecordResponse, SequencerRequest, SequencerResponse, StoreRequest, StoreResponse,
    },
    error::RegistryError,
    infrastructure::{
        naming::{Address, HashTriple, TokenId},
        providers::{ProviderCapability, ProviderLookup, ProviderTable},
    },
    model::{Metadata, ModificationDetail, ProvenanceEvent, Record},
    services::reconciler::MetadataReconciler,
    validation::AddressValidator,
};

/// Record lifecycle service
///
/// Coordinates the sequencer, the provenance ledger, the chain client and
/// the store to apply chain events to mirrored Records.
#[derive(Debug, Clone)]
pub struct RecordLifecycleService<Q, L, C, St> {
    /// Service serializing operations per token
    sequencer: Q,
    /// Service minting provenance entries
    ledger: L,
    /// Read-only chain client
    chain: C,
    /// Document store
    store: St,
    /// Capability of each metadata provider
    providers: Arc<ProviderTable>,
    /// Address validator, when validation is enabled
    validator: Option<AddressValidator>,
}

impl<Q, L, C, St> RecordLifecycleService<Q, L, C, St> {
    pub fn new(sequencer: Q, ledger: L, chain: C, store: St) -> Self {
        Self {
            sequencer,
            ledger,
            chain,
            store,
            providers: Arc::new(ProviderTable::default()),
            validator: None,
        }
    }

    pub fn with_providers(self, providers: ProviderTable) -> Self {
        Self { providers: Arc::new(providers), ..self }
    }

    /// Reject requests carrying malformed addresses.
    pub fn with_address_validation(self, enable: bool) -> Self {
        Self { validator: enable.then_some(AddressValidator), ..self }
    }
}

impl<Q, L, C, St> RecordLifecycleService<Q, L, C, St>
where
    Q: Service<SequencerRequest, Response = SequencerResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    Q::Future: Send,
    L: Service<LedgerRequest, Response = LedgerResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    L::Future: Send,
    C: Service<ChainRequest, Response = ChainResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    C::Future: Send,
    St: Service<StoreRequest, Response = StoreResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    St::Future: Send,
{
    /// Capability of `provider_id`, evaluated once per operation.
    fn capability(
        &self,
        token_id: &TokenId,
        provider_id: &str,
    ) -> Result<ProviderCapability, RegistryError> {
        match self.providers.lookup(provider_id) {
            ProviderLookup::Known(capability) => Ok(capability),
            ProviderLookup::Fallback(capability) => {
                warn!(
                    "[lifecycle] token {}: unknown provider {}, treated as {:?}",
                    token_id, provider_id, capability
                );
                Ok(capability)
            }
            ProviderLookup::Rejected => {
                Err(RegistryError::InvalidProvider(token_id.to_owned(), provider_id.to_owned()))
            }
        }
    }

    async fn load_record(&mut self, token_id: &TokenId) -> Result<Box<Record>, RegistryError> {
        match self.store.call(StoreRequest::GetRecord(token_id.to_owned())).await? {
            StoreResponse::Record(Some(record)) => Ok(record),
            StoreResponse::Record(None) => Err(RegistryError::RecordNotFound(token_id.to_owned())),
            _ => Err(RegistryError::InternalRegistryError),
        }
    }

    async fn load_metadata(
        &mut self,
        token_id: &TokenId,
        provider_metadata_id: &str,
    ) -> Result<Box<Metadata>, RegistryError> {
        match self.store.call(StoreRequest::GetMetadata(provider_metadata_id.to_owned())).await? {
            StoreResponse::Metadata(Some(metadata)) => Ok(metadata),
            StoreResponse::Metadata(None) => Err(RegistryError::MetadataNotFound(
                token_id.to_owned(),
                provider_metadata_id.to_owned(),
            )),
            _ => Err(RegistryError::InternalRegistryError),
        }
    }

    async fn append(&mut self, request: LedgerRequest) -> Result<ProvenanceEvent, RegistryError> {
        match self.ledger.call(request).await? {
            LedgerResponse::Recorded(event) | LedgerResponse::RecordedModification(event, _) => {
                Ok(event)
            }
        }
    }

    async fn commit(&mut self, commit: Commit) -> Result<RecordResponse, RegistryError> {
        match self.store.call(StoreRequest::Commit(Box::new(commit))).await? {
            StoreResponse::Committed(persisted) => match persisted.record {
                Some(record) => Ok(RecordResponse::Record(Box::new(record))),
                None => Err(RegistryError::InternalRegistryError),
            },
            _ => Err(RegistryError::InternalRegistryError),
        }
    }

    async fn create(
        &mut self,
        owner_address: Address,
        token_id: TokenId,
        transaction_hash: String,
    ) -> Result<RecordResponse, RegistryError> {
        match self.store.call(StoreRequest::GetRecord(token_id.clone())).await? {
            StoreResponse::Record(None) => {}
            StoreResponse::Record(Some(_)) => {
                return Err(RegistryError::RecordAlreadyExists(token_id));
            }
            _ => return Err(RegistryError::InternalRegistryError),
        }
        let hashes = match self.chain.call(ChainRequest::GetTokenById(token_id.clone())).await? {
            ChainResponse::Token(hashes) => hashes,
        };
        let event = self
            .append(LedgerRequest::RecordCreate {
                owner_address: owner_address.clone(),
                token_id: token_id.clone(),
                transaction_hash,
            })
            .await?;
        let record = Record::new(token_id, owner_address, hashes, &event);
        self.commit(Commit::record(record)).await
    }

    async fn confirm_mint(
        &mut self,
        token_id: TokenId,
        provider_id: String,
        provider_metadata_id: String,
    ) -> Result<RecordResponse, RegistryError> {
        let capability = self.capability(&token_id, &provider_id)?;
        let mut record = self.load_record(&token_id).await?;
        let metadata = match capability {
            ProviderCapability::RichMetadata => {
                let mut metadata = self.load_metadata(&token_id, &provider_metadata_id).await?;
                metadata.codex_record_token_id = Some(token_id.clone());
                record.metadata = Some(metadata.clone());
                Some(*metadata)
            }
            ProviderCapability::HashesOnly => None,
        };
        record.provider_id = Some(provider_id);
        record.provider_metadata_id = Some(provider_metadata_id);
        self.commit(Commit::record(*record).with_metadata(metadata)).await
    }

    async fn modify(
        &mut self,
        modifier_address: Address,
        token_id: TokenId,
        new_hashes: HashTriple,
        provider_id: String,
        provider_metadata_id: String,
        transaction_hash: String,
    ) -> Result<RecordResponse, RegistryError> {
        let capability = self.capability(&token_id, &provider_id)?;
        let record = match self
            .store
            .call(StoreRequest::FindRecord {
                token_id: token_id.clone(),
                provider_id: provider_id.clone(),
                provider_metadata_id: provider_metadata_id.clone(),
            })
            .await?
        {
            StoreResponse::Record(Some(record)) => record,
            StoreResponse::Record(None) => return Err(RegistryError::RecordNotFound(token_id)),
            _ => return Err(RegistryError::InternalRegistryError),
        };

        let mut detail = ModificationDetail::new(
            modifier_address,
            provider_id,
            provider_metadata_id.clone(),
            record.hashes(),
            new_hashes.clone(),
        );

        let (mut record, metadata) = match capability {
            ProviderCapability::RichMetadata => {
                let mut record =
                    match self.store.call(StoreRequest::PopulateMetadata(record)).await? {
                        StoreResponse::Record(Some(record)) => record,
                        _ => return Err(RegistryError::InternalRegistryError),
                    };
                let Some(mut metadata) = record.metadata.take() else {
                    return Err(RegistryError::MetadataNotFound(token_id, provider_metadata_id));
                };
                let committed =
                    MetadataReconciler::take_match(&mut metadata, &token_id, &new_hashes)?;
                detail.record_content_commit(&metadata, &committed);
                metadata.apply(&committed);
                debug_assert_eq!(metadata.name_hash, new_hashes.name_hash);
                debug_assert_eq!(metadata.description_hash, new_hashes.description_hash);
                record.metadata = Some(metadata.clone());
                (record, Some(*metadata))
            }
            ProviderCapability::HashesOnly => (record, None),
        };

        let event = self
            .append(LedgerRequest::RecordModify {
                current_owner_address: record.owner_address.clone(),
                token_id,
                transaction_hash,
                detail: Box::new(detail),
            })
            .await?;
        record.set_hashes(new_hashes);
        record.append_provenance(&event);
        self.commit(Commit::record(*record).with_metadata(metadata)).await
    }

    async fn transfer(
        &mut self,
        old_owner_address: Address,
        new_owner_address: Address,
        token_id: TokenId,
        transaction_hash: String,
    ) -> Result<RecordResponse, RegistryError> {
        let mut record = self.load_record(&token_id).await?;
        if record.owner_address != old_owner_address {
            warn!(
                "[lifecycle] token {}: transfer from {} but mirrored owner is {}",
                token_id, old_owner_address, record.owner_address
            );
        }
        let event = self
            .append(LedgerRequest::RecordTransfer {
                old_owner_address,
                new_owner_address: new_owner_address.clone(),
                token_id,
                transaction_hash,
            })
            .await?;
        record.append_provenance(&event);
        record.owner_address = new_owner_address;
        record.whitelisted_addresses.clear();
        record.approved_address = None;
        record.is_ignored = false;
        record.is_private = true;
        self.commit(Commit::record(*record)).await
    }

    async fn destroy(
        &mut self,
        owner_address: Address,
        token_id: TokenId,
        transaction_hash: String,
    ) -> Result<RecordResponse, RegistryError> {
        let mut record = self.load_record(&token_id).await?;
        let event = self
            .append(LedgerRequest::RecordDestroy { owner_address, token_id, transaction_hash })
            .await?;
        record.append_provenance(&event);
        record.owner_address = Address::zero();
        self.commit(Commit::record(*record)).await
    }

    async fn approve_address(
        &mut self,
        approved_address: Address,
        token_id: TokenId,
    ) -> Result<RecordResponse, RegistryError> {
        let mut record = self.load_record(&token_id).await?;
        record.approved_address = Some(approved_address);
        record.is_ignored = false;
        self.commit(Commit::record(*record)).await
    }

    async fn apply(&mut self, request: RecordRequest) -> Result<RecordResponse, RegistryError> {
        match request {
            RecordRequest::Create { owner_address, token_id, transaction_hash } => {
                info!(
                    "[lifecycle] Create: token_id: {}, owner: {}, tx: {}",
                    token_id, owner_address, transaction_hash
                );
                self.create(owner_address, token_id, transaction_hash).await
            }
            RecordRequest::ConfirmMint {
                token_id,
                provider_id,
                provider_metadata_id,
                transaction_hash,
            } => {
                info!(
                    "[lifecycle] ConfirmMint: token_id: {}, provider: {}, provider_metadata_id: {}, tx: {}",
                    token_id, provider_id, provider_metadata_id, transaction_hash
                );
                self.confirm_mint(token_id, provider_id, provider_metadata_id).await
            }
            RecordRequest::Modify {
                modifier_address,
                token_id,
                new_name_hash,
                new_description_hash,
                new_file_hashes,
                provider_id,
                provider_metadata_id,
                transaction_hash,
            } => {
                info!(
                    "[lifecycle] Modify: token_id: {}, modifier: {}, provider: {}, provider_metadata_id: {}, tx: {}",
                    token_id, modifier_address, provider_id, provider_metadata_id, transaction_hash
                );
                self.modify(
                    modifier_address,
                    token_id,
                    HashTriple::new(new_name_hash, new_description_hash, new_file_hashes),
                    provider_id,
                    provider_metadata_id,
                    transaction_hash,
                )
                .await
            }
            RecordRequest::Transfer {
                old_owner_address,
                new_owner_address,
                token_id,
                transaction_hash,
            } => {
                info!(
                    "[lifecycle] Transfer: token_id: {}, from: {}, to: {}, tx: {}",
                    token_id, old_owner_address, new_owner_address, transaction_hash
                );
                self.transfer(old_owner_address, new_owner_address, token_id, transaction_hash)
                    .await
            }
            RecordRequest::Destroy { owner_address, token_id, transaction_hash } => {
                info!(
                    "[lifecycle] Destroy: token_id: {}, owner: {}, tx: {}",
                    token_id, owner_address, transaction_hash
                );
                self.destroy(owner_address, token_id, transaction_hash).await
            }
            RecordRequest::ApproveAddress {
                owner_address,
                approved_address,
                token_id,
                transaction_hash,
            } => {
                info!(
                    "[lifecycle] ApproveAddress: token_id: {}, owner: {}, approved: {}, tx: {}",
                    token_id, owner_address, approved_address, transaction_hash
                );
                self.approve_address(approved_address, token_id).await
            }
            RecordRequest::ApproveOperator { .. } => {
                Err(RegistryError::OperationNotSupported("approve_operator"))
            }
        }
    }

    async fn dispatch(&mut self, request: RecordRequest) -> Result<RecordResponse, RegistryError> {
        if let Some(validator) = &self.validator {
            validator.validate(&request)?;
        }
        let Some(token_id) = request.token_id().cloned() else {
            if let RecordRequest::ApproveOperator {
                owner_address,
                operator_address,
                is_approved,
                ..
            } = &request
            {
                debug!(
                    "[lifecycle] ApproveOperator not supported: owner: {}, operator: {}, approved: {}",
                    owner_address, operator_address, is_approved
                );
            }
            return self.apply(request).await;
        };

        match self.sequencer.call(SequencerRequest::Reserve(token_id.clone())).await? {
            SequencerResponse::Reserved => {}
            _ => return Err(RegistryError::InternalRegistryError),
        }
        let result = self.apply(request).await;
        let released = self.sequencer.call(SequencerRequest::Release(token_id)).await;
        if let Err(e) = &result {
            debug!("[lifecycle] operation failed: {}", e);
        }
        let response = result?;
        released?;
        Ok(response)
    }
}

impl<Q, L, C, St> Service<RecordRequest> for RecordLifecycleService<Q, L, C, St>
where
    Q: Service<SequencerRequest, Response = SequencerResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    Q::Future: Send,
    L: Service<LedgerRequest, Response = LedgerResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    L::Future: Send,
    C: Service<ChainRequest, Response = ChainResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    C::Future: Send,
    St: Service<StoreRequest, Response = StoreResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    St::Future: Send,
{
    type Response = RecordResponse;
    type Error = RegistryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: RecordRequest) -> Self::Future {
        let mut this = self.clone();
        Box::pin(async move {
            tokio::spawn(async move { this.dispatch(request).await })
                .await
                .map_err(|_| RegistryError::InternalRegistryError)?
        })
    }
}
