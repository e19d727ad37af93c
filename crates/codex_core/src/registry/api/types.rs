//! Registry API type definitions.
//!
//! This module defines the request and response types exchanged between the
//! registry services. Every component is a [`tower::Service`] over one of the
//! request enums below and answers with the matching response enum.
//!
//! ## Record lifecycle API
//! Entry point of the write path: one [`RecordRequest`] per chain event, as
//! issued by the event dispatcher. Requests deserialize from the dispatcher's
//! JSON events.
//!
//! ## Internal service APIs
//! - **Ledger**: minting and persisting provenance entries
//! - **Sequencer**: per-token reservations serializing lifecycle operations
//! - **Store**: document persistence (external collaborator boundary)
//! - **Chain**: read-only contract calls (external collaborator boundary)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::{
    infrastructure::naming::{Address, HashTriple, ProviderId, TokenId},
    model::{Metadata, ModificationDetail, ProvenanceEvent, Record},
};

/// Record lifecycle request types.
///
/// Each variant is one legal transition of a Record, carrying the parameters
/// derived from the originating chain event. The serialized form is the one
/// handed over by the event dispatcher, tagged by `event`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RecordRequest {
    /// A Record has been minted on-chain.
    ///
    /// The canonical hashes are read back from the contract rather than taken
    /// from the event.
    Create {
        owner_address: Address,
        token_id: TokenId,
        transaction_hash: String,
    },

    /// The provider metadata backing a freshly minted Record is now known.
    ConfirmMint {
        token_id: TokenId,
        provider_id: ProviderId,
        provider_metadata_id: String,
        transaction_hash: String,
    },

    /// The hashes of a Record have been modified on-chain.
    ///
    /// For rich-metadata providers the asserted hashes must match exactly one
    /// pending update of the linked Metadata, which is then committed.
    Modify {
        modifier_address: Address,
        token_id: TokenId,
        new_name_hash: String,
        new_description_hash: String,
        new_file_hashes: Vec<String>,
        provider_id: ProviderId,
        provider_metadata_id: String,
        transaction_hash: String,
    },

    /// Ownership of a Record moved between two non-zero addresses.
    Transfer {
        old_owner_address: Address,
        new_owner_address: Address,
        token_id: TokenId,
        transaction_hash: String,
    },

    /// A Record has been burnt. The Record is kept, owned by the zero address.
    Destroy {
        owner_address: Address,
        token_id: TokenId,
        transaction_hash: String,
    },

    /// An address has been approved to transfer a single Record.
    ApproveAddress {
        owner_address: Address,
        approved_address: Address,
        token_id: TokenId,
        transaction_hash: String,
    },

    /// An operator has been (dis)approved for all Records of an owner.
    ///
    /// Operator approvals are not modeled; the lifecycle answers with
    /// [`crate::registry::error::RegistryError::OperationNotSupported`].
    ApproveOperator {
        owner_address: Address,
        operator_address: Address,
        is_approved: bool,
        transaction_hash: String,
    },
}

impl RecordRequest {
    pub fn token_id(&self) -> Option<&TokenId> {
        match self {
            RecordRequest::Create { token_id, .. }
            | RecordRequest::ConfirmMint { token_id, .. }
            | RecordRequest::Modify { token_id, .. }
            | RecordRequest::Transfer { token_id, .. }
            | RecordRequest::Destroy { token_id, .. }
            | RecordRequest::ApproveAddress { token_id, .. } => Some(token_id),
            RecordRequest::ApproveOperator { .. } => None,
        }
    }

    /// Every address carried by the request.
    pub fn addresses(&self) -> Vec<&Address> {
        match self {
            RecordRequest::Create { owner_address, .. }
            | RecordRequest::Destroy { owner_address, .. } => vec![owner_address],
            RecordRequest::ConfirmMint { .. } => vec![],
            RecordRequest::Modify { modifier_address, .. } => vec![modifier_address],
            RecordRequest::Transfer { old_owner_address, new_owner_address, .. } => {
                vec![old_owner_address, new_owner_address]
            }
            RecordRequest::ApproveAddress { owner_address, approved_address, .. } => {
                vec![owner_address, approved_address]
            }
            RecordRequest::ApproveOperator { owner_address, operator_address, .. } => {
                vec![owner_address, operator_address]
            }
        }
    }
}

/// Record lifecycle response types.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RecordResponse {
    /// The Record as persisted by the operation, with its Metadata populated
    /// when the operation loaded it.
    Record(Box<Record>),
}

/// Provenance ledger request types.
///
/// Each request mints one provenance entry, persists it, and returns it for
/// linking into the Record.
#[derive(Debug, Clone)]
pub enum LedgerRequest {
    /// Mint entry: old owner is the zero address.
    RecordCreate {
        owner_address: Address,
        token_id: TokenId,
        transaction_hash: String,
    },
    RecordTransfer {
        old_owner_address: Address,
        new_owner_address: Address,
        token_id: TokenId,
        transaction_hash: String,
    },
    /// Burn entry: new owner is the zero address.
    RecordDestroy {
        owner_address: Address,
        token_id: TokenId,
        transaction_hash: String,
    },
    /// Modification entry: ownership is unchanged, both owner fields carry
    /// the current owner.
    RecordModify {
        current_owner_address: Address,
        token_id: TokenId,
        transaction_hash: String,
        detail: Box<ModificationDetail>,
    },
}

/// Provenance ledger response types.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LedgerResponse {
    /// Entry persisted
    Recorded(ProvenanceEvent),
    /// Entry and its modification detail persisted
    RecordedModification(ProvenanceEvent, Box<ModificationDetail>),
}

/// Sequencer service request types.
#[derive(Debug, Clone)]
pub enum SequencerRequest {
    /// Reserve exclusive access to a token for one lifecycle operation.
    Reserve(TokenId),
    /// Release a reservation once the operation completed or failed.
    Release(TokenId),
}

/// Sequencer service response types.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SequencerResponse {
    Reserved,
    /// The released token, if it was reserved
    Released(Option<TokenId>),
}

/// Atomic write set of one lifecycle operation.
///
/// Every document is written only if its `version` still matches the stored
/// copy (`0` for documents that must not exist yet); either all documents
/// are written or none.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Commit {
    pub record: Option<Record>,
    pub metadata: Option<Metadata>,
}

impl Commit {
    pub fn record(record: Record) -> Self {
        Self { record: Some(record), metadata: None }
    }

    pub fn with_metadata(self, metadata: Option<Metadata>) -> Self {
        Self { metadata, ..self }
    }
}

/// Store request types.
#[derive(Debug, Clone)]
pub enum StoreRequest {
    /// Load a Record by token id.
    GetRecord(TokenId),
    /// Load the Record matching a token id and its provider link.
    FindRecord {
        token_id: TokenId,
        provider_id: ProviderId,
        provider_metadata_id: String,
    },
    /// Populate the linked Metadata of a Record, if any.
    PopulateMetadata(Box<Record>),
    /// Load a Metadata document by id.
    GetMetadata(String),
    /// Upsert a Metadata document outside of any lifecycle operation.
    ///
    /// Conditional on `version` like [`Commit`]: `0` only inserts, otherwise
    /// the stored copy must still be at that version.
    PutMetadata(Metadata),
    /// Persist a new provenance entry and its modification detail.
    InsertProvenance {
        event: ProvenanceEvent,
        detail: Option<Box<ModificationDetail>>,
    },
    GetProvenanceEvent(Uuid),
    GetModificationDetail(Uuid),
    /// Every persisted provenance entry of a token in insertion order,
    /// including entries never linked to the Record.
    ListProvenance(TokenId),
    /// Apply a write set atomically.
    Commit(Box<Commit>),
    RemoveRecord(TokenId),
    RemoveMetadata(String),
}

/// Store response types.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StoreResponse {
    Record(Option<Box<Record>>),
    Metadata(Option<Box<Metadata>>),
    ProvenanceEvent(Option<ProvenanceEvent>),
    ProvenanceEvents(Vec<ProvenanceEvent>),
    ModificationDetail(Option<Box<ModificationDetail>>),
    /// The write set as persisted, carrying the new document versions
    Committed(Box<Commit>),
    Ack,
}

/// Chain client request types (read-only contract calls).
#[derive(Debug, Clone)]
pub enum ChainRequest {
    GetTokenById(TokenId),
}

/// Chain client response types.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ChainResponse {
    Token(HashTriple),
}
