//! Registry documents.
//!
//! These are the entities mirrored off-chain: the [`Record`] itself, its
//! append-only provenance ([`ProvenanceEvent`] and, for modifications,
//! [`ModificationDetail`]), and the optional [`Metadata`] document holding
//! committed rich content plus the queue of [`PendingUpdate`] candidates.
//!
//! Records and Metadata carry a `version` counter maintained by the store:
//! a document loaded at version `n` can only be committed back if the stored
//! copy is still at version `n`. Version `0` means "never persisted".
//! Provenance entries are immutable and unversioned.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::infrastructure::naming::{Address, HashTriple, ProviderId, TokenId};

/// Kind of transition recorded by a provenance entry.
///
/// Approvals are not historical facts in this model and have no variant.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvenanceEventType {
    Create,
    Modified,
    Transfer,
    Destroy,
}

/// Immutable fact describing one transition of a Record.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEvent {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: ProvenanceEventType,
    pub codex_record_token_id: TokenId,
    pub old_owner_address: Address,
    pub new_owner_address: Address,
    pub transaction_hash: String,
    /// Set only for [`ProvenanceEventType::Modified`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codex_record_modified_event: Option<Uuid>,
}

impl ProvenanceEvent {
    pub fn new(
        event_type: ProvenanceEventType,
        token_id: TokenId,
        old_owner_address: Address,
        new_owner_address: Address,
        transaction_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            codex_record_token_id: token_id,
            old_owner_address,
            new_owner_address,
            transaction_hash,
            codex_record_modified_event: None,
        }
    }
}

/// Human-readable before/after values of a committed metadata candidate.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContentChange {
    pub old_name: String,
    pub new_name: String,
    pub old_description: Option<String>,
    pub new_description: Option<String>,
    pub old_files: Vec<String>,
    pub new_files: Vec<String>,
    pub old_images: Vec<String>,
    pub new_images: Vec<String>,
    pub old_main_image: Option<String>,
    pub new_main_image: Option<String>,
}

/// Detailed fact attached to a `modified` provenance entry.
///
/// Built in two stages: the hash pairs when the event is validated against
/// the Record, then the content pairs once a pending update has been matched.
/// It is persisted once, by the ledger, after both stages.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ModificationDetail {
    pub id: Uuid,
    pub modifier_address: Address,
    pub provider_id: ProviderId,
    pub provider_metadata_id: String,
    pub old_name_hash: String,
    pub new_name_hash: String,
    pub old_description_hash: String,
    pub new_description_hash: String,
    pub old_file_hashes: Vec<String>,
    pub new_file_hashes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentChange>,
}

impl ModificationDetail {
    pub fn new(
        modifier_address: Address,
        provider_id: ProviderId,
        provider_metadata_id: String,
        old: HashTriple,
        new: HashTriple,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            modifier_address,
            provider_id,
            provider_metadata_id,
            old_name_hash: old.name_hash,
            new_name_hash: new.name_hash,
            old_description_hash: old.description_hash,
            new_description_hash: new.description_hash,
            old_file_hashes: old.file_hashes,
            new_file_hashes: new.file_hashes,
            content: None,
        }
    }

    /// Second stage: record the content replaced by `committed`.
    pub fn record_content_commit(&mut self, before: &Metadata, committed: &PendingUpdate) {
        self.content = Some(ContentChange {
            old_name: before.name.clone(),
            new_name: committed.name.clone(),
            old_description: before.description.clone(),
            new_description: committed.description.clone(),
            old_files: before.files.clone(),
            new_files: committed.files.clone(),
            old_images: before.images.clone(),
            new_images: committed.images.clone(),
            old_main_image: before.main_image.clone(),
            new_main_image: committed.main_image.clone(),
        });
    }
}

/// A proposed, not yet committed, metadata candidate.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PendingUpdate {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name_hash: String,
    pub description_hash: String,
    /// Kept sorted
    pub file_hashes: Vec<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub main_image: Option<String>,
}

impl PendingUpdate {
    pub fn new(hashes: HashTriple, name: String, description: Option<String>) -> Self {
        let file_hashes = hashes.sorted_file_hashes();
        Self {
            id: Uuid::new_v4(),
            name_hash: hashes.name_hash,
            description_hash: hashes.description_hash,
            file_hashes,
            name,
            description,
            files: Vec::new(),
            images: Vec::new(),
            main_image: None,
        }
    }

    pub fn with_files(self, files: Vec<String>) -> Self {
        Self { files, ..self }
    }

    pub fn with_images(self, images: Vec<String>, main_image: Option<String>) -> Self {
        Self { images, main_image, ..self }
    }
}

/// Off-chain rich content backing a Record.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: String,
    #[serde(default)]
    pub codex_record_token_id: Option<TokenId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub main_image: Option<String>,
    pub name_hash: String,
    #[serde(default)]
    pub description_hash: String,
    /// Stored order is the tie-break order for matching
    #[serde(default)]
    pub pending_updates: Vec<PendingUpdate>,
    #[serde(default)]
    pub version: u64,
}

impl Metadata {
    pub fn new(id: impl Into<String>, name: String, name_hash: String) -> Self {
        Self { id: id.into(), name, name_hash, ..Default::default() }
    }

    /// Queue a candidate; its file hashes are stored sorted.
    pub fn propose(&mut self, mut update: PendingUpdate) {
        update.file_hashes.sort();
        self.pending_updates.push(update);
    }

    /// Replace the committed content with that of `update`.
    pub fn apply(&mut self, update: &PendingUpdate) {
        self.name = update.name.clone();
        self.description = update.description.clone();
        self.files = update.files.clone();
        self.images = update.images.clone();
        self.main_image = update.main_image.clone();
        self.name_hash = update.name_hash.clone();
        self.description_hash = update.description_hash.clone();
    }
}

/// The authoritative asset entity.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub token_id: TokenId,
    pub name_hash: String,
    pub description_hash: String,
    pub file_hashes: Vec<String>,
    pub owner_address: Address,
    #[serde(default)]
    pub approved_address: Option<Address>,
    #[serde(default)]
    pub whitelisted_addresses: BTreeSet<Address>,
    pub is_private: bool,
    pub is_ignored: bool,
    #[serde(default)]
    pub provider_id: Option<ProviderId>,
    #[serde(default)]
    pub provider_metadata_id: Option<String>,
    /// Ids of provenance entries, oldest first
    pub provenance: Vec<Uuid>,
    /// Populated on demand, never persisted with the Record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Box<Metadata>>,
    #[serde(default)]
    pub version: u64,
}

impl Record {
    /// New, not yet persisted Record linked to its `create` entry.
    pub fn new(
        token_id: TokenId,
        owner_address: Address,
        hashes: HashTriple,
        created: &ProvenanceEvent,
    ) -> Self {
        Self {
            token_id,
            name_hash: hashes.name_hash,
            description_hash: hashes.description_hash,
            file_hashes: hashes.file_hashes,
            owner_address,
            approved_address: None,
            whitelisted_addresses: BTreeSet::new(),
            is_private: true,
            is_ignored: false,
            provider_id: None,
            provider_metadata_id: None,
            provenance: vec![created.id],
            metadata: None,
            version: 0,
        }
    }

    pub fn hashes(&self) -> HashTriple {
        HashTriple::new(
            self.name_hash.clone(),
            self.description_hash.clone(),
            self.file_hashes.clone(),
        )
    }

    pub fn set_hashes(&mut self, hashes: HashTriple) {
        self.name_hash = hashes.name_hash;
        self.description_hash = hashes.description_hash;
        self.file_hashes = hashes.file_hashes;
    }

    /// Link an already persisted provenance entry.
    pub fn append_provenance(&mut self, event: &ProvenanceEvent) {
        debug_assert_eq!(event.codex_record_token_id, self.token_id);
        self.provenance.push(event.id);
    }
}
