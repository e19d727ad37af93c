//! Matching of modify events against pending metadata candidates.
//!
//! A modify event asserts a hash triple. For rich-metadata providers that
//! triple must correspond to exactly one candidate queued on the Record's
//! Metadata; that candidate is consumed and its content committed.
//!
//! Candidates match when both hashes are equal and the file hashes are equal
//! as sorted sequences. Candidates store their file hashes sorted already,
//! so only the event side is sorted, once, and only when a candidate passes
//! the cheap checks. Candidates are scanned in stored order and the first
//! match wins.
use tracing::debug;

use crate::registry::{
    error::RegistryError,
    infrastructure::naming::{HashTriple, TokenId},
    model::{Metadata, PendingUpdate},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataReconciler;

impl MetadataReconciler {
    /// Index of the first candidate matching `asserted`.
    pub fn find_match(pending_updates: &[PendingUpdate], asserted: &HashTriple) -> Option<usize> {
        let mut sorted_file_hashes: Option<Vec<String>> = None;
        pending_updates.iter().position(|candidate| {
            if candidate.name_hash != asserted.name_hash
                || candidate.description_hash != asserted.description_hash
                || candidate.file_hashes.len() != asserted.file_hashes.len()
            {
                return false;
            }
            let sorted = sorted_file_hashes.get_or_insert_with(|| asserted.sorted_file_hashes());
            candidate.file_hashes == *sorted
        })
    }

    /// Remove and return the candidate matching `asserted`.
    ///
    /// `metadata` is left untouched when nothing matches.
    pub fn take_match(
        metadata: &mut Metadata,
        token_id: &TokenId,
        asserted: &HashTriple,
    ) -> Result<PendingUpdate, RegistryError> {
        match Self::find_match(&metadata.pending_updates, asserted) {
            Some(index) => {
                let candidate = metadata.pending_updates.remove(index);
                debug!(
                    "[reconciler] token {} matched pending update {} of metadata {} ({} left)",
                    token_id,
                    candidate.id,
                    metadata.id,
                    metadata.pending_updates.len()
                );
                Ok(candidate)
            }
            None => Err(RegistryError::NoMatchingPendingUpdate(
                token_id.to_owned(),
                metadata.id.to_owned(),
            )),
        }
    }
}
