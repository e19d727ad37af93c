use thiserror::Error;

use crate::registry::infrastructure::naming::TokenId;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Registry error, internal registry API error")]
    InternalRegistryError,

    #[error("Registry error, record not found (token_id: {0})")]
    RecordNotFound(TokenId),

    #[error("Registry error, record already exists (token_id: {0})")]
    RecordAlreadyExists(TokenId),

    #[error("Registry error, metadata not found (token_id: {0}, provider_metadata_id: {1})")]
    MetadataNotFound(TokenId, String),

    #[error(
        "Registry error, no matching pending update (token_id: {0}, provider_metadata_id: {1})"
    )]
    NoMatchingPendingUpdate(TokenId, String),

    #[error("Registry error, invalid provider (token_id: {0}, provider_id: {1})")]
    InvalidProvider(TokenId, String),

    #[error("Registry error, operation not supported ({0})")]
    OperationNotSupported(&'static str),

    #[error("Registry error, version conflict (id: {0}, expected: {1}, found: {2})")]
    VersionConflict(String, u64, u64),

    #[error("Registry error, invalid address ({0})")]
    InvalidAddress(String),

    #[error("Registry error, token unavailable (token_id: {0})")]
    TokenUnavailable(TokenId),

    #[error("Registry error, reached max retries waiting queue")]
    ReachedMaxRetriesWaitingQueue,

    #[error("Registry error, chain read failed (token_id: {0})")]
    ChainReadFailed(TokenId),
}
