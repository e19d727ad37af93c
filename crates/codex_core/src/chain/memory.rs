use std::{pin::Pin, sync::Arc, task::Poll};

use dashmap::DashMap;
use tower::Service;
use tracing::info;

use crate::registry::{
    api::{ChainRequest, ChainResponse},
    error::RegistryError,
    infrastructure::naming::{HashTriple, TokenId},
};

/// Chain client answering from a fixed set of minted tokens.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChain {
    tokens: Arc<DashMap<TokenId, HashTriple>>,
}

impl InMemoryChain {
    pub fn with_token(self, token_id: impl Into<TokenId>, hashes: HashTriple) -> Self {
        self.mint(token_id, hashes);
        self
    }

    /// Make a token readable, as the contract would after a mint.
    pub fn mint(&self, token_id: impl Into<TokenId>, hashes: HashTriple) {
        self.tokens.insert(token_id.into(), hashes);
    }
}

impl Service<ChainRequest> for InMemoryChain {
    type Response = ChainResponse;
    type Error = RegistryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ChainRequest) -> Self::Future {
        let tokens = self.tokens.clone();
        Box::pin(async move {
            match request {
                ChainRequest::GetTokenById(token_id) => {
                    info!("[chain] GetTokenById: {}", token_id);
                    tokens
                        .get(&token_id)
                        .map(|hashes| ChainResponse::Token(hashes.to_owned()))
                        .ok_or(RegistryError::ChainReadFailed(token_id))
                }
            }
        })
    }
}
