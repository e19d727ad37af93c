//! Per-token serialization of lifecycle operations.
//!
//! Chain events for one token must be applied one at a time: two operations
//! interleaving their load-mutate-save sequences would overwrite each other's
//! provenance. The [`SequencerService`] holds at most one reservation per
//! token and rejects concurrent reservations with
//! [`RegistryError::TokenUnavailable`]. The [`WaitingQueueService`] layer
//! turns those rejections into waits: callers park on the token's queue and
//! retry when the holder releases it.
use std::{pin::Pin, sync::Arc, task::Poll};

use dashmap::{DashMap, DashSet};
use tokio::sync::Notify;
use tower::Service;
use tracing::{debug, info};

use crate::registry::{
    api::{SequencerRequest, SequencerResponse},
    error::RegistryError,
    infrastructure::naming::TokenId,
};

#[derive(Debug, Clone, Default)]
pub struct SequencerService {
    reserved: Arc<DashSet<TokenId>>,
}

impl SequencerService {
    fn reserve(&self, token_id: TokenId) -> Result<SequencerResponse, RegistryError> {
        if self.reserved.insert(token_id.clone()) {
            Ok(SequencerResponse::Reserved)
        } else {
            Err(RegistryError::TokenUnavailable(token_id))
        }
    }

    fn release(&self, token_id: &TokenId) -> SequencerResponse {
        SequencerResponse::Released(self.reserved.remove(token_id))
    }
}

impl Service<SequencerRequest> for SequencerService {
    type Response = SequencerResponse;
    type Error = RegistryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: SequencerRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                SequencerRequest::Reserve(token_id) => {
                    info!("[sequencer] Reserve: token_id: {}", token_id);
                    this.reserve(token_id)
                }
                SequencerRequest::Release(token_id) => {
                    info!("[sequencer] Release: token_id: {}", token_id);
                    Ok(this.release(&token_id))
                }
            }
        })
    }
}

/// Waiting layer in front of a sequencer.
///
/// Uses one [`Notify`] per token. A release stores a permit when nobody is
/// parked yet, so a waiter that joins the queue after the release still
/// wakes up and retries. Queues nobody holds are dropped on release.
#[derive(Debug, Clone)]
pub struct WaitingQueueService<T> {
    inner: T,
    waiting_queue: Arc<DashMap<TokenId, Arc<Notify>>>,
    max_retries: Option<u32>,
}

impl<T> WaitingQueueService<T> {
    /// `None` retries until the token becomes available.
    pub fn new(inner: T, max_retries: Option<u32>) -> Self {
        Self { inner, waiting_queue: Arc::new(DashMap::new()), max_retries }
    }

    fn waiting_queue(&self, token_id: &TokenId) -> Arc<Notify> {
        self.waiting_queue.entry(token_id.to_owned()).or_default().clone()
    }

    /// Wake the next waiter of `token_id`, or drop its queue when nobody is
    /// parked on it.
    fn notify_waiting_queue(&self, token_id: &Option<TokenId>) {
        let Some(token_id) = token_id else {
            return;
        };
        let idle = |_: &TokenId, queue: &Arc<Notify>| Arc::strong_count(queue) == 1;
        if self.waiting_queue.remove_if(token_id, idle).is_none()
            && let Some(queue) = self.waiting_queue.get(token_id)
        {
            queue.notify_one();
        }
    }
}

impl<T> Service<SequencerRequest> for WaitingQueueService<T>
where
    T: Service<SequencerRequest, Response = SequencerResponse, Error = RegistryError>
        + Clone
        + Sync
        + Send
        + 'static,
    T::Future: Send,
{
    type Response = T::Response;
    type Error = T::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: SequencerRequest) -> Self::Future {
        let mut inner = self.inner.clone();
        let this = self.clone();
        Box::pin(async move {
            let mut retries = 0;
            loop {
                match inner.call(request.clone()).await {
                    Ok(SequencerResponse::Reserved) => {
                        debug!("[sequencer] Reserved after {} retries", retries);
                        return Ok(SequencerResponse::Reserved);
                    }
                    Ok(SequencerResponse::Released(token_id)) => {
                        this.notify_waiting_queue(&token_id);
                        debug!("[sequencer] Released: {:?}", token_id);
                        return Ok(SequencerResponse::Released(token_id));
                    }
                    Err(RegistryError::TokenUnavailable(token_id)) => {
                        if this.max_retries.is_some_and(|max| retries >= max) {
                            return Err(RegistryError::ReachedMaxRetriesWaitingQueue);
                        }
                        retries += 1;
                        // register the queue first, a release racing with the
                        // failed attempt then leaves a permit behind
                        let Some(queue) = this.waiting_queue.get(&token_id).map(|q| q.clone())
                        else {
                            this.waiting_queue(&token_id);
                            continue;
                        };
                        debug!("[sequencer] waiting token: {}", token_id);
                        queue.notified().await;
                    }
                    Err(e) => return Err(e),
                }
            }
        })
    }
}
