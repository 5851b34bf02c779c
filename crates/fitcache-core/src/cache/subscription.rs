//! Subscriber handles and cancellation for cache reads.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::watch;

use crate::api::ApiError;
use crate::models::{Resource, ResourceList};

use super::{QueryKey, QueryState};

/// Lets a consumer stop waiting on a query.
///
/// Cancelling never aborts the request itself: the fetch still completes and
/// still updates the cache for later readers.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called on any clone of this token.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// An active subscriber on one query key.
///
/// While any subscription for a key is alive, invalidating that key starts a
/// re-fetch right away instead of waiting for the next read.
#[derive(Debug)]
pub struct QuerySubscription<R> {
    key: QueryKey,
    rx: watch::Receiver<QueryState<ResourceList>>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> QuerySubscription<R> {
    pub(crate) fn new(key: QueryKey, rx: watch::Receiver<QueryState<ResourceList>>) -> Self {
        Self {
            key,
            rx,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Latest state without waiting or triggering a fetch.
    pub fn current(&self) -> QueryState<Arc<Vec<R>>> {
        self.rx.borrow().typed::<R>()
    }

    /// Wait for the next state transition. `None` once the cache is gone.
    pub async fn changed(&mut self) -> Option<QueryState<Arc<Vec<R>>>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().typed::<R>())
    }

    /// Wait until the key is no longer pending and return the outcome.
    pub async fn settled(&mut self) -> Result<Arc<Vec<R>>, Arc<ApiError>> {
        let state = self
            .rx
            .wait_for(|state| !state.is_pending())
            .await
            .map_err(|_| Arc::new(ApiError::Cancelled))?
            .typed::<R>();
        state
            .into_result()
            .unwrap_or_else(|| Err(Arc::new(ApiError::Cancelled)))
    }

    /// Like `settled`, but gives up with `ApiError::Cancelled` when `token` fires.
    pub async fn settled_or_cancelled(
        &mut self,
        token: &CancelToken,
    ) -> Result<Arc<Vec<R>>, Arc<ApiError>> {
        if token.is_cancelled() {
            return Err(Arc::new(ApiError::Cancelled));
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Arc::new(ApiError::Cancelled)),
            result = self.settled() => result,
        }
    }
}
