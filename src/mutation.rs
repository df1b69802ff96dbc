//! Write-side state adapter.
//!
//! `MutationHandle` wraps a create/update/delete call for form flows: the
//! caller awaits `mutate()` for control flow while the same outcome is
//! published as `{data, loading, error}` for rendering. `reset()` restores
//! the pristine state when a modal closes, so stale banners never reappear.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{friendly_message, PortalError};

/// Renderable state of one write operation.
///
/// Same exclusivity contract as [`crate::fetch::FetchState`]: after a
/// settle exactly one of `data`/`error` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationState<R> {
    pub data: Option<R>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<R> Default for MutationState<R> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// A write operation the handle can run.
#[async_trait]
pub trait Mutate<I, R>: Send + Sync {
    async fn run(&self, input: I) -> Result<R, PortalError>;
}

struct FnMutate<F>(F);

#[async_trait]
impl<I, R, F, Fut> Mutate<I, R> for FnMutate<F>
where
    I: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, PortalError>> + Send,
{
    async fn run(&self, input: I) -> Result<R, PortalError> {
        (self.0)(input).await
    }
}

/// Stateful handle over a repeatable write.
pub struct MutationHandle<I, R> {
    mutator: Arc<dyn Mutate<I, R>>,
    state: Mutex<MutationState<R>>,
    generation: AtomicU64,
    timeout: Option<Duration>,
}

impl<I: Send + 'static, R: Clone + Send + 'static> MutationHandle<I, R> {
    pub fn new(mutator: Arc<dyn Mutate<I, R>>) -> Self {
        Self::with_timeout(mutator, None)
    }

    /// Like [`MutationHandle::new`] with a per-request deadline.
    pub fn with_timeout(mutator: Arc<dyn Mutate<I, R>>, timeout: Option<Duration>) -> Self {
        Self {
            mutator,
            state: Mutex::new(MutationState::default()),
            generation: AtomicU64::new(0),
            timeout,
        }
    }

    /// Build a handle from a closure capturing a resource client.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, PortalError>> + Send + 'static,
    {
        Self::new(Arc::new(FnMutate(f)))
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> MutationState<R> {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    /// Run the write.
    ///
    /// Clears any previous error before attempting. The returned result
    /// and the published state describe the same outcome: callers may use
    /// either without cross-checking the other. Safe to call repeatedly;
    /// a later success clears an earlier failure.
    pub async fn mutate(&self, input: I) -> Result<R, PortalError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut state) = self.state.lock() {
            state.loading = true;
            state.error = None;
        }

        let request = self.mutator.run(input);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, request).await {
                Ok(result) => result,
                Err(_) => Err(PortalError::Timeout(limit)),
            },
            None => request.await,
        };

        if let Ok(mut state) = self.state.lock() {
            if self.generation.load(Ordering::SeqCst) == generation {
                *state = match &result {
                    Ok(data) => MutationState {
                        data: Some(data.clone()),
                        loading: false,
                        error: None,
                    },
                    Err(error) => MutationState {
                        data: None,
                        loading: false,
                        error: Some(friendly_message(error)),
                    },
                };
            }
        }

        result
    }

    /// Restore the pristine state (modal closed/reopened). Anything still
    /// in flight is invalidated and will not write its outcome.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut state) = self.state.lock() {
            *state = MutationState::default();
        }
    }
}
