//! Read-side state adapter.
//!
//! `FetchHandle` wraps an async read in the `{data, loading, error}`
//! contract list pages render from: it loads on construction, re-runs when
//! its filters change by value, exposes `refetch()`, and guarantees that a
//! response belonging to a superseded request never overwrites state
//! produced by a newer one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::error::{friendly_message, PortalError};
use crate::query::Filters;

/// Renderable state of one read.
///
/// Invariant: `loading == true` implies `error == None`. Once a request
/// has settled, exactly one of `data`/`error` is present. The pristine
/// state (before any attempt) has neither, with `loading == false`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> FetchState<T> {
    /// True once a request has completed and its outcome is visible.
    pub fn settled(&self) -> bool {
        !self.loading && (self.data.is_some() != self.error.is_some())
    }
}

/// A read operation the handle can repeat.
#[async_trait]
pub trait Fetch<T>: Send + Sync {
    async fn fetch(&self, filters: Filters) -> Result<T, PortalError>;
}

struct FnFetch<F>(F);

#[async_trait]
impl<T, F, Fut> Fetch<T> for FnFetch<F>
where
    F: Fn(Filters) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, PortalError>> + Send,
{
    async fn fetch(&self, filters: Filters) -> Result<T, PortalError> {
        (self.0)(filters).await
    }
}

struct FetchInner<T> {
    fetcher: Arc<dyn Fetch<T>>,
    state: Mutex<FetchState<T>>,
    changed: Notify,
    generation: AtomicU64,
    filters: Mutex<Filters>,
    timeout: Option<Duration>,
}

impl<T> FetchInner<T> {
    /// Mark a new request in flight. Prior data stays visible while the
    /// reload runs; prior errors do not.
    fn begin(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.loading = true;
            state.error = None;
        }
        self.changed.notify_waiters();
    }

    /// Publish a request's outcome unless a newer request has started.
    fn commit(&self, generation: u64, result: Result<T, PortalError>) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(_) => return,
        };
        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("discarding response from superseded request #{generation}");
            return;
        }
        *state = match result {
            Ok(data) => FetchState {
                data: Some(data),
                loading: false,
                error: None,
            },
            Err(error) => FetchState {
                data: None,
                loading: false,
                error: Some(friendly_message(&error)),
            },
        };
        drop(state);
        self.changed.notify_waiters();
    }
}

/// Stateful handle over a repeatable read.
///
/// Created inside a tokio runtime; the initial load starts immediately.
/// Dropping the handle aborts the request in flight.
pub struct FetchHandle<T> {
    inner: Arc<FetchInner<T>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Clone + Send + 'static> FetchHandle<T> {
    pub fn new(fetcher: Arc<dyn Fetch<T>>, filters: Filters) -> Self {
        Self::with_timeout(fetcher, filters, None)
    }

    /// Like [`FetchHandle::new`] with a per-request deadline.
    pub fn with_timeout(
        fetcher: Arc<dyn Fetch<T>>,
        filters: Filters,
        timeout: Option<Duration>,
    ) -> Self {
        let handle = Self {
            inner: Arc::new(FetchInner {
                fetcher,
                state: Mutex::new(FetchState::default()),
                changed: Notify::new(),
                generation: AtomicU64::new(0),
                filters: Mutex::new(filters),
                timeout,
            }),
            task: Mutex::new(None),
        };
        handle.spawn_load();
        handle
    }

    /// Build a handle from a closure, typically one that captures a
    /// resource client:
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use orr_client::{Filters, FetchHandle, Portal, PortalConfig};
    /// # use orr_client::auth::StaticToken;
    /// # async fn demo() {
    /// let portal = Arc::new(
    ///     Portal::new(PortalConfig::default(), Arc::new(StaticToken::none())).unwrap(),
    /// );
    /// let tickets = FetchHandle::from_fn(
    ///     move |filters| {
    ///         let portal = portal.clone();
    ///         async move { portal.resource("tickets").list(&filters).await }
    ///     },
    ///     Filters::new().with_flag("escalated", true),
    /// );
    /// let state = tickets.settled().await;
    /// # }
    /// ```
    pub fn from_fn<F, Fut>(f: F, filters: Filters) -> Self
    where
        F: Fn(Filters) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, PortalError>> + Send + 'static,
    {
        Self::new(Arc::new(FnFetch(f)), filters)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState<T> {
        self.inner
            .state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    /// Repeat the current request (after a mutation elsewhere).
    pub fn refetch(&self) {
        self.spawn_load();
    }

    /// Replace the filters; reloads only when they differ by value.
    pub fn set_filters(&self, filters: Filters) {
        {
            let mut guard = match self.inner.filters.lock() {
                Ok(guard) => guard,
                Err(_) => return,
            };
            if *guard == filters {
                return;
            }
            *guard = filters;
        }
        self.spawn_load();
    }

    /// Wait until the in-flight request settles and return the state.
    pub async fn settled(&self) -> FetchState<T> {
        loop {
            let notified = self.inner.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            let state = self.state();
            if state.settled() {
                return state;
            }
            notified.await;
        }
    }

    fn spawn_load(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let filters = self
            .inner
            .filters
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        self.inner.begin();

        let inner = self.inner.clone();
        let task = tokio::spawn(async move {
            let request = inner.fetcher.fetch(filters);
            let result = match inner.timeout {
                Some(limit) => match tokio::time::timeout(limit, request).await {
                    Ok(result) => result,
                    Err(_) => Err(PortalError::Timeout(limit)),
                },
                None => request.await,
            };
            inner.commit(generation, result);
        });

        // A superseded task is left to finish; its commit is discarded by
        // the generation check. Only the handle's drop aborts outright.
        if let Ok(mut slot) = self.task.lock() {
            *slot = Some(task);
        }
    }
}

impl<T> Drop for FetchHandle<T> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}
