//! Reactive collection cache.
//!
//! One [`CollectionCache`] per entity type holds the last fetched collection
//! and publishes every new [`Snapshot`] through a `tokio::sync::watch`
//! channel. The refetch path is the only writer.
//!
//! Invalidations coalesce: while a refetch is in flight, further
//! invalidations join it instead of issuing another `list()` call.
//! A write that lands after the joined refetch has read the collection
//! shows up on the next invalidation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eclat_core::Entity;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::adapter::EntityAdapter;
use crate::error::StoreError;

type InFlight = Shared<BoxFuture<'static, ()>>;

/// A published view of one collection.
#[derive(Debug)]
pub struct Snapshot<T> {
    /// Most recent collection, ordered as the adapter returned it.
    pub items: Arc<Vec<T>>,
    /// A refetch is in flight.
    pub is_loading: bool,
    /// At least one refetch has completed.
    pub loaded: bool,
    /// Message of the last failed refetch, cleared by the next success.
    pub last_error: Option<String>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            is_loading: self.is_loading,
            loaded: self.loaded,
            last_error: self.last_error.clone(),
        }
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            is_loading: false,
            loaded: false,
            last_error: None,
        }
    }
}

// =============================================================================
// CollectionCache
// =============================================================================

/// Last fetched collection for one entity type.
pub struct CollectionCache<T: Entity> {
    inner: Arc<CacheInner<T>>,
}

impl<T: Entity> Clone for CollectionCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CacheInner<T: Entity> {
    adapter: EntityAdapter<T>,
    sender: watch::Sender<Snapshot<T>>,
    in_flight: Mutex<Option<InFlight>>,
    live: AtomicBool,
}

impl<T: Entity> CollectionCache<T> {
    #[must_use]
    pub fn new(adapter: EntityAdapter<T>) -> Self {
        let (sender, _) = watch::channel(Snapshot::default());
        Self {
            inner: Arc::new(CacheInner {
                adapter,
                sender,
                in_flight: Mutex::new(None),
                live: AtomicBool::new(true),
            }),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<T> {
        self.inner.sender.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.inner.sender.subscribe()
    }

    /// Schedule a background refetch, joining one already in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn invalidate(&self) {
        drop(self.start_refetch());
    }

    /// Invalidate and wait for the refetch to publish.
    pub async fn refresh(&self) -> Snapshot<T> {
        if let Some(refetch) = self.start_refetch() {
            refetch.await;
        }
        self.snapshot()
    }

    /// A settled snapshot: waits for an in-flight refetch, and fetches first
    /// if nothing has loaded yet.
    pub async fn ensure_loaded(&self) -> Snapshot<T> {
        let in_flight = self.inner.lock_in_flight().clone();
        if let Some(refetch) = in_flight {
            refetch.await;
            return self.snapshot();
        }

        let snapshot = self.snapshot();
        if snapshot.loaded || self.is_closed() {
            return snapshot;
        }
        self.refresh().await
    }

    /// Stop publishing. Results of refetches still in flight are dropped.
    pub fn close(&self) {
        self.inner.live.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.inner.live.load(Ordering::Acquire)
    }

    fn start_refetch(&self) -> Option<InFlight> {
        if self.is_closed() {
            debug!(collection = T::COLLECTION, "cache closed, ignoring invalidation");
            return None;
        }

        let mut slot = self.inner.lock_in_flight();
        if let Some(refetch) = slot.as_ref() {
            debug!(collection = T::COLLECTION, "joining in-flight refetch");
            return Some(refetch.clone());
        }

        self.inner.sender.send_modify(|s| s.is_loading = true);

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.refetch().await });
        let refetch = async move {
            if let Err(e) = handle.await {
                error!(collection = T::COLLECTION, error = %e, "refetch task failed");
            }
        }
        .boxed()
        .shared();

        *slot = Some(refetch.clone());
        Some(refetch)
    }
}

impl<T: Entity> CacheInner<T> {
    fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn refetch(&self) {
        let result = self.adapter.list().await;

        // Publish and clear the slot together: an invalidation arriving after
        // this point starts a new refetch instead of joining a finished one.
        let mut slot = self.lock_in_flight();
        slot.take();

        if !self.live.load(Ordering::Acquire) {
            debug!(collection = T::COLLECTION, "cache closed, dropping refetch result");
            return;
        }

        match result {
            Ok(items) => {
                debug!(collection = T::COLLECTION, count = items.len(), "collection refreshed");
                self.sender.send_replace(Snapshot {
                    items: Arc::new(items),
                    is_loading: false,
                    loaded: true,
                    last_error: None,
                });
            }
            Err(e @ StoreError::CorruptLocalState { .. }) => {
                error!(collection = T::COLLECTION, error = %e, "local data unreadable, showing empty collection");
                self.sender.send_replace(Snapshot {
                    items: Arc::new(Vec::new()),
                    is_loading: false,
                    loaded: true,
                    last_error: Some(e.to_string()),
                });
            }
            Err(e) => {
                warn!(collection = T::COLLECTION, error = %e, "refetch failed, keeping previous collection");
                self.sender.send_modify(|s| {
                    s.is_loading = false;
                    s.last_error = Some(e.to_string());
                });
            }
        }
    }
}
