//! Read-through, write-invalidate cache of the business-unit tree
//!
//! ## States
//!
//! - **Empty**: no data, nothing in flight
//! - **Fetching**: one `list_business_units` call in flight; every caller that
//!   needs data awaits the same shared future
//! - **Fresh**: data younger than the staleness window, served as is
//! - **Stale**: data at or past the window; still served, but the access
//!   starts a background refetch
//!
//! `invalidate()` drops data and any in-flight fetch from the state, bumping a
//! generation counter so a fetch started before the invalidation can never
//! repopulate the cache. A failed fetch empties the cache and hands the same
//! error to every waiter.
//!
//! The snapshot is never patched: a refetch replaces it wholesale.

use crate::api::{ApiError, PmoApi};
use crate::models::BusinessUnit;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default staleness window
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(120);

/// Immutable business-unit tree shared by every reader
pub type Snapshot = Arc<Vec<BusinessUnit>>;

/// Error surfaced by [`SnapshotCache::get`]
#[derive(Debug, Clone, Error)]
pub enum SnapshotError {
    /// The fetch populating the snapshot failed; every waiter gets the same error
    #[error("Failed to load business units: {0}")]
    Fetch(Arc<ApiError>),

    #[error("Snapshot cache has been disposed")]
    Disposed,
}

impl SnapshotError {
    /// The transport error behind a failed fetch
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SnapshotError::Fetch(err) => Some(err),
            SnapshotError::Disposed => None,
        }
    }
}

/// Observable state of the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPhase {
    Empty,
    Fetching,
    Fresh,
    Stale,
    Disposed,
}

type FetchFuture = Shared<BoxFuture<'static, Result<Snapshot, SnapshotError>>>;

struct Inflight {
    generation: u64,
    future: FetchFuture,
}

struct CacheState {
    data: Option<(Snapshot, Instant)>,
    inflight: Option<Inflight>,
    generation: u64,
    disposed: bool,
}

struct Inner {
    api: Arc<dyn PmoApi>,
    stale_after: Duration,
    state: Mutex<CacheState>,
    fetches: AtomicU64,
}

/// Injectable snapshot cache with lifecycle `new (Empty) -> get/invalidate -> dispose`.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SnapshotCache {
    inner: Arc<Inner>,
}

impl SnapshotCache {
    pub fn new(api: Arc<dyn PmoApi>, stale_after: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                stale_after,
                state: Mutex::new(CacheState {
                    data: None,
                    inflight: None,
                    generation: 0,
                    disposed: false,
                }),
                fetches: AtomicU64::new(0),
            }),
        }
    }

    pub fn stale_after(&self) -> Duration {
        self.inner.stale_after
    }

    /// Number of network fetches started since creation
    pub fn fetch_count(&self) -> u64 {
        self.inner.fetches.load(Ordering::SeqCst)
    }

    /// Return the snapshot, fetching it if absent.
    ///
    /// Concurrent callers share one in-flight fetch. Stale data is returned
    /// immediately while a refetch runs in the background.
    pub async fn get(&self) -> Result<Snapshot, SnapshotError> {
        let future = {
            let mut state = self.inner.state.lock().await;
            if state.disposed {
                return Err(SnapshotError::Disposed);
            }

            let cached = state
                .data
                .as_ref()
                .map(|(data, fetched_at)| (Arc::clone(data), fetched_at.elapsed()));
            if let Some((data, age)) = cached {
                if age < self.inner.stale_after {
                    return Ok(data);
                }

                debug!(age_secs = age.as_secs(), "Serving stale snapshot, refreshing");

                let refresh = self.start_fetch(&mut state);
                tokio::spawn(async move {
                    // Errors are recorded in the cache state by the fetch itself
                    let _ = refresh.await;
                });
                return Ok(data);
            }

            self.start_fetch(&mut state)
        };

        future.await
    }

    /// Current snapshot without triggering any fetch
    pub async fn peek(&self) -> Option<Snapshot> {
        let state = self.inner.state.lock().await;
        state.data.as_ref().map(|(data, _)| Arc::clone(data))
    }

    /// Drop cached data so the next `get` refetches
    pub async fn invalidate(&self) {
        let mut state = self.inner.state.lock().await;
        state.generation += 1;
        state.data = None;
        state.inflight = None;
        debug!(generation = state.generation, "Snapshot invalidated");
    }

    /// Tear the cache down; later `get` calls fail and in-flight results are discarded
    pub async fn dispose(&self) {
        let mut state = self.inner.state.lock().await;
        state.disposed = true;
        state.generation += 1;
        state.data = None;
        state.inflight = None;
        info!("Snapshot cache disposed");
    }

    pub async fn phase(&self) -> SnapshotPhase {
        let state = self.inner.state.lock().await;
        if state.disposed {
            return SnapshotPhase::Disposed;
        }
        match (&state.data, &state.inflight) {
            (Some((_, fetched_at)), _) if fetched_at.elapsed() < self.inner.stale_after => {
                SnapshotPhase::Fresh
            }
            (Some(_), _) => SnapshotPhase::Stale,
            (None, Some(_)) => SnapshotPhase::Fetching,
            (None, None) => SnapshotPhase::Empty,
        }
    }

    /// Join the in-flight fetch, or start one tagged with the current generation
    fn start_fetch(&self, state: &mut CacheState) -> FetchFuture {
        if let Some(inflight) = &state.inflight {
            if inflight.generation == state.generation {
                return inflight.future.clone();
            }
        }

        let generation = state.generation;
        let inner = Arc::clone(&self.inner);
        let fetch_no = inner.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, fetch_no, "Fetching business-unit snapshot");

        let future = async move {
            let result = inner.api.list_business_units().await;

            let mut state = inner.state.lock().await;
            let current = !state.disposed && state.generation == generation;
            if current {
                state.inflight = None;
            }

            match result {
                Ok(units) => {
                    let snapshot: Snapshot = Arc::new(units);
                    if current {
                        debug!(
                            generation,
                            units = snapshot.len(),
                            "Snapshot refreshed"
                        );
                        state.data = Some((Arc::clone(&snapshot), Instant::now()));
                    } else {
                        debug!(generation, "Discarding snapshot fetched before invalidation");
                    }
                    Ok(snapshot)
                }
                Err(err) => {
                    warn!(generation, error = %err, "Snapshot fetch failed");
                    if current {
                        state.data = None;
                    }
                    Err(SnapshotError::Fetch(Arc::new(err)))
                }
            }
        }
        .boxed()
        .shared();

        state.inflight = Some(Inflight {
            generation,
            future: future.clone(),
        });
        future
    }
}
