//! The counter/vote state manager.
//!
//! Two authorities sit behind [`StateStore`]:
//!
//! - the local [`RecordStore`] owns `voters` and `event_text`, and the count
//!   whenever no remote counter answers;
//! - the optional [`RemoteCounter`] owns the count while it is reachable.
//!
//! Every remote call is bounded by a timeout and any failure falls back to
//! the local record. After a successful remote increment the local count is
//! set to the remote value, so a later fallback resumes from the last count
//! seen remotely. A reset that cannot reach the remote marks it stale, and
//! the local count is used until a later reset zeroes the remote. Nothing
//! rebuilds the remote count from the voter set after an outage.

use crate::errors::StoreError;
use crate::models::CounterState;
use async_trait::async_trait;
use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Never fails: unreadable records come back as the default state.
    async fn load(&self) -> CounterState;

    async fn save(&self, state: &CounterState) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RemoteCounter: Send + Sync {
    async fn get(&self) -> Result<u64, StoreError>;

    async fn incr(&self) -> Result<u64, StoreError>;

    async fn reset(&self) -> Result<(), StoreError>;
}

/// In-memory record for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryRecord {
    state: Mutex<CounterState>,
}

impl MemoryRecord {
    pub fn new(state: CounterState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecord {
    async fn load(&self) -> CounterState {
        self.state.lock().await.clone()
    }

    async fn save(&self, state: &CounterState) -> Result<(), StoreError> {
        *self.state.lock().await = state.clone();
        Ok(())
    }
}

pub struct StateStore {
    record: Arc<dyn RecordStore>,
    remote: Option<Arc<dyn RemoteCounter>>,
    remote_timeout: Duration,
    // Set when a reset could not reach the remote counter.
    remote_stale: AtomicBool,
    // Serializes read-modify-write of the record within this process.
    write_lock: Mutex<()>,
}

impl StateStore {
    pub fn new(record: Arc<dyn RecordStore>) -> Self {
        Self {
            record,
            remote: None,
            remote_timeout: Duration::from_millis(crate::config::DEFAULT_REMOTE_TIMEOUT_MS),
            remote_stale: AtomicBool::new(false),
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRecord::default()))
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteCounter>, timeout: Duration) -> Self {
        self.remote = Some(remote);
        self.remote_timeout = timeout;
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn get(&self) -> CounterState {
        let mut state = self.record.load().await;
        if let Some(count) = self.remote_call("get", |remote| remote.get()).await {
            state.count = count;
        }
        state
    }

    pub async fn has_voter(&self, voter_key: &str) -> bool {
        self.record.load().await.voters.contains(voter_key)
    }

    /// Counts one vote. A key that is already recorded is a no-op returning
    /// the current count; `None` skips voter tracking entirely.
    ///
    /// The voter is saved locally before the remote `INCR`, so a failed local
    /// write leaves the remote untouched and a retry cannot double count.
    pub async fn increment(&self, voter_key: Option<&str>) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.record.load().await;

        if let Some(key) = voter_key {
            if state.voters.contains(key) {
                debug!("voter already recorded, skipping increment");
                let current = self.remote_call("get", |remote| remote.get()).await;
                return Ok(current.unwrap_or(state.count));
            }
            state.voters.insert(key.to_string());
        }

        state.count = state.count.saturating_add(1);
        self.record.save(&state).await?;

        if let Some(count) = self.remote_call("incr", |remote| remote.incr()).await {
            if count != state.count {
                state.count = count;
                if let Err(err) = self.record.save(&state).await {
                    warn!("failed to mirror remote count {count} locally: {err}");
                }
            }
        }
        Ok(state.count)
    }

    /// Zeroes the count and forgets every voter. If the remote counter cannot
    /// be zeroed it is marked stale and ignored until a later reset reaches it.
    pub async fn reset(&self) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.record.load().await;
        state.count = 0;
        state.voters.clear();
        self.record.save(&state).await?;

        if let Some(remote) = self.remote.as_deref() {
            match self.bounded(remote.reset()).await {
                Ok(()) => {
                    if self.remote_stale.swap(false, Ordering::SeqCst) {
                        info!("remote counter zeroed, using it again");
                    }
                }
                Err(err) => {
                    warn!("remote reset failed, ignoring remote count until the next reset: {err}");
                    self.remote_stale.store(true, Ordering::SeqCst);
                }
            }
        }
        Ok(0)
    }

    pub async fn set_event_text(&self, text: impl Into<String>) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.record.load().await;
        state.event_text = text.into();

        self.record.save(&state).await?;
        Ok(state.event_text)
    }

    /// Runs `op` against the remote counter, if any. `None` means "use the
    /// local record": no remote configured, remote marked stale, an error,
    /// or a timeout.
    async fn remote_call<'a, T, F, Fut>(&'a self, op: &str, f: F) -> Option<T>
    where
        F: FnOnce(&'a dyn RemoteCounter) -> Fut,
        Fut: Future<Output = Result<T, StoreError>> + 'a,
    {
        if self.remote_stale.load(Ordering::SeqCst) {
            return None;
        }
        let remote = self.remote.as_deref()?;

        match self.bounded(f(remote)).await {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("remote {op} failed, falling back to local state: {err}");
                None
            }
        }
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.remote_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.remote_timeout)),
        }
    }
}
