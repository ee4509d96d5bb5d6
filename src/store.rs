//! Persisted poller state.
//!
//! Two durable values survive process restarts: the poll cadence last
//! accepted from the feed and the last-seen freshness marker. Persisted to
//! `~/.config/lookout/poll-state.json`. Reads fall back to defaults when the
//! file is missing or unreadable; writes are best-effort and never surface
//! to the scheduling path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

use crate::error::{LookoutError, Result};

/// On-disk state shape. Unset fields stay unset so callers can apply their
/// own defaults, matching a key-value store with absent keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredState {
    /// Poll cadence in seconds, absent until first persisted.
    interval_secs: Option<u64>,
    /// Last-seen freshness marker, absent until first persisted.
    last_modified: Option<String>,
}

/// Durable key-value state consumed by the scheduler and change detector.
///
/// Implementations are infallible at the call site; persistence failures are
/// logged and swallowed so scheduling is never blocked on storage.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Persisted poll cadence, `None` when never written.
    async fn interval(&self) -> Option<u64>;

    /// Persist a new poll cadence.
    async fn set_interval(&self, interval_secs: u64);

    /// Persisted freshness marker, `None` when never written.
    async fn last_modified(&self) -> Option<String>;

    /// Persist a new freshness marker.
    async fn set_last_modified(&self, marker: String);
}

/// File-backed state store, one small pretty-printed JSON document.
#[derive(Debug)]
pub struct JsonStateStore {
    path: Option<PathBuf>,
    state: Mutex<StoredState>,
}

impl JsonStateStore {
    /// Open a store at the given path, or at the platform default when
    /// `None`. Missing or corrupt files load as empty state.
    pub fn open(path: Option<PathBuf>) -> Self {
        let path = path.or_else(Self::default_state_path);
        let state = match load_state(path.as_deref()) {
            Ok(state) => state,
            Err(e) => {
                warn!("cannot load poller state: {e}");
                StoredState::default()
            }
        };
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    /// Returns the default state file path
    /// (`~/.config/lookout/poll-state.json`).
    pub fn default_state_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var_os("LOCALAPPDATA")
                .map(|d| PathBuf::from(d).join("lookout").join("poll-state.json"))
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var_os("HOME").map(|h| {
                PathBuf::from(h)
                    .join(".config")
                    .join("lookout")
                    .join("poll-state.json")
            })
        }
    }

    fn update(&self, apply: impl FnOnce(&mut StoredState)) {
        let snapshot = {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            apply(&mut state);
            state.clone()
        };
        if let Err(e) = save_state(self.path.as_deref(), &snapshot) {
            warn!("cannot persist poller state: {e}");
        }
    }

    fn read(&self) -> StoredState {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }
}

fn load_state(path: Option<&Path>) -> Result<StoredState> {
    let Some(path) = path else {
        return Ok(StoredState::default());
    };

    let bytes = match std::fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(StoredState::default());
        }
        Err(e) => {
            return Err(LookoutError::Store(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };

    serde_json::from_slice(&bytes)
        .map_err(|e| LookoutError::Store(format!("cannot parse {}: {e}", path.display())))
}

fn save_state(path: Option<&Path>, state: &StoredState) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            LookoutError::Store(format!("cannot create {}: {e}", parent.display()))
        })?;
    }

    let json = serde_json::to_string_pretty(state)
        .map_err(|e| LookoutError::Store(format!("cannot serialize state: {e}")))?;

    std::fs::write(path, json)
        .map_err(|e| LookoutError::Store(format!("cannot write {}: {e}", path.display())))?;

    debug!("persisted poller state to {}", path.display());
    Ok(())
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn interval(&self) -> Option<u64> {
        self.read().interval_secs
    }

    async fn set_interval(&self, interval_secs: u64) {
        self.update(|state| state.interval_secs = Some(interval_secs));
    }

    async fn last_modified(&self) -> Option<String> {
        self.read().last_modified
    }

    async fn set_last_modified(&self, marker: String) {
        self.update(|state| state.last_modified = Some(marker));
    }
}

/// In-memory store for tests and ephemeral deployments.
///
/// Counts writes so tests can assert redundant persistence is skipped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoredState>,
    interval_writes: AtomicUsize,
    marker_writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_interval` calls observed.
    pub fn interval_writes(&self) -> usize {
        self.interval_writes.load(Ordering::SeqCst)
    }

    /// Number of `set_last_modified` calls observed.
    pub fn marker_writes(&self) -> usize {
        self.marker_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn interval(&self) -> Option<u64> {
        self.state.lock().ok().and_then(|state| state.interval_secs)
    }

    async fn set_interval(&self, interval_secs: u64) {
        self.interval_writes.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut state) = self.state.lock() {
            state.interval_secs = Some(interval_secs);
        }
    }

    async fn last_modified(&self) -> Option<String> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.last_modified.clone())
    }

    async fn set_last_modified(&self, marker: String) {
        self.marker_writes.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut state) = self.state.lock() {
            state.last_modified = Some(marker);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[tokio::test]
    async fn missing_file_loads_as_empty_state() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = JsonStateStore::open(Some(dir.path().join("poll-state.json")));
        assert!(store.interval().await.is_none());
        assert!(store.last_modified().await.is_none());
    }

    #[tokio::test]
    async fn state_round_trips_through_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("poll-state.json");

        let store = JsonStateStore::open(Some(path.clone()));
        store.set_interval(90).await;
        store
            .set_last_modified("2020-01-01T00:00:00Z".to_owned())
            .await;

        let reopened = JsonStateStore::open(Some(path));
        assert_eq!(reopened.interval().await, Some(90));
        assert_eq!(
            reopened.last_modified().await.as_deref(),
            Some("2020-01-01T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_empty_state() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("poll-state.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = JsonStateStore::open(Some(path));
        assert!(store.interval().await.is_none());
        assert!(store.last_modified().await.is_none());
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("state").join("poll.json");

        let store = JsonStateStore::open(Some(path.clone()));
        store.set_interval(120).await;

        assert!(path.exists());
    }

    #[test]
    fn load_reports_unreadable_files() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("poll-state.json");
        std::fs::write(&path, "{").unwrap();

        let err = load_state(Some(&path)).unwrap_err();
        assert!(matches!(err, LookoutError::Store(_)));
        assert!(err.to_string().starts_with("store error:"));
    }

    #[tokio::test]
    async fn memory_store_counts_writes() {
        let store = MemoryStore::new();
        store.set_interval(60).await;
        store.set_interval(60).await;
        store.set_last_modified("m1".to_owned()).await;

        assert_eq!(store.interval_writes(), 2);
        assert_eq!(store.marker_writes(), 1);
        assert_eq!(store.interval().await, Some(60));
        assert_eq!(store.last_modified().await.as_deref(), Some("m1"));
    }
}
