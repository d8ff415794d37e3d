//! Time-bounded launch store for the tool-provider side.
//!
//! A tool receives launch parameters in one request and may need them
//! again later, e.g. to push a grade. `LaunchStore` keeps them in
//! memory under an opaque id for a bounded time; expired entries are
//! dropped on access and by `sweep`.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use uuid::Uuid;

struct Entry {
    params: Vec<(String, String)>,
    stored_at: Instant,
}

/// In-memory store of launch parameter sets with a fixed TTL.
///
/// Interior locking keeps the store usable behind an `Arc` from
/// concurrent request handlers.
pub struct LaunchStore {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl LaunchStore {
    /// Create a store whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store a launch parameter set, returning its fresh opaque id.
    ///
    /// Expired entries are dropped before the insert, so the map never
    /// grows past the launches received within one TTL window even if
    /// nothing ever reads them back.
    pub fn put(&self, params: Vec<(String, String)>) -> String {
        let id = Uuid::new_v4().to_string();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| entry.stored_at.elapsed() <= self.ttl);
        entries.insert(
            id.clone(),
            Entry {
                params,
                stored_at: Instant::now(),
            },
        );
        id
    }

    /// Retrieve a stored launch. Returns `None` for unknown ids and
    /// for entries past their TTL, removing the latter.
    pub fn get(&self, id: &str) -> Option<Vec<(String, String)>> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.get(id) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => Some(entry.params.clone()),
            Some(_) => {
                entries.remove(id);
                None
            }
            None => None,
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() <= self.ttl);
        before - entries.len()
    }

    /// Number of live entries (including not-yet-swept expired ones).
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
