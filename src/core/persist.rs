// src/core/persist.rs — Snapshot persistence for the session store
//
// The store itself does no I/O. This module owns the on-disk snapshot
// format (schema version 1) and a `SharedStore` handle that persists
// after every durable mutation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::message::{Message, MessageDraft};
use super::session::Session;
use super::store::SessionStore;
use crate::infra::errors::ChatError;

pub const STORAGE_VERSION: u32 = 1;

/// Durable view of a [`SessionStore`]. Transient status (loading flag,
/// error text) is deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub sessions: Vec<Session>,
    pub current_session_id: Option<String>,
}

impl StoreSnapshot {
    pub fn of(store: &SessionStore) -> Self {
        Self {
            version: STORAGE_VERSION,
            sessions: store.sessions().to_vec(),
            current_session_id: store.current_session_id().map(str::to_string),
        }
    }

    pub fn into_store(self) -> SessionStore {
        SessionStore::from_parts(self.sessions, self.current_session_id)
    }
}

/// Read a snapshot from disk. Missing file, unreadable JSON, or a schema
/// version we don't understand all yield `None`; the caller starts fresh.
pub fn load_snapshot(path: &Path) -> Option<StoreSnapshot> {
    let raw = std::fs::read_to_string(path).ok()?;
    let snap: StoreSnapshot = match serde_json::from_str(&raw) {
        Ok(s) => s,
        Err(e) => {
            warn!("Ignoring unreadable chat store at {}: {}", path.display(), e);
            return None;
        }
    };
    if snap.version != STORAGE_VERSION {
        warn!(
            "Ignoring chat store at {} with schema version {} (expected {})",
            path.display(),
            snap.version,
            STORAGE_VERSION
        );
        return None;
    }
    Some(snap)
}

/// Atomically write a snapshot (temp file + rename).
pub fn save_snapshot(path: &Path, snapshot: &StoreSnapshot) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp = path.with_extension("json.tmp");

    let mut f = std::fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    f.flush()?;
    f.sync_all()?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Hydrate a store from disk, or start fresh when nothing usable exists.
pub fn hydrate(path: &Path) -> SessionStore {
    match load_snapshot(path) {
        Some(snap) => snap.into_store(),
        None => SessionStore::new(),
    }
}

// ─── Shared handle ──────────────────────────────────────────────

/// Thread-safe store handle shared by the HTTP layer and the REPL.
///
/// Durable mutations take the lock, apply, snapshot, then persist outside
/// the critical section. Persistence failures are logged, never fatal;
/// the in-memory state stays authoritative. Transient status updates
/// (loading flag, error text) skip the disk entirely.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<SessionStore>>,
    path: Option<PathBuf>,
}

impl SharedStore {
    /// Open (or create) the store backed by `path`.
    pub fn open(path: PathBuf) -> Self {
        let store = hydrate(&path);
        Self {
            inner: Arc::new(Mutex::new(store)),
            path: Some(path),
        }
    }

    /// Store with no backing file. Used by tests and `chatx status`.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionStore::new())),
            path: None,
        }
    }

    // ─── Durable mutations ──────────────────────────────────────

    pub fn create_session(&self) -> String {
        self.mutate(|s| s.create_session())
    }

    pub fn load_session(&self, id: Option<&str>) {
        self.mutate(|s| s.load_session(id));
    }

    pub fn add_message(&self, draft: MessageDraft) -> Result<Message, ChatError> {
        self.mutate(|s| s.add_message(draft).map(|m| m.clone()))
    }

    pub fn delete_session(&self, id: &str) {
        self.mutate(|s| s.delete_session(id));
    }

    pub fn delete_all_sessions(&self) {
        self.mutate(|s| s.delete_all_sessions());
    }

    pub fn rename_session(&self, id: &str, new_name: &str) {
        self.mutate(|s| s.rename_session(id, new_name));
    }

    pub fn clear_messages(&self) {
        self.mutate(|s| s.clear_messages());
    }

    // ─── Transient status (in-memory only) ──────────────────────

    pub fn set_loading(&self, loading: bool) {
        self.lock().set_loading(loading);
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn set_error(&self, error: Option<String>) {
        self.lock().set_error(error);
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error().map(str::to_string)
    }

    // ─── Reads ──────────────────────────────────────────────────

    pub fn current_session(&self) -> Option<Session> {
        self.lock().current_session().cloned()
    }

    pub fn current_session_id(&self) -> Option<String> {
        self.lock().current_session_id().map(str::to_string)
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.lock().sessions().to_vec()
    }

    // ─── Internal ───────────────────────────────────────────────

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionStore> {
        // Store mutations never panic while holding the guard.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mutate<T>(&self, apply: impl FnOnce(&mut SessionStore) -> T) -> T {
        let (out, snapshot) = {
            let mut guard = self.lock();
            let out = apply(&mut guard);
            (out, StoreSnapshot::of(&guard))
        };
        if let Some(path) = &self.path {
            if let Err(e) = save_snapshot(path, &snapshot) {
                warn!("Failed to persist chat store: {e}");
            }
        }
        out
    }
}
