// src/core/store.rs — Session store: sole owner of chat state
//
// Pure state container: no I/O, no globals. Mutations are synchronous and
// atomic from the caller's perspective; reads are lookups into the session
// collection. The active conversation is derived by current-id lookup, so
// there is exactly one copy of every transcript.

use chrono::Utc;

use super::message::{Message, MessageDraft};
use super::session::{self, Session, DEFAULT_SESSION_NAME, RECOVERY_SESSION_NAME};
use crate::infra::errors::ChatError;

#[derive(Debug)]
pub struct SessionStore {
    /// Newest-created-first; unique by id. Never empty after any operation.
    sessions: Vec<Session>,
    current_session_id: Option<String>,
    // Transient, never persisted
    is_loading: bool,
    error: Option<String>,
}

impl SessionStore {
    /// Fresh store for a first run: one empty session named "default".
    pub fn new() -> Self {
        let session = Session::new(DEFAULT_SESSION_NAME);
        let current = session.id.clone();
        Self {
            sessions: vec![session],
            current_session_id: Some(current),
            is_loading: false,
            error: None,
        }
    }

    /// Rebuild from persisted parts, repairing the current-session invariant.
    ///
    /// An empty snapshot hydrates like a first run. A missing or dangling
    /// current id is pointed at the newest session: "no current session" is a
    /// transient in-process state, not one worth resurrecting across restarts.
    pub fn from_parts(sessions: Vec<Session>, current_session_id: Option<String>) -> Self {
        if sessions.is_empty() {
            return Self::new();
        }

        let current = current_session_id
            .filter(|id| sessions.iter().any(|s| &s.id == id))
            .or_else(|| sessions.first().map(|s| s.id.clone()));

        Self {
            sessions,
            current_session_id: current,
            is_loading: false,
            error: None,
        }
    }

    // ─── Session operations ─────────────────────────────────────

    /// Create a session with a timestamp label, insert it at the front,
    /// and make it current. Never fails.
    pub fn create_session(&mut self) -> String {
        self.install_fresh_session(&session::timestamp_name(Utc::now()))
    }

    /// Make the given session current. `None` clears the current session
    /// (a transient no-active state). An unknown id is silently ignored.
    pub fn load_session(&mut self, id: Option<&str>) {
        match id {
            None => self.current_session_id = None,
            Some(id) => {
                if self.sessions.iter().any(|s| s.id == id) {
                    self.current_session_id = Some(id.to_string());
                }
            }
        }
    }

    /// Append a message to the current session, assigning id and timestamp,
    /// refreshing `last_updated`, and clearing any stored error.
    pub fn add_message(&mut self, draft: MessageDraft) -> Result<&Message, ChatError> {
        let idx = self
            .current_index()
            .ok_or(ChatError::NoActiveSession)?;
        self.error = None;
        Ok(self.sessions[idx].append(draft))
    }

    /// Remove a session. If it was current, or removal empties the set,
    /// a fresh session is synthesized and made current.
    pub fn delete_session(&mut self, id: &str) {
        let was_current = self.current_session_id.as_deref() == Some(id);
        self.sessions.retain(|s| s.id != id);
        if was_current || self.sessions.is_empty() {
            self.install_fresh_session(RECOVERY_SESSION_NAME);
        }
    }

    /// Replace the entire session set with one fresh session, made current.
    pub fn delete_all_sessions(&mut self) {
        self.sessions.clear();
        self.install_fresh_session(RECOVERY_SESSION_NAME);
    }

    /// Pure rename; no-op when the id is unknown.
    pub fn rename_session(&mut self, id: &str, new_name: &str) {
        if let Some(s) = self.sessions.iter_mut().find(|s| s.id == id) {
            s.name = new_name.to_string();
        }
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current_index().map(|idx| &self.sessions[idx])
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session_id.as_deref()
    }

    // ─── Transient status ───────────────────────────────────────

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Truncate the current session's transcript.
    pub fn clear_messages(&mut self) {
        if let Some(idx) = self.current_index() {
            self.sessions[idx].clear();
        }
    }

    // ─── Internal ───────────────────────────────────────────────

    fn current_index(&self) -> Option<usize> {
        let id = self.current_session_id.as_deref()?;
        self.sessions.iter().position(|s| s.id == id)
    }

    fn install_fresh_session(&mut self, name: &str) -> String {
        let session = Session::new(name);
        let id = session.id.clone();
        self.sessions.insert(0, session);
        self.current_session_id = Some(id.clone());
        id
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
