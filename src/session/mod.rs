//! Process-wide authenticated state.
//!
//! The store is created once and handed to every component that needs it;
//! nothing reads it through a global. Only the auth service (login,
//! register, rehydrate), `logout`, and the gateway's unauthorized hook write
//! it. Each transition bumps an epoch so a response can tell whether the
//! session it was sent under is still the current one.

pub mod storage;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::models::Admin;
use storage::{CredentialStorage, Persisted};

/// Opaque bearer token. Debug output never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// A signed-in operator. Identity exists exactly when a credential does.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub credential: Credential,
    pub identity: Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    LoggedOut,
    LoggedIn,
}

/// Credential to attach to one outbound request, with the epoch it belongs to
#[derive(Debug, Clone)]
pub struct RequestAuth {
    pub credential: Option<Credential>,
    pub epoch: u64,
}

#[derive(Default)]
struct SessionState {
    session: Option<Session>,
    epoch: u64,
}

pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Arc<dyn CredentialStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            storage,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> Option<Session> {
        self.read().session.clone()
    }

    pub fn identity(&self) -> Option<Admin> {
        self.read().session.as_ref().map(|s| s.identity.clone())
    }

    pub fn status(&self) -> SessionStatus {
        if self.read().session.is_some() {
            SessionStatus::LoggedIn
        } else {
            SessionStatus::LoggedOut
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.status() == SessionStatus::LoggedIn
    }

    pub fn epoch(&self) -> u64 {
        self.read().epoch
    }

    /// Snapshot taken when a request is built
    pub fn request_auth(&self) -> RequestAuth {
        let state = self.read();
        RequestAuth {
            credential: state.session.as_ref().map(|s| s.credential.clone()),
            epoch: state.epoch,
        }
    }

    /// LoggedOut -> LoggedIn. Persists first so memory and disk never disagree.
    pub(crate) fn establish(&self, session: Session) -> Result<()> {
        self.storage.save(session.credential.as_str(), &session.identity)?;
        let mut state = self.write();
        tracing::info!(admin = %session.identity.email, "session established");
        state.session = Some(session);
        state.epoch += 1;
        Ok(())
    }

    /// Clear memory and storage unconditionally. Never calls the server.
    pub fn logout(&self) {
        let mut state = self.write();
        if state.session.take().is_some() {
            tracing::info!("logged out");
        }
        state.epoch += 1;
        drop(state);
        self.wipe_persisted();
    }

    /// Forced logout after an unauthorized response.
    ///
    /// Returns true only for the call that actually ends the session the
    /// request was sent under; later or stale callers get false.
    pub(crate) fn invalidate(&self, epoch: u64) -> bool {
        let mut state = self.write();
        if state.epoch != epoch || state.session.is_none() {
            return false;
        }
        state.session = None;
        state.epoch += 1;
        drop(state);
        self.wipe_persisted();
        tracing::warn!("session invalidated by unauthorized response");
        true
    }

    pub(crate) fn persisted(&self) -> Result<Persisted> {
        self.storage.load()
    }

    pub(crate) fn wipe_persisted(&self) {
        if let Err(e) = self.storage.clear() {
            tracing::error!("failed to clear persisted session: {}", e);
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("SessionStore")
            .field("logged_in", &state.session.is_some())
            .field("epoch", &state.epoch)
            .finish()
    }
}
