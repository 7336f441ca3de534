//! Observable session state.
//!
//! Holds "who is logged in right now" for any number of observers (UI
//! layers, CLI commands). Constructed explicitly and shared by handle;
//! there is no process-wide singleton.

use tokio::sync::watch;

use super::claims::Claims;

/// The identity of the current user, derived from access token claims.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: u64,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email.clone(),
            full_name: claims.full_name.clone(),
        }
    }
}

/// A point-in-time view of the session.
///
/// `loading` is true only during the initial bootstrap read of the token
/// store, before the identity has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl SessionSnapshot {
    /// True once bootstrap has finished and an identity is present.
    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.identity.is_some()
    }
}

/// Observable holder of the current session snapshot.
///
/// Cheap to clone; all clones share the same underlying channel.
/// Mutations are synchronous sends, so a write is visible to every
/// subsequent read in the process.
#[derive(Clone, Debug)]
pub struct SessionState {
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionState {
    /// Create a new state in its bootstrap phase:
    /// `loading=true, identity=None`.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot {
            identity: None,
            loading: true,
        });
        Self { tx }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Set the current identity and mark loading finished.
    pub fn set_identity(&self, identity: Identity) {
        self.tx.send_replace(SessionSnapshot {
            identity: Some(identity),
            loading: false,
        });
    }

    /// Clear to anonymous and mark loading finished.
    pub fn clear(&self) {
        self.tx.send_replace(SessionSnapshot {
            identity: None,
            loading: false,
        });
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
