use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::auth::User;

/// Authenticated identity plus the bearer credential that proves it.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    access_token: String,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: User, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
            signed_in_at: Utc::now(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("access_token", &token_preview(&self.access_token))
            .field("signed_in_at", &self.signed_in_at)
            .finish()
    }
}

/// In-memory holder of the current [`Session`].
///
/// Whole-session writes only: readers see either the previous session or
/// the new one, never a mix.
#[derive(Debug, Default)]
pub struct CredentialStore {
    session: RwLock<Option<Session>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn user(&self) -> Option<User> {
        self.current().map(|session| session.user)
    }

    pub fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    pub fn is_active(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// Replace the current session, returning the previous one.
    pub fn replace(&self, session: Session) -> Option<Session> {
        self.session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(session)
    }

    pub fn clear(&self) -> Option<Session> {
        self.session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

/// First few characters of a token, for logs.
pub fn token_preview(token: &str) -> String {
    if token.len() > 12 && token.is_char_boundary(6) {
        format!("{}...", &token[..6])
    } else {
        "***".to_string()
    }
}
