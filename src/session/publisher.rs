use serde::Serialize;
use tokio::sync::watch;

use crate::auth::User;

/// Where the sign-in/sign-out state machine currently sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FlowPhase {
    #[default]
    Idle,
    Authorizing,
    Validating,
    FetchingProfile,
    Authenticated,
    Revoking,
}

/// Point-in-time view of the session, as consumers see it.
///
/// Subscribe to changes via [`SessionPublisher::subscribe`]. `user` is only
/// ever `Some` together with `has_credential`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub has_credential: bool,
    pub is_signing_in: bool,
    pub is_signing_out: bool,
    pub phase: FlowPhase,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.has_credential
    }
}

/// Broadcasts [`SessionSnapshot`]s to any number of consumers.
///
/// Every update replaces the whole snapshot under the channel lock, so a
/// receiver observes either the state before or after a transition.
#[derive(Debug)]
pub struct SessionPublisher {
    tx: watch::Sender<SessionSnapshot>,
}

impl Default for SessionPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionPublisher {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        Self { tx }
    }

    /// Callers can `.changed().await` on the receiver to follow transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub(crate) fn update(&self, modify: impl FnOnce(&mut SessionSnapshot)) {
        self.tx.send_modify(modify);
    }

    /// Apply `modify` only if `check` passes; returns whether it ran.
    pub(crate) fn update_if(
        &self,
        check: impl FnOnce(&SessionSnapshot) -> bool,
        modify: impl FnOnce(&mut SessionSnapshot),
    ) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if !check(snapshot) {
                return false;
            }
            modify(snapshot);
            true
        })
    }
}
