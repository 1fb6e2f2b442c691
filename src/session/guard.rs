//! Scoped acquisition of the in-progress flags.

use super::publisher::{FlowPhase, SessionPublisher};
use crate::auth::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    SignIn,
    SignOut,
}

impl Flow {
    fn flag(self, snapshot: &mut super::SessionSnapshot) -> &mut bool {
        match self {
            Self::SignIn => &mut snapshot.is_signing_in,
            Self::SignOut => &mut snapshot.is_signing_out,
        }
    }
}

/// Holds `is_signing_in` / `is_signing_out` true for its lifetime.
///
/// Dropping the guard (return, `?`, or the caller dropping the future)
/// clears the flag exactly once.
pub(crate) struct FlowGuard<'a> {
    publisher: &'a SessionPublisher,
    flow: Flow,
}

impl<'a> FlowGuard<'a> {
    /// `None` when the same flow is already in progress.
    pub(crate) fn acquire(publisher: &'a SessionPublisher, flow: Flow) -> Option<Self> {
        let acquired = publisher.update_if(
            |snapshot| match flow {
                Flow::SignIn => !snapshot.is_signing_in,
                Flow::SignOut => !snapshot.is_signing_out,
            },
            |snapshot| *flow.flag(snapshot) = true,
        );
        acquired.then_some(Self { publisher, flow })
    }
}

impl Drop for FlowGuard<'_> {
    fn drop(&mut self) {
        let flow = self.flow;
        self.publisher.update(|snapshot| {
            *flow.flag(snapshot) = false;
            if snapshot.is_signing_in || snapshot.is_signing_out {
                return;
            }
            snapshot.phase = if snapshot.is_authenticated() {
                FlowPhase::Authenticated
            } else {
                FlowPhase::Idle
            };
        });
    }
}

/// A bearer credential installed for an attempt that has not committed yet.
///
/// Unless [`commit`](Self::commit) is called, dropping it puts back whatever
/// credential was installed before the attempt.
pub(crate) struct PendingBearer<'a> {
    api: &'a ApiClient,
    previous: Option<String>,
    committed: bool,
}

impl<'a> PendingBearer<'a> {
    pub(crate) fn install(api: &'a ApiClient, token: &str) -> Self {
        let previous = api.set_bearer(token);
        Self {
            api,
            previous,
            committed: false,
        }
    }

    pub(crate) fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingBearer<'_> {
    fn drop(&mut self) {
        if !self.committed {
            tracing::debug!("rolling back bearer credential of failed sign-in");
            self.api.restore_bearer(self.previous.take());
        }
    }
}
