//! Session state: credential store, snapshot publisher and the flows that
//! mutate them.

pub(crate) mod guard;
pub mod manager;
pub mod publisher;
pub mod store;

pub use manager::{SessionManager, SignInOutcome};
pub use publisher::{FlowPhase, SessionPublisher, SessionSnapshot};
pub use store::{token_preview, CredentialStore, Session};
