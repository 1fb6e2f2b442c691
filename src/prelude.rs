//! Convenience re-exports for common use.

pub use crate::auth::{
    ApiClient, AuthError, AuthorizationAgent, AuthorizationOutcome, AuthorizationResponse,
    CallbackParams, ConsoleAgent, User,
};
pub use crate::config::AuthConfig;
pub use crate::session::{FlowPhase, SessionManager, SessionSnapshot, SignInOutcome};
