//! Implicit-grant building blocks: request, agent, callback and API client.

pub mod agent;
pub mod api;
pub mod console;
pub mod error;
pub mod request;
pub mod user;

pub use agent::{AuthorizationAgent, AuthorizationOutcome, AuthorizationResponse, CallbackParams};
pub use api::ApiClient;
pub use console::ConsoleAgent;
pub use error::AuthError;
pub use request::{AuthorizationRequest, NonceFn};
pub use user::User;
