//! streamdata-auth: Twitch sign-in for desktop clients.
//!
//! Runs the OAuth2 implicit grant through a pluggable
//! [`AuthorizationAgent`](auth::AuthorizationAgent), validates the returned
//! state nonce, fetches the user profile with the issued token, and keeps a
//! single in-memory session that consumers observe through a
//! [`tokio::sync::watch`] channel.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use streamdata_auth::prelude::*;
//!
//! # async fn example() -> Result<(), AuthError> {
//! let config = AuthConfig::from_env()?;
//! let manager = SessionManager::new(config, Arc::new(ConsoleAgent::stdio()))?;
//!
//! match manager.sign_in().await? {
//!     SignInOutcome::Authenticated(user) => println!("signed in as {}", user.display_name),
//!     SignInOutcome::Declined => println!("sign-in declined"),
//! }
//!
//! let followed: serde_json::Value = manager.api().get_json("channels/followed").await?;
//! println!("{followed}");
//!
//! manager.sign_out().await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod prelude;
pub mod session;
