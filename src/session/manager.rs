//! Sign-in / sign-out orchestration.
//!
//! [`SessionManager`] is the only writer of the credential store and of the
//! API client's bearer header. Consumers read through
//! [`SessionManager::subscribe`] or [`SessionManager::snapshot`].
//!
//! Sign-in and sign-out may overlap, but the stages that touch the bearer
//! and the store (profile fetch and commit, revoke and clear) hold the same
//! lock, so they run one after the other.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::guard::{Flow, FlowGuard, PendingBearer};
use super::publisher::{FlowPhase, SessionPublisher, SessionSnapshot};
use super::store::{token_preview, CredentialStore, Session};
use crate::auth::request::generate_nonce;
use crate::auth::{
    ApiClient, AuthError, AuthorizationAgent, AuthorizationOutcome, AuthorizationRequest,
    AuthorizationResponse, NonceFn, User,
};
use crate::config::AuthConfig;

/// How a sign-in call that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// State validated, profile fetched, session installed.
    Authenticated(User),
    /// The user cancelled or the provider answered `access_denied`.
    Declined,
}

/// One per process: owns the session, the shared API client and the agent.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use streamdata_auth::auth::ConsoleAgent;
/// use streamdata_auth::config::AuthConfig;
/// use streamdata_auth::session::{SessionManager, SignInOutcome};
///
/// # async fn example() -> Result<(), streamdata_auth::auth::AuthError> {
/// let manager = SessionManager::new(AuthConfig::from_env()?, Arc::new(ConsoleAgent::stdio()))?;
/// let mut updates = manager.subscribe();
///
/// if let SignInOutcome::Authenticated(user) = manager.sign_in().await? {
///     println!("hello {}", user.display_name);
/// }
/// updates.changed().await.ok();
/// manager.sign_out().await;
/// # Ok(())
/// # }
/// ```
pub struct SessionManager {
    config: AuthConfig,
    api: Arc<ApiClient>,
    agent: Arc<dyn AuthorizationAgent>,
    store: CredentialStore,
    publisher: SessionPublisher,
    nonce_fn: NonceFn,
    credentials: Mutex<()>,
}

impl SessionManager {
    pub fn new(config: AuthConfig, agent: Arc<dyn AuthorizationAgent>) -> Result<Self, AuthError> {
        let api = Arc::new(ApiClient::new(&config)?);
        Ok(Self {
            config,
            api,
            agent,
            store: CredentialStore::new(),
            publisher: SessionPublisher::new(),
            nonce_fn: Arc::new(generate_nonce),
            credentials: Mutex::new(()),
        })
    }

    /// Override how state nonces are produced.
    pub fn with_nonce_fn(mut self, nonce_fn: NonceFn) -> Self {
        self.nonce_fn = nonce_fn;
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// The shared client; carries the bearer credential while signed in.
    pub fn api(&self) -> Arc<ApiClient> {
        self.api.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.publisher.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.publisher.snapshot()
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_active()
    }

    /// Run the implicit-grant sign-in.
    ///
    /// Waits on the authorization agent without a timeout. Returns
    /// [`SignInOutcome::Declined`] when the user backs out; errors leave the
    /// previous session (if any) untouched.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SignInInProgress`] if another sign-in is running.
    /// - [`AuthError::StateMismatch`] if the callback state differs from the
    ///   issued nonce.
    /// - Transport or decoding errors from the agent or the profile fetch.
    pub async fn sign_in(&self) -> Result<SignInOutcome, AuthError> {
        let Some(_flow) = FlowGuard::acquire(&self.publisher, Flow::SignIn) else {
            warn!("sign-in requested while another attempt is in flight");
            return Err(AuthError::SignInInProgress);
        };

        let result = self.run_sign_in().await;
        match &result {
            Ok(SignInOutcome::Authenticated(user)) => {
                info!(user_id = %user.id, display_name = %user.display_name, "signed in");
            }
            Ok(SignInOutcome::Declined) => info!("sign-in declined"),
            Err(error) => warn!(error = %error, "sign-in failed"),
        }
        result
    }

    async fn run_sign_in(&self) -> Result<SignInOutcome, AuthError> {
        let request = AuthorizationRequest::with_nonce(&self.config, (self.nonce_fn)());

        self.set_phase(FlowPhase::Authorizing);
        let response = self
            .agent
            .authorize(&request.authorization_url(), request.redirect_uri())
            .await?;

        self.set_phase(FlowPhase::Validating);
        let Some(access_token) = validate_callback(&request, response)? else {
            return Ok(SignInOutcome::Declined);
        };

        // Not held across the agent wait, which has no timeout.
        let _credentials = self.credentials.lock().await;
        let pending = PendingBearer::install(&self.api, &access_token);
        debug!(token = %token_preview(&access_token), "installed bearer credential");

        self.set_phase(FlowPhase::FetchingProfile);
        let user = self.api.fetch_profile().await?;

        self.store.replace(Session::new(user.clone(), access_token));
        pending.commit();
        let has_credential = self.api.has_bearer();
        self.publisher.update(|snapshot| {
            snapshot.user = Some(user.clone());
            snapshot.has_credential = has_credential;
            snapshot.phase = FlowPhase::Authenticated;
        });
        Ok(SignInOutcome::Authenticated(user))
    }

    /// Revoke the token (best effort) and clear the local session.
    ///
    /// Never fails: the local session is gone when this returns, whatever
    /// the provider answered. A call made while another sign-out is running
    /// waits for that one to finish. A sign-in that is fetching its profile
    /// finishes (or fails) before revocation starts.
    pub async fn sign_out(&self) {
        let Some(_flow) = FlowGuard::acquire(&self.publisher, Flow::SignOut) else {
            debug!("sign-out already in progress; waiting for it");
            let mut updates = self.publisher.subscribe();
            let _ = updates.wait_for(|snapshot| !snapshot.is_signing_out).await;
            return;
        };
        let _credentials = self.credentials.lock().await;
        let _clear = ClearOnDrop { manager: self };

        self.set_phase(FlowPhase::Revoking);
        match self.store.access_token() {
            Some(token) => match self.api.revoke(&token).await {
                Ok(()) => debug!("token revoked"),
                Err(error) => {
                    warn!(error = %error, "token revocation failed; clearing local session anyway");
                }
            },
            None => debug!("no active session; skipping revocation"),
        }
    }

    fn clear_local(&self) {
        let previous = self.store.clear();
        self.api.clear_bearer();
        self.publisher.update(|snapshot| {
            snapshot.user = None;
            snapshot.has_credential = false;
        });
        if let Some(session) = previous {
            info!(user_id = %session.user.id, "signed out");
        }
    }

    fn set_phase(&self, phase: FlowPhase) {
        debug!(%phase, "session phase");
        self.publisher.update(|snapshot| snapshot.phase = phase);
    }
}

/// Clears the local session when sign-out returns or is abandoned.
struct ClearOnDrop<'a> {
    manager: &'a SessionManager,
}

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.manager.clear_local();
    }
}

/// `Ok(None)` for declined consent, `Ok(Some(token))` for a usable callback.
fn validate_callback(
    request: &AuthorizationRequest,
    response: AuthorizationResponse,
) -> Result<Option<String>, AuthError> {
    let AuthorizationResponse { outcome, params } = response;
    match outcome {
        AuthorizationOutcome::Success => {}
        AuthorizationOutcome::Cancelled => {
            debug!("authorization cancelled by the user");
            return Ok(None);
        }
        AuthorizationOutcome::Error => {
            warn!(error = ?params.error, "authorization agent reported an error");
            return Ok(None);
        }
    }
    if params.is_access_denied() {
        debug!(description = ?params.error_description, "provider returned access_denied");
        return Ok(None);
    }
    if params.state.as_deref() != Some(request.state_nonce()) {
        return Err(AuthError::StateMismatch);
    }
    match params.access_token {
        Some(token) if !token.is_empty() => Ok(Some(token)),
        _ => Err(AuthError::InvalidResponse(
            "authorization callback carried no access token".to_string(),
        )),
    }
}
