#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use streamdata_auth::auth::{
    AuthError, AuthorizationAgent, AuthorizationResponse, CallbackParams, NonceFn, User,
};
use streamdata_auth::config::AuthConfig;
use tokio::sync::Notify;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "test-client";

type Respond = dyn Fn(&str) -> Result<AuthorizationResponse, AuthError> + Send + Sync;

/// Agent whose answer is computed from the authorization URL it was given.
pub struct ScriptedAgent {
    respond: Box<Respond>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedAgent {
    pub fn new(
        respond: impl Fn(&str) -> Result<AuthorizationResponse, AuthError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always hands back `response`, whatever the request.
    pub fn returning(response: AuthorizationResponse) -> Self {
        Self::new(move |_| Ok(response.clone()))
    }

    /// Behaves like a well-formed provider: echoes the request's state and
    /// issues `token`.
    pub fn echo_state(token: &str) -> Self {
        let token = token.to_string();
        Self::new(move |url| Ok(granted(state_param(url).as_deref(), &token)))
    }

    /// Like [`echo_state`](Self::echo_state), issuing `tokens` in order and
    /// repeating the last one.
    pub fn issuing(tokens: &[&str]) -> Self {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        let attempts = AtomicUsize::new(0);
        Self::new(move |url| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            let token = &tokens[attempt.min(tokens.len() - 1)];
            Ok(granted(state_param(url).as_deref(), token))
        })
    }

    /// `(authorization_url, redirect_uri)` per call.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl AuthorizationAgent for ScriptedAgent {
    async fn authorize(
        &self,
        authorization_url: &str,
        redirect_uri: &str,
    ) -> Result<AuthorizationResponse, AuthError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((authorization_url.to_string(), redirect_uri.to_string()));
        (self.respond)(authorization_url)
    }
}

/// Wraps a [`ScriptedAgent`] and parks inside `authorize` until released.
pub struct GatedAgent {
    inner: ScriptedAgent,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedAgent {
    pub fn new(inner: ScriptedAgent) -> Self {
        Self {
            inner,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl AuthorizationAgent for GatedAgent {
    async fn authorize(
        &self,
        authorization_url: &str,
        redirect_uri: &str,
    ) -> Result<AuthorizationResponse, AuthError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.authorize(authorization_url, redirect_uri).await
    }
}

pub fn granted(state: Option<&str>, token: &str) -> AuthorizationResponse {
    AuthorizationResponse::success(CallbackParams {
        state: state.map(String::from),
        access_token: Some(token.to_string()),
        ..Default::default()
    })
}

pub fn state_param(authorization_url: &str) -> Option<String> {
    url::Url::parse(authorization_url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
}

pub fn fixed_nonce(nonce: &'static str) -> NonceFn {
    Arc::new(move || nonce.to_string())
}

pub fn config_for(server: &MockServer) -> AuthConfig {
    AuthConfig::new(CLIENT_ID)
        .with_authorization_url(format!("{}/oauth2/authorize", server.uri()))
        .with_revocation_url(format!("{}/oauth2/revoke", server.uri()))
        .with_api_base_url(format!("{}/helix", server.uri()))
}

pub fn nova() -> User {
    User {
        id: "1".to_string(),
        display_name: "nova".to_string(),
        email: "n@x.com".to_string(),
        profile_image_url: "http://i/p.png".to_string(),
    }
}

pub fn nova_profile() -> Value {
    json!({
        "data": [{
            "id": 1,
            "display_name": "nova",
            "email": "n@x.com",
            "profile_image_url": "http://i/p.png"
        }]
    })
}

/// `GET /helix/users` answering `nova` for `token`.
pub async fn mount_profile(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/helix/users"))
        .and(header("client-id", CLIENT_ID))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(nova_profile()))
        .mount(server)
        .await;
}

pub async fn mount_revoke(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/oauth2/revoke"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
