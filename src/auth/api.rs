//! Shared provider API client with default identity headers.

use std::sync::RwLock;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::error::AuthError;
use super::user::{ProfileResponse, User};
use crate::config::AuthConfig;

/// Header names are case-insensitive; `Client-Id` on the wire.
pub const CLIENT_ID_HEADER: &str = "client-id";

/// HTTP client shared by every consumer of the session.
///
/// Every request carries `Client-Id`. Once a sign-in installs a bearer
/// credential, requests also carry `Authorization: Bearer <token>` until
/// sign-out removes it.
pub struct ApiClient {
    client: reqwest::Client,
    client_id: String,
    base_url: String,
    revocation_url: String,
    bearer: RwLock<Option<String>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("client_id", &self.client_id)
            .field("base_url", &self.base_url)
            .field("revocation_url", &self.revocation_url)
            .field("has_bearer", &self.has_bearer())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let mut headers = HeaderMap::new();
        let client_id = HeaderValue::from_str(config.client_id()).map_err(|_| {
            AuthError::Configuration("client id is not a valid header value".to_string())
        })?;
        headers.insert(HeaderName::from_static(CLIENT_ID_HEADER), client_id);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AuthError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            client_id: config.client_id().to_string(),
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            revocation_url: config.revocation_url().to_string(),
            bearer: RwLock::new(None),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install `token` as the default bearer credential.
    pub fn set_bearer(&self, token: &str) -> Option<String> {
        let mut guard = self
            .bearer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.replace(token.to_string())
    }

    /// Remove the default bearer credential.
    pub fn clear_bearer(&self) -> Option<String> {
        self.bearer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    pub(crate) fn restore_bearer(&self, previous: Option<String>) {
        *self
            .bearer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = previous;
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn has_bearer(&self) -> bool {
        self.bearer
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or_else(|poisoned| poisoned.into_inner().is_some())
    }

    /// `GET {base_url}{path}` with the default headers, decoded as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AuthError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = self.bearer_token() {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body));
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch the identity behind the installed credential (`data[0]`).
    pub async fn fetch_profile(&self) -> Result<User, AuthError> {
        let payload: ProfileResponse = self.get_json("users").await?;
        payload
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::InvalidResponse("profile response has no users".to_string()))
    }

    /// Ask the provider to invalidate `token`. Single attempt.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let resp = self
            .client
            .post(&self.revocation_url)
            .form(&[("client_id", self.client_id.as_str()), ("token", token)])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body));
        }
        Ok(())
    }
}

fn status_to_error(status: StatusCode, body: &str) -> AuthError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string());
    AuthError::Api {
        status: status.as_u16(),
        message,
    }
}
