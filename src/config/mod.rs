//! Configuration (layered: code > env > `.env` file).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::auth::error::AuthError;
use crate::auth::request::DEFAULT_SCOPES;

pub const DEFAULT_AUTHORIZATION_URL: &str = "https://id.twitch.tv/oauth2/authorize";
pub const DEFAULT_REVOCATION_URL: &str = "https://id.twitch.tv/oauth2/revoke";
pub const DEFAULT_API_BASE_URL: &str = "https://api.twitch.tv/helix";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/auth/callback";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const REDIRECT_URI_VAR: &str = "AUTH_REDIRECT_URI";
pub const AUTHORIZATION_URL_VAR: &str = "AUTH_AUTHORIZATION_URL";
pub const REVOCATION_URL_VAR: &str = "AUTH_REVOCATION_URL";
pub const API_BASE_URL_VAR: &str = "AUTH_API_BASE_URL";

/// Provider endpoints and client identity for the implicit-grant flow.
///
/// `client_id` is the only required value. It is sent as the `Client-Id`
/// header on every API request and as `client_id` on authorization and
/// revocation.
///
/// # Example
/// ```
/// use streamdata_auth::config::AuthConfig;
///
/// let config = AuthConfig::new("my-client-id")
///     .with_redirect_uri("http://localhost:8080/callback");
/// assert_eq!(config.client_id(), "my-client-id");
/// ```
#[derive(Debug, Clone)]
pub struct AuthConfig {
    client_id: String,
    authorization_url: String,
    revocation_url: String,
    api_base_url: String,
    redirect_uri: String,
    scopes: Vec<String>,
    force_verify: bool,
    request_timeout: Duration,
}

impl AuthConfig {
    /// Config with the default Twitch endpoints.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            authorization_url: DEFAULT_AUTHORIZATION_URL.to_string(),
            revocation_url: DEFAULT_REVOCATION_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            force_verify: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, AuthError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a specific env file without touching the process
    /// environment. Variables already set in the environment win over the
    /// file.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            AuthError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut file_vars = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                AuthError::Configuration(format!("invalid entry in {}: {e}", path.display()))
            })?;
            file_vars.insert(key, value);
        }
        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        })
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let client_id = lookup(CLIENT_ID_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                AuthError::Configuration(format!("{CLIENT_ID_VAR} is not set"))
            })?;

        let mut config = Self::new(client_id);
        if let Some(uri) = lookup(REDIRECT_URI_VAR) {
            config = config.with_redirect_uri(uri);
        }
        if let Some(url) = lookup(AUTHORIZATION_URL_VAR) {
            config = config.with_authorization_url(url);
        }
        if let Some(url) = lookup(REVOCATION_URL_VAR) {
            config = config.with_revocation_url(url);
        }
        if let Some(url) = lookup(API_BASE_URL_VAR) {
            config = config.with_api_base_url(url);
        }
        Ok(config)
    }

    pub fn with_authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = url.into();
        self
    }

    pub fn with_revocation_url(mut self, url: impl Into<String>) -> Self {
        self.revocation_url = url.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = uri.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn authorization_url(&self) -> &str {
        &self.authorization_url
    }

    pub fn revocation_url(&self) -> &str {
        &self.revocation_url
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn force_verify(&self) -> bool {
        self.force_verify
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn new_uses_twitch_defaults() {
        let config = AuthConfig::new("abc");
        assert_eq!(config.authorization_url(), DEFAULT_AUTHORIZATION_URL);
        assert_eq!(config.revocation_url(), DEFAULT_REVOCATION_URL);
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(
            config.scopes(),
            ["openid", "user:read:email", "user:read:follows"]
        );
        assert!(config.force_verify());
    }

    #[test]
    fn from_lookup_requires_client_id() {
        let result = AuthConfig::from_lookup(lookup_from(&[]));
        assert!(
            matches!(result, Err(AuthError::Configuration(message)) if message.contains("CLIENT_ID"))
        );
    }

    #[test]
    fn from_lookup_rejects_blank_client_id() {
        let result = AuthConfig::from_lookup(lookup_from(&[("CLIENT_ID", "   ")]));
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn from_lookup_applies_overrides() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("CLIENT_ID", " client-1 "),
            ("AUTH_REDIRECT_URI", "myapp://redirect"),
            ("AUTH_API_BASE_URL", "http://localhost:9000/helix/"),
            ("AUTH_REVOCATION_URL", "http://localhost:9000/revoke"),
        ]))
        .unwrap();
        assert_eq!(config.client_id(), "client-1");
        assert_eq!(config.redirect_uri(), "myapp://redirect");
        assert_eq!(config.api_base_url(), "http://localhost:9000/helix");
        assert_eq!(config.revocation_url(), "http://localhost:9000/revoke");
        assert_eq!(config.authorization_url(), DEFAULT_AUTHORIZATION_URL);
    }

    #[test]
    fn debug_lists_client_id_and_endpoints() {
        let rendered = format!("{:?}", AuthConfig::new("client-1"));
        assert!(rendered.contains("client-1"));
        assert!(rendered.contains(DEFAULT_REVOCATION_URL));
        assert!(rendered.contains("request_timeout"));
    }
}
