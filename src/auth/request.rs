use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::config::AuthConfig;

/// Scopes requested on every sign-in.
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "user:read:email", "user:read:follows"];

/// Implicit grant: the token comes back directly on the redirect.
pub const RESPONSE_TYPE: &str = "token";

const NONCE_BYTES: usize = 24;

/// Produces a fresh state nonce for each authorization attempt.
pub type NonceFn = Arc<dyn Fn() -> String + Send + Sync>;

/// A single authorization attempt.
///
/// Carries the state nonce that the callback must echo back. Built once per
/// sign-in and dropped when the attempt resolves.
///
/// # Example
/// ```
/// use streamdata_auth::auth::AuthorizationRequest;
/// use streamdata_auth::config::AuthConfig;
///
/// let request = AuthorizationRequest::new(&AuthConfig::new("client"));
/// assert!(request.authorization_url().contains("response_type=token"));
/// assert!(request.state_nonce().len() >= 30);
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    state_nonce: String,
    client_id: String,
    authorization_endpoint: String,
    redirect_uri: String,
    scopes: Vec<String>,
    force_verify: bool,
}

impl AuthorizationRequest {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_nonce(config, generate_nonce())
    }

    pub fn with_nonce(config: &AuthConfig, state_nonce: impl Into<String>) -> Self {
        Self {
            state_nonce: state_nonce.into(),
            client_id: config.client_id().to_string(),
            authorization_endpoint: config.authorization_url().to_string(),
            redirect_uri: config.redirect_uri().to_string(),
            scopes: config.scopes().to_vec(),
            force_verify: config.force_verify(),
        }
    }

    pub fn state_nonce(&self) -> &str {
        &self.state_nonce
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn response_type(&self) -> &'static str {
        RESPONSE_TYPE
    }

    /// Space-separated scope list, before encoding.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    pub fn force_verify(&self) -> bool {
        self.force_verify
    }

    /// Full URL to open in the authorization agent.
    pub fn authorization_url(&self) -> String {
        let scope = self.scope();
        let force_verify = if self.force_verify { "true" } else { "false" };
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", RESPONSE_TYPE),
            ("scope", scope.as_str()),
            ("force_verify", force_verify),
            ("state", self.state_nonce.as_str()),
        ];
        build_url_with_params(&self.authorization_endpoint, &params)
    }
}

/// 24 bytes taken from two UUID v4 values, URL-safe base64 (32 chars).
///
/// The UUID version/variant bits leave 182 of the 192 bits random.
pub fn generate_nonce() -> String {
    let mut buf = [0u8; NONCE_BYTES];
    for chunk in buf.chunks_mut(16) {
        let id = uuid::Uuid::new_v4();
        let len = chunk.len();
        chunk.copy_from_slice(&id.as_bytes()[..len]);
    }
    URL_SAFE_NO_PAD.encode(buf)
}

fn build_url_with_params(base: &str, params: &[(&str, &str)]) -> String {
    let mut url = base.to_string();
    url.push(if base.contains('?') { '&' } else { '?' });
    for (i, (key, value)) in params.iter().enumerate() {
        if i > 0 {
            url.push('&');
        }
        url.push_str(&percent_encode(key));
        url.push('=');
        url.push_str(&percent_encode(value));
    }
    url
}

// RFC 3986 unreserved set; spaces become %20, not '+'.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}
