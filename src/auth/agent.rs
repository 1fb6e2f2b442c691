use async_trait::async_trait;
use serde::Deserialize;

use super::error::AuthError;

/// Provider error code for a user who declined consent.
pub const ACCESS_DENIED: &str = "access_denied";

/// How the authorization agent finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AuthorizationOutcome {
    /// The browser reached the redirect target.
    Success,
    /// The user closed the browser or otherwise backed out.
    Cancelled,
    /// The agent or provider reported a failure.
    Error,
}

/// Parameters delivered on the redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub access_token: Option<String>,
}

impl CallbackParams {
    /// Parse the parameters of a redirect URL.
    ///
    /// The implicit grant returns values in the fragment; errors often come
    /// back in the query. Both are read, fragment values win.
    pub fn from_redirect_url(redirect_url: &str) -> Result<Self, AuthError> {
        let parsed = url::Url::parse(redirect_url.trim())?;
        let mut params = Self::default();
        for (key, value) in parsed.query_pairs() {
            params.assign(&key, value.into_owned());
        }
        if let Some(fragment) = parsed.fragment() {
            for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
                params.assign(&key, value.into_owned());
            }
        }
        Ok(params)
    }

    pub fn is_access_denied(&self) -> bool {
        self.error.as_deref() == Some(ACCESS_DENIED)
    }

    fn assign(&mut self, key: &str, value: String) {
        match key {
            "state" => self.state = Some(value),
            "error" => self.error = Some(value),
            "error_description" => self.error_description = Some(value),
            "access_token" => self.access_token = Some(value),
            _ => {}
        }
    }
}

/// Result handed back by an [`AuthorizationAgent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub outcome: AuthorizationOutcome,
    pub params: CallbackParams,
}

impl AuthorizationResponse {
    pub fn success(params: CallbackParams) -> Self {
        Self {
            outcome: AuthorizationOutcome::Success,
            params,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            outcome: AuthorizationOutcome::Cancelled,
            params: CallbackParams::default(),
        }
    }

    pub fn error(params: CallbackParams) -> Self {
        Self {
            outcome: AuthorizationOutcome::Error,
            params,
        }
    }

    /// Classify a redirect URL the browser landed on.
    ///
    /// `access_denied` stays a `Success` envelope, matching what providers
    /// send; any other `error` value makes it an `Error`.
    pub fn from_redirect_url(redirect_url: &str) -> Result<Self, AuthError> {
        let params = CallbackParams::from_redirect_url(redirect_url)?;
        if params.error.is_some() && !params.is_access_denied() {
            return Ok(Self::error(params));
        }
        Ok(Self::success(params))
    }
}

/// External agent that shows the authorization page to the user.
///
/// Implementations open `authorization_url`, wait for the browser to reach
/// `redirect_uri` and return its parameters, or report cancellation. There is
/// no timeout on this wait; it lasts as long as the user takes.
#[async_trait]
pub trait AuthorizationAgent: Send + Sync {
    async fn authorize(
        &self,
        authorization_url: &str,
        redirect_uri: &str,
    ) -> Result<AuthorizationResponse, AuthError>;
}
