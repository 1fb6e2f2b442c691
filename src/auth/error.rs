use thiserror::Error;

/// Errors raised by configuration, sign-in and the API client.
///
/// Declined consent (the user cancels, or the provider answers
/// `access_denied`) is not an error; see
/// [`SignInOutcome::Declined`](crate::session::SignInOutcome::Declined).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("OAuth state mismatch: callback state does not match the issued nonce")]
    StateMismatch,
    #[error("A sign-in attempt is already in progress")]
    SignInInProgress,
    #[error("Authorization agent failed: {0}")]
    Agent(String),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl AuthError {
    /// Whether presenting a "try again" option to the user makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Agent(_) | Self::SignInInProgress => true,
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return Self::InvalidResponse(error.to_string());
        }
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidResponse(error.to_string())
    }
}

impl From<url::ParseError> for AuthError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidResponse(format!("malformed redirect URL: {error}"))
    }
}
