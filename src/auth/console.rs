use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use super::agent::{AuthorizationAgent, AuthorizationResponse};
use super::error::AuthError;

/// Terminal-driven authorization agent.
///
/// Prints the authorization URL, then reads back the URL the browser was
/// redirected to. An empty line or end of input counts as a cancellation.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use streamdata_auth::auth::ConsoleAgent;
/// use streamdata_auth::config::AuthConfig;
/// use streamdata_auth::session::SessionManager;
///
/// # fn example() -> Result<(), streamdata_auth::auth::AuthError> {
/// let manager = SessionManager::new(
///     AuthConfig::from_env()?,
///     Arc::new(ConsoleAgent::stdio()),
/// )?;
/// # Ok(())
/// # }
/// ```
pub struct ConsoleAgent<R, W> {
    input: Mutex<BufReader<R>>,
    output: Mutex<W>,
}

impl ConsoleAgent<tokio::io::Stdin, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> ConsoleAgent<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(BufReader::new(input)),
            output: Mutex::new(output),
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input.into_inner().into_inner(), self.output.into_inner())
    }
}

#[async_trait]
impl<R, W> AuthorizationAgent for ConsoleAgent<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn authorize(
        &self,
        authorization_url: &str,
        redirect_uri: &str,
    ) -> Result<AuthorizationResponse, AuthError> {
        {
            let mut output = self.output.lock().await;
            let prompt = format!(
                "Open this URL in your browser to sign in:\n  {authorization_url}\n\
                 Paste the address you were redirected to ({redirect_uri}...), \
                 or press Enter to cancel:\n> "
            );
            output.write_all(prompt.as_bytes()).await?;
            output.flush().await?;
        }

        let mut line = String::new();
        self.input.lock().await.read_line(&mut line).await?;
        let pasted = line.trim();
        if pasted.is_empty() {
            tracing::debug!("no redirect pasted; treating as cancelled");
            return Ok(AuthorizationResponse::cancelled());
        }
        if !pasted.starts_with(redirect_uri) {
            tracing::warn!(
                expected_prefix = %redirect_uri,
                "pasted address does not start with the redirect URI"
            );
        }
        AuthorizationResponse::from_redirect_url(pasted)
    }
}
