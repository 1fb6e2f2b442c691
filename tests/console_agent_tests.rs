mod support;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use streamdata_auth::auth::{AuthError, ConsoleAgent};
use streamdata_auth::session::{SessionManager, SignInOutcome};
use wiremock::MockServer;

use support::{config_for, fixed_nonce, mount_profile, nova};

fn console_manager(server: &MockServer, pasted: &'static str) -> SessionManager {
    let agent = ConsoleAgent::new(pasted.as_bytes(), Vec::new());
    SessionManager::new(config_for(server), Arc::new(agent))
        .expect("manager")
        .with_nonce_fn(fixed_nonce("abc123"))
}

#[tokio::test]
async fn pasted_redirect_completes_sign_in() {
    let server = MockServer::start().await;
    mount_profile(&server, "tok1").await;
    let manager = console_manager(
        &server,
        "http://localhost:3000/auth/callback#access_token=tok1&scope=openid&state=abc123&token_type=bearer\n",
    );

    let outcome = manager.sign_in().await.expect("sign in");

    assert_eq!(outcome, SignInOutcome::Authenticated(nova()));
    assert_eq!(manager.api().bearer_token().as_deref(), Some("tok1"));
}

#[tokio::test]
async fn pasted_redirect_with_foreign_state_is_rejected() {
    let server = MockServer::start().await;
    mount_profile(&server, "tok1").await;
    let manager = console_manager(
        &server,
        "http://localhost:3000/auth/callback#access_token=tok1&state=xyz999\n",
    );

    let err = manager.sign_in().await.expect_err("mismatch");

    assert!(matches!(err, AuthError::StateMismatch));
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn pasted_access_denied_is_declined() {
    let server = MockServer::start().await;
    let manager = console_manager(
        &server,
        "http://localhost:3000/auth/callback?error=access_denied&error_description=The+user+denied+you+access&state=abc123\n",
    );

    assert_eq!(manager.sign_in().await.unwrap(), SignInOutcome::Declined);
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn blank_line_is_declined() {
    let server = MockServer::start().await;
    let manager = console_manager(&server, "\n");

    assert_eq!(manager.sign_in().await.unwrap(), SignInOutcome::Declined);
}

#[tokio::test]
async fn garbage_input_is_invalid_response() {
    let server = MockServer::start().await;
    let manager = console_manager(&server, "not a url\n");

    let err = manager.sign_in().await.expect_err("unparseable");

    assert!(matches!(err, AuthError::InvalidResponse(_)));
}

#[tokio::test]
async fn prompt_shows_authorization_url() {
    let agent = ConsoleAgent::new(&b"\n"[..], Vec::new());
    let manager_server = MockServer::start().await;
    let config = config_for(&manager_server);
    let request = streamdata_auth::auth::AuthorizationRequest::with_nonce(&config, "abc123");

    streamdata_auth::auth::AuthorizationAgent::authorize(
        &agent,
        &request.authorization_url(),
        request.redirect_uri(),
    )
    .await
    .expect("authorize");

    let (_, output) = agent.into_parts();
    let printed = String::from_utf8(output).expect("utf8");
    assert!(printed.contains(&request.authorization_url()));
    assert!(printed.contains("state=abc123"));
}
