use crate::{BrowserSession, Result};
use std::time::Duration;

const LOGIN_URL: &str = "https://x.com/i/flow/login";
const USERNAME_SELECTOR: &str = r#"input[name="text"]"#;
const PASSWORD_SELECTOR: &str = r#"input[name="password"]"#;

const FIELD_ATTEMPTS: usize = 3;
const USERNAME_FIELD_WAIT: Duration = Duration::from_secs(30);
const PASSWORD_FIELD_WAIT: Duration = Duration::from_secs(20);
const LOGIN_SETTLE: Duration = Duration::from_secs(5);
const PASSWORD_SETTLE: Duration = Duration::from_secs(7);

/// Account credentials, supplied via environment configuration.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The step at which automated login gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    Username,
    Password,
    Verification,
}

impl std::fmt::Display for LoginStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginStage::Username => write!(f, "username entry"),
            LoginStage::Password => write!(f, "password entry"),
            LoginStage::Verification => write!(f, "login verification"),
        }
    }
}

/// Outcome of an automated login attempt.
///
/// `OperatorNeeded` is an explicit suspend state: the caller owns the
/// terminal and decides how to wait for the operator before calling
/// [`verify`] again. The library itself never blocks on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    Authenticated,
    OperatorNeeded(LoginStage),
}

/// Run the automated login flow: username, then password when the site
/// still asks for one, then destination verification.
///
/// Each field gets a bounded wait and a fixed number of attempts; running
/// out of attempts degrades to `OperatorNeeded` rather than failing.
pub async fn login(session: &BrowserSession, credentials: &Credentials) -> Result<LoginStatus> {
    session.goto(LOGIN_URL).await?;
    tokio::time::sleep(LOGIN_SETTLE).await;

    tracing::info!("entering username");
    if !submit_field(
        session,
        USERNAME_SELECTOR,
        &credentials.username,
        USERNAME_FIELD_WAIT,
        LOGIN_SETTLE,
    )
    .await?
    {
        return Ok(LoginStatus::OperatorNeeded(LoginStage::Username));
    }

    let url = session.current_url().await?;
    if needs_password(&url) {
        tracing::info!("entering password");
        if !submit_field(
            session,
            PASSWORD_SELECTOR,
            &credentials.password,
            PASSWORD_FIELD_WAIT,
            PASSWORD_SETTLE,
        )
        .await?
        {
            return Ok(LoginStatus::OperatorNeeded(LoginStage::Password));
        }
    }

    verify(session).await
}

/// Check whether the session ended up on an authenticated destination.
///
/// Also the re-entry point after a manual operator step.
pub async fn verify(session: &BrowserSession) -> Result<LoginStatus> {
    let url = session.current_url().await?;
    if destination_is_authenticated(&url) {
        tracing::info!("login verified at {url}");
        Ok(LoginStatus::Authenticated)
    } else {
        tracing::warn!("login not verified, current url: {url}");
        Ok(LoginStatus::OperatorNeeded(LoginStage::Verification))
    }
}

async fn submit_field(
    session: &BrowserSession,
    selector: &str,
    value: &str,
    field_wait: Duration,
    settle: Duration,
) -> Result<bool> {
    for attempt in 1..=FIELD_ATTEMPTS {
        match session.wait_for_element(selector, field_wait).await? {
            Some(element) => {
                session.submit_text(&element, value).await?;
                tokio::time::sleep(settle).await;
                return Ok(true);
            }
            None => {
                tracing::warn!(
                    "attempt {attempt}/{FIELD_ATTEMPTS}: {selector} did not appear, retrying"
                );
            }
        }
    }
    Ok(false)
}

/// The site still shows a login or challenge flow, so a password (or
/// further verification) is expected next.
fn needs_password(url: &str) -> bool {
    url.contains("login") || url.contains("challenge")
}

/// Logged-in sessions land on the home timeline or a search view.
fn destination_is_authenticated(url: &str) -> bool {
    url.contains("/home") || url.contains("/search")
}
