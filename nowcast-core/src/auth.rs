//! Kakao login: authorization code grant followed by a profile lookup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::AuthError;

pub mod kakao;
pub mod session;

pub use kakao::{KakaoAuthClient, KakaoAuthConfig, TokenResponse, UserProfile};
pub use session::{AuthSessionGate, SessionGuard};

/// Where the browser sent the user back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRedirect {
    Success { code: String },
    Denied { error: String, description: Option<String> },
    Cancelled,
}

impl AuthRedirect {
    /// Reads `code` / `error` from the query of a redirect URL.
    pub fn from_redirect_url(redirect: &str) -> Self {
        let Ok(url) = Url::parse(redirect.trim()) else {
            return Self::Cancelled;
        };

        let mut code = None;
        let mut error = None;
        let mut description = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" if !value.is_empty() => code = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                "error_description" => description = Some(value.into_owned()),
                _ => {}
            }
        }

        match (code, error) {
            (_, Some(error)) => Self::Denied { error, description },
            (Some(code), None) => Self::Success { code },
            (None, None) => Self::Cancelled,
        }
    }
}

/// Opens the consent page and waits for the redirect.
#[async_trait]
pub trait AuthBrowser: Send + Sync {
    async fn authorize(&self, url: &Url) -> Result<AuthRedirect, AuthError>;
}

/// Receives the signal to leave the login screen.
pub trait Navigator: Send + Sync {
    fn enter_authenticated_area(&self);

    fn notify(&self, title: &str, message: &str);
}

/// When the flow hands control to the authenticated area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPolicy {
    /// As soon as an authorization code arrives, before token exchange.
    Optimistic,
    /// Only once the profile has been fetched.
    #[default]
    AfterProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    AuthorizationRequested,
    AuthorizationSucceeded,
    AuthorizationFailed,
    TokenExchanged,
    ExchangeFailed,
    ProfileFetched,
    ProfileFetchFailed,
}

impl LoginState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationFailed
                | Self::ExchangeFailed
                | Self::ProfileFetched
                | Self::ProfileFetchFailed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub state: LoginState,
    pub profile: Option<UserProfile>,
    pub navigated: bool,
}

pub struct LoginFlow<'g> {
    client: KakaoAuthClient,
    gate: &'g AuthSessionGate,
    policy: NavigationPolicy,
    state: LoginState,
}

impl<'g> LoginFlow<'g> {
    pub fn new(client: KakaoAuthClient, gate: &'g AuthSessionGate) -> Self {
        Self {
            client,
            gate,
            policy: NavigationPolicy::default(),
            state: LoginState::Idle,
        }
    }

    pub fn with_policy(mut self, policy: NavigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    fn advance(&mut self, next: LoginState) {
        debug!(from = ?self.state, to = ?next, "Login state change");
        self.state = next;
    }

    fn finish(&self, profile: Option<UserProfile>, navigated: bool) -> LoginOutcome {
        LoginOutcome {
            state: self.state,
            profile,
            navigated,
        }
    }

    fn enter(&self, navigator: &(impl Navigator + ?Sized)) {
        navigator.enter_authenticated_area();
        navigator.notify("Login succeeded", "Welcome! 😊");
    }

    /// Runs the whole login. Stage failures end the flow in the matching
    /// terminal state; only a busy browser session or a broken endpoint
    /// configuration is returned as an error.
    pub async fn run(
        &mut self,
        browser: &(impl AuthBrowser + ?Sized),
        navigator: &(impl Navigator + ?Sized),
    ) -> Result<LoginOutcome, AuthError> {
        let url = self.client.authorization_url()?;

        let gate = self.gate;
        let redirect = {
            let Some(_session) = gate.acquire() else {
                warn!("Login requested while another browser session is open");
                return Err(AuthError::SessionBusy);
            };

            self.advance(LoginState::AuthorizationRequested);
            browser.authorize(&url).await
        };

        let code = match redirect {
            Ok(AuthRedirect::Success { code }) => code,
            Ok(AuthRedirect::Denied { error, description }) => {
                let denied = AuthError::AuthorizationDenied(match description {
                    Some(description) => format!("{error} ({description})"),
                    None => error,
                });
                warn!("{}", denied);
                self.advance(LoginState::AuthorizationFailed);
                return Ok(self.finish(None, false));
            }
            Ok(AuthRedirect::Cancelled) => {
                info!("Authorization cancelled");
                self.advance(LoginState::AuthorizationFailed);
                return Ok(self.finish(None, false));
            }
            Err(e) => {
                error!("Browser session failed: {}", e);
                self.advance(LoginState::AuthorizationFailed);
                return Ok(self.finish(None, false));
            }
        };
        self.advance(LoginState::AuthorizationSucceeded);

        let mut navigated = false;
        if self.policy == NavigationPolicy::Optimistic {
            self.enter(navigator);
            navigated = true;
        }

        let token = match self.client.exchange_code(&code).await {
            Ok(token) => token,
            Err(e) => {
                error!("{}", e);
                self.advance(LoginState::ExchangeFailed);
                return Ok(self.finish(None, navigated));
            }
        };
        self.advance(LoginState::TokenExchanged);

        let profile = match self.client.fetch_profile(&token.access_token).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("{}", e);
                self.advance(LoginState::ProfileFetchFailed);
                return Ok(self.finish(None, navigated));
            }
        };
        self.advance(LoginState::ProfileFetched);
        info!(nickname = %profile.nickname, "Kakao login completed");

        if !navigated {
            self.enter(navigator);
            navigated = true;
        }

        Ok(self.finish(Some(profile), navigated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_with_code_is_success() {
        let redirect = AuthRedirect::from_redirect_url("myapp://kakao-auth?code=abc123");
        assert_eq!(redirect, AuthRedirect::Success { code: "abc123".into() });
    }

    #[test]
    fn redirect_with_error_is_denied() {
        let redirect = AuthRedirect::from_redirect_url(
            "myapp://kakao-auth?error=access_denied&error_description=User%20denied%20access",
        );
        assert_eq!(
            redirect,
            AuthRedirect::Denied {
                error: "access_denied".into(),
                description: Some("User denied access".into()),
            }
        );
    }

    #[test]
    fn error_wins_over_code() {
        let redirect = AuthRedirect::from_redirect_url("myapp://kakao-auth?code=abc&error=server_error");
        assert!(matches!(redirect, AuthRedirect::Denied { .. }));
    }

    #[test]
    fn redirect_without_result_is_cancelled() {
        assert_eq!(AuthRedirect::from_redirect_url("myapp://kakao-auth"), AuthRedirect::Cancelled);
        assert_eq!(AuthRedirect::from_redirect_url("myapp://kakao-auth?code="), AuthRedirect::Cancelled);
        assert_eq!(AuthRedirect::from_redirect_url(""), AuthRedirect::Cancelled);
    }

    #[test]
    fn terminal_states() {
        assert!(LoginState::ProfileFetched.is_terminal());
        assert!(LoginState::ExchangeFailed.is_terminal());
        assert!(!LoginState::AuthorizationSucceeded.is_terminal());
        assert!(!LoginState::Idle.is_terminal());
    }

    #[test]
    fn policy_reads_snake_case() {
        let policy: NavigationPolicy = serde_json::from_str("\"after_profile\"").expect("valid policy");
        assert_eq!(policy, NavigationPolicy::AfterProfile);
        assert_eq!(NavigationPolicy::default(), NavigationPolicy::AfterProfile);
    }
}
