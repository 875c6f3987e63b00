//! Kakao OAuth2 endpoints: authorization URL, token exchange, user profile.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{error::AuthError, provider::truncate_body};

pub const AUTHORIZE_URL: &str = "https://kauth.kakao.com/oauth/authorize";
pub const TOKEN_URL: &str = "https://kauth.kakao.com/oauth/token";
pub const PROFILE_URL: &str = "https://kapi.kakao.com/v2/user/me";
pub const DEFAULT_REDIRECT_URI: &str = "myapp://kakao-auth";

const NICKNAME_SCOPE: &str = "profile_nickname";

#[derive(Debug, Clone)]
pub struct KakaoAuthConfig {
    /// REST API key of the Kakao application.
    pub client_id: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub profile_url: String,
}

impl KakaoAuthConfig {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            profile_url: PROFILE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<i64>,
    pub nickname: String,
}

#[derive(Debug, Deserialize)]
struct KakaoUser {
    id: Option<i64>,
    properties: Option<KakaoProperties>,
    kakao_account: Option<KakaoAccount>,
}

#[derive(Debug, Deserialize)]
struct KakaoProperties {
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccount {
    profile: Option<KakaoProperties>,
}

impl KakaoUser {
    fn into_profile(self) -> Option<UserProfile> {
        let nickname = self
            .properties
            .and_then(|p| p.nickname)
            .or_else(|| self.kakao_account.and_then(|a| a.profile).and_then(|p| p.nickname))?;

        Some(UserProfile {
            id: self.id,
            nickname,
        })
    }
}

pub struct KakaoAuthClient {
    config: KakaoAuthConfig,
    http: Client,
}

impl std::fmt::Debug for KakaoAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KakaoAuthClient")
            .field("redirect_uri", &self.config.redirect_uri)
            .finish_non_exhaustive()
    }
}

impl KakaoAuthClient {
    pub fn new(config: KakaoAuthConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &KakaoAuthConfig {
        &self.config
    }

    /// URL of the consent page the browser is sent to.
    pub fn authorization_url(&self) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", NICKNAME_SCOPE),
            ],
        )
        .map_err(|e| AuthError::Config(format!("invalid authorization endpoint: {e}")))
    }

    #[tracing::instrument(skip(self, code), level = "info")]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::TokenExchange(format!(
                "{}: {}",
                status,
                truncate_body(&body)
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| AuthError::TokenExchange(format!("failed to parse token response: {e}")))
    }

    #[tracing::instrument(skip(self, access_token), level = "info")]
    pub async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let response = self
            .http
            .get(&self.config.profile_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::ProfileFetch(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::ProfileFetch(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::ProfileFetch(format!(
                "{}: {}",
                status,
                truncate_body(&body)
            )));
        }

        let user: KakaoUser = serde_json::from_str(&body)
            .map_err(|e| AuthError::ProfileFetch(format!("failed to parse profile: {e}")))?;

        user.into_profile()
            .ok_or_else(|| AuthError::ProfileFetch("profile has no nickname".into()))
    }
}
