//! Integration tests for the Kakao login flow using wiremock.

use async_trait::async_trait;
use nowcast_core::{
    AuthError, AuthRedirect, LoginFlow, LoginState, NavigationPolicy,
    auth::{AuthBrowser, AuthSessionGate, KakaoAuthClient, KakaoAuthConfig, Navigator},
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REDIRECT_URI: &str = "myapp://kakao-auth";

/// Browser that answers with a canned redirect.
struct ScriptedBrowser {
    redirect: String,
    opened: AtomicUsize,
    last_url: Mutex<Option<Url>>,
}

impl ScriptedBrowser {
    fn returning(redirect: &str) -> Self {
        Self {
            redirect: redirect.to_string(),
            opened: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        }
    }

    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthBrowser for ScriptedBrowser {
    async fn authorize(&self, url: &Url) -> Result<AuthRedirect, AuthError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.clone());
        Ok(AuthRedirect::from_redirect_url(&self.redirect))
    }
}

struct BrokenBrowser;

#[async_trait]
impl AuthBrowser for BrokenBrowser {
    async fn authorize(&self, _url: &Url) -> Result<AuthRedirect, AuthError> {
        Err(AuthError::Browser("no browser available".into()))
    }
}

#[derive(Default)]
struct RecordingNavigator {
    events: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn enter_authenticated_area(&self) {
        self.events.lock().unwrap().push("navigate".into());
    }

    fn notify(&self, title: &str, _message: &str) {
        self.events.lock().unwrap().push(format!("notify:{title}"));
    }
}

fn client_for(server: &MockServer) -> KakaoAuthClient {
    let mut config = KakaoAuthConfig::new("rest-key", REDIRECT_URI);
    config.token_url = format!("{}/oauth/token", server.uri());
    config.profile_url = format!("{}/v2/user/me", server.uri());
    KakaoAuthClient::new(config)
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("client_id=rest-key"))
        .and(body_string_contains("redirect_uri=myapp%3A%2F%2Fkakao-auth"))
        .and(body_string_contains("code=auth-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "access-123",
            "token_type": "bearer",
            "refresh_token": "refresh-456",
            "expires_in": 21599,
            "scope": "profile_nickname",
            "refresh_token_expires_in": 5183999
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/user/me"))
        .and(header("Authorization", "Bearer access-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1234567890,
            "connected_at": "2024-10-17T05:00:00Z",
            "properties": { "nickname": "weatherfan" }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_login_navigates_after_profile() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_profile(&server).await;

    let gate = AuthSessionGate::new();
    let browser = ScriptedBrowser::returning("myapp://kakao-auth?code=auth-code");
    let navigator = RecordingNavigator::default();
    let mut flow = LoginFlow::new(client_for(&server), &gate);

    let outcome = flow.run(&browser, &navigator).await.unwrap();

    assert_eq!(outcome.state, LoginState::ProfileFetched);
    assert_eq!(flow.state(), LoginState::ProfileFetched);
    assert_eq!(outcome.profile.map(|p| p.nickname).as_deref(), Some("weatherfan"));
    assert!(outcome.navigated);
    assert_eq!(navigator.events(), vec!["navigate", "notify:Login succeeded"]);
    assert!(gate.is_armed());

    let opened = browser.last_url.lock().unwrap().clone().unwrap();
    assert!(opened.query_pairs().any(|(k, v)| k == "scope" && v == "profile_nickname"));
    assert!(opened.query_pairs().any(|(k, v)| k == "redirect_uri" && v == REDIRECT_URI));
}

#[tokio::test]
async fn test_denied_authorization_never_exchanges_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gate = AuthSessionGate::new();
    let browser = ScriptedBrowser::returning(
        "myapp://kakao-auth?error=access_denied&error_description=User%20denied%20access",
    );
    let navigator = RecordingNavigator::default();
    let mut flow = LoginFlow::new(client_for(&server), &gate).with_policy(NavigationPolicy::Optimistic);

    let outcome = flow.run(&browser, &navigator).await.unwrap();

    assert_eq!(outcome.state, LoginState::AuthorizationFailed);
    assert!(!outcome.navigated);
    assert!(navigator.events().is_empty());
}

#[tokio::test]
async fn test_cancelled_browser_session_fails_authorization() {
    let server = MockServer::start().await;

    let gate = AuthSessionGate::new();
    let navigator = RecordingNavigator::default();

    let mut flow = LoginFlow::new(client_for(&server), &gate);
    let outcome = flow
        .run(&ScriptedBrowser::returning(REDIRECT_URI), &navigator)
        .await
        .unwrap();
    assert_eq!(outcome.state, LoginState::AuthorizationFailed);

    let mut flow = LoginFlow::new(client_for(&server), &gate);
    let outcome = flow.run(&BrokenBrowser, &navigator).await.unwrap();
    assert_eq!(outcome.state, LoginState::AuthorizationFailed);

    assert!(navigator.events().is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_failure_still_navigates_when_optimistic() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/user/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "msg": "this access token does not exist",
            "code": -401
        })))
        .mount(&server)
        .await;

    let gate = AuthSessionGate::new();
    let browser = ScriptedBrowser::returning("myapp://kakao-auth?code=auth-code");
    let navigator = RecordingNavigator::default();
    let mut flow = LoginFlow::new(client_for(&server), &gate).with_policy(NavigationPolicy::Optimistic);

    let outcome = flow.run(&browser, &navigator).await.unwrap();

    assert_eq!(outcome.state, LoginState::ProfileFetchFailed);
    assert!(outcome.profile.is_none());
    assert!(outcome.navigated);
    assert_eq!(navigator.events(), vec!["navigate", "notify:Login succeeded"]);
}

#[tokio::test]
async fn test_profile_failure_does_not_navigate_after_profile_policy() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/user/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gate = AuthSessionGate::new();
    let browser = ScriptedBrowser::returning("myapp://kakao-auth?code=auth-code");
    let navigator = RecordingNavigator::default();
    let mut flow = LoginFlow::new(client_for(&server), &gate);

    let outcome = flow.run(&browser, &navigator).await.unwrap();

    assert_eq!(outcome.state, LoginState::ProfileFetchFailed);
    assert!(!outcome.navigated);
    assert!(navigator.events().is_empty());
}

#[tokio::test]
async fn test_token_exchange_failure_stops_before_profile() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "authorization code not found for code=auth-code",
            "error_code": "KOE320"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/user/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gate = AuthSessionGate::new();
    let browser = ScriptedBrowser::returning("myapp://kakao-auth?code=auth-code");
    let navigator = RecordingNavigator::default();
    let mut flow = LoginFlow::new(client_for(&server), &gate).with_policy(NavigationPolicy::Optimistic);

    let outcome = flow.run(&browser, &navigator).await.unwrap();

    assert_eq!(outcome.state, LoginState::ExchangeFailed);
    // Optimistic navigation already happened on the authorization code.
    assert!(outcome.navigated);
}

#[tokio::test]
async fn test_busy_session_does_not_open_browser() {
    let server = MockServer::start().await;

    let gate = AuthSessionGate::new();
    let _open_session = gate.acquire().unwrap();

    let browser = ScriptedBrowser::returning("myapp://kakao-auth?code=auth-code");
    let navigator = RecordingNavigator::default();
    let mut flow = LoginFlow::new(client_for(&server), &gate);

    let err = flow.run(&browser, &navigator).await.unwrap_err();

    assert!(matches!(err, AuthError::SessionBusy));
    assert_eq!(browser.opened(), 0);
    assert_eq!(flow.state(), LoginState::Idle);
}

#[tokio::test]
async fn test_exchange_code_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = client_for(&server).exchange_code("auth-code").await.unwrap_err();
    assert!(matches!(err, AuthError::TokenExchange(_)));
    assert!(err.to_string().contains("401"), "Error should mention 401 status: {}", err);
}

#[tokio::test]
async fn test_profile_without_nickname_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/user/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 1 })))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_profile("access-123").await.unwrap_err();
    assert!(matches!(err, AuthError::ProfileFetch(_)));
}
