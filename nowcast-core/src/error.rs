use thiserror::Error;

/// Failures of a weather query. Any of them ends the run without a report.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable: {0}")]
    Location(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Forecast service error ({code}): {message}")]
    Api { code: String, message: String },
    #[error("Unexpected response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    /// Message shown to the user in place of the report.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Location permission is required",
            _ => "Failed to retrieve weather",
        }
    }
}

/// Failures of the login flow. None of them is fatal to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid OAuth configuration: {0}")]
    Config(String),
    #[error("Another login session is already in progress")]
    SessionBusy,
    #[error("Browser session failed: {0}")]
    Browser(String),
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
    #[error("Profile request failed: {0}")]
    ProfileFetch(String),
}
