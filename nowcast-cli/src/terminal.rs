//! Terminal stand-ins for the browser and navigation collaborators.

use async_trait::async_trait;
use inquire::{InquireError, Text};
use nowcast_core::{
    AuthError, AuthRedirect,
    auth::{AuthBrowser, Navigator},
};
use url::Url;

/// Opens the consent page in the system browser and asks the user to paste
/// back the URL the browser was redirected to.
#[derive(Debug, Default)]
pub struct PasteBrowser;

#[async_trait]
impl AuthBrowser for PasteBrowser {
    async fn authorize(&self, url: &Url) -> Result<AuthRedirect, AuthError> {
        println!("Opening the Kakao login page:\n  {url}");
        if let Err(e) = webbrowser::open(url.as_str()) {
            tracing::warn!("Failed to open browser: {}", e);
            println!("Open the link above manually.");
        }

        let answer = tokio::task::spawn_blocking(|| {
            Text::new("Redirected URL:")
                .with_help_message("Paste the address the browser ended on after login")
                .prompt()
        })
        .await
        .map_err(|e| AuthError::Browser(e.to_string()))?;

        match answer {
            Ok(redirect) => Ok(AuthRedirect::from_redirect_url(&redirect)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                Ok(AuthRedirect::Cancelled)
            }
            Err(e) => Err(AuthError::Browser(e.to_string())),
        }
    }
}

/// Prints what a graphical app would show on navigation.
#[derive(Debug, Default)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn enter_authenticated_area(&self) {
        println!("Signed in. Run `nowcast show --lat <LAT> --lon <LON>` for the current weather.");
    }

    fn notify(&self, title: &str, message: &str) {
        println!("{title}: {message}");
    }
}
