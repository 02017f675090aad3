// LoginPage - credential entry and outcome detection

use crate::error::Result;
use crate::fixture::TestPage;
use crate::pages::base::{BasePage, Condition};
use crate::pages::header::Header;
use crate::routes::Route;
use crate::settings::Credentials;
use std::time::Duration;

pub const USERNAME_INPUT: &str = "#user-name";
pub const PASSWORD_INPUT: &str = "#password";
pub const LOGIN_BUTTON: &str = "#login-button";
pub const ERROR_MESSAGE: &str = "[data-test='error']";

// The error banner renders client-side right after submit.
const ERROR_WAIT: Duration = Duration::from_millis(2000);

/// Which outcome a login attempt produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// An error banner appeared
    ErrorShown,
    /// The browser reached the inventory page
    Navigated,
    /// Neither happened within the bound
    Undetermined,
}

#[derive(Clone)]
pub struct LoginPage {
    base: BasePage,
    header: Header,
}

impl LoginPage {
    pub fn new(page: &TestPage) -> Self {
        let base = BasePage::new(page);
        Self {
            header: Header::from_base(base.clone()),
            base,
        }
    }

    pub async fn navigate(&self) -> Result<()> {
        self.base.navigate_to(Route::Login).await
    }

    /// Opens the login page, submits the credentials and waits for an outcome.
    ///
    /// Does not assert which outcome occurred; callers inspect the returned
    /// value, the URL or `error_message`.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        tracing::info!(parent: self.base.span(), %username, "Logging in");

        self.navigate().await?;
        self.base.fill(USERNAME_INPUT, username, None).await?;
        self.base.fill(PASSWORD_INPUT, password, None).await?;
        self.base.click(LOGIN_BUTTON, None).await?;

        let bound = ERROR_WAIT.max(self.base.default_timeout());
        let outcome = self
            .base
            .first_of(
                &[
                    (Condition::Visible(ERROR_MESSAGE), LoginOutcome::ErrorShown),
                    (Condition::AtRoute(Route::Inventory), LoginOutcome::Navigated),
                ],
                bound,
            )
            .await
            .unwrap_or(LoginOutcome::Undetermined);

        match outcome {
            LoginOutcome::ErrorShown => {
                tracing::warn!(parent: self.base.span(), %username, "Login rejected")
            }
            LoginOutcome::Navigated => {
                tracing::info!(parent: self.base.span(), %username, "Login succeeded")
            }
            LoginOutcome::Undetermined => {
                tracing::warn!(parent: self.base.span(), %username, "Login outcome undetermined")
            }
        }
        Ok(outcome)
    }

    pub async fn login_as(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        self.login(&credentials.username, &credentials.password).await
    }

    /// Text of the error banner, if one is shown.
    pub async fn error_message(&self) -> Option<String> {
        self.base.get_text(ERROR_MESSAGE, Some(ERROR_WAIT)).await
    }

    pub fn current_url(&self) -> String {
        self.base.current_url()
    }

    /// Signs out through the header menu.
    pub async fn logout(&self) -> Result<()> {
        self.header.logout().await
    }
}
