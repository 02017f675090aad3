// Error types for the SauceDemo suite
//
// Wrapper actions normalize the automation engine's failures into this
// taxonomy. Soft reads (text, visibility, badge) never produce an error;
// they return `Option`/defaults instead.

use thiserror::Error;

/// Result type alias for suite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by settings, wrapper actions, page objects and fixtures
#[derive(Debug, Error)]
pub enum Error {
    /// A required setting is missing or a provided one is malformed.
    ///
    /// Raised by the settings loader before any browser is launched.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A hard-fail action (click, fill, select) did not complete within its bound
    #[error("Element '{selector}' not interactable within {timeout_ms}ms: {reason}")]
    ElementNotInteractable {
        selector: String,
        timeout_ms: u64,
        reason: String,
    },

    /// Sort label with no mapping to a sort control value
    #[error("Unsupported sort option: '{0}'")]
    UnsupportedSortOption(String),

    /// A must-succeed wait (URL change, page condition) expired
    #[error("Timed out after {timeout_ms}ms waiting for {condition}")]
    WaitTimeout { condition: String, timeout_ms: u64 },

    /// Infrastructure fault from the automation engine
    #[error(transparent)]
    Browser(#[from] playwright_rs::Error),

    /// I/O error (report sink, log files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The report sink rejected an attachment
    #[error("Report error: {0}")]
    Report(String),
}

impl Error {
    /// Classifies an engine error raised by an action on `selector`.
    ///
    /// Faults of the browser/driver itself stay `Browser` so the session-level
    /// failure is visible; everything else means the element could not be
    /// acted on in time.
    pub(crate) fn from_action(
        selector: &str,
        timeout_ms: u64,
        error: playwright_rs::Error,
    ) -> Self {
        use playwright_rs::Error as Pw;

        match error {
            Pw::TargetClosed { .. }
            | Pw::ChannelClosed
            | Pw::ConnectionFailed(_)
            | Pw::TransportError(_)
            | Pw::ServerError(_)
            | Pw::ServerNotFound
            | Pw::LaunchFailed(_)
            | Pw::BrowserNotInstalled { .. } => Error::Browser(error),
            other => Error::ElementNotInteractable {
                selector: selector.to_string(),
                timeout_ms,
                reason: other.to_string(),
            },
        }
    }

    /// Returns true for errors that leave the browser session unusable.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Error::Browser(_))
    }
}
