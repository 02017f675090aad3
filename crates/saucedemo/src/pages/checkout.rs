// CheckoutPage - shipping form, overview and completion

use crate::catalog::ShippingDetails;
use crate::error::{Error, Result};
use crate::fixture::TestPage;
use crate::pages::base::{BasePage, Condition};
use crate::routes::Route;
use std::time::Duration;

pub const FIRST_NAME_INPUT: &str = "input[data-test='firstName']";
pub const LAST_NAME_INPUT: &str = "input[data-test='lastName']";
pub const POSTAL_CODE_INPUT: &str = "input[data-test='postalCode']";
pub const CONTINUE_BUTTON: &str = "input.cart_button";
pub const FINISH_BUTTON: &str = "a.cart_button";
pub const CONFIRMATION_HEADER: &str = "h2.complete-header";
pub const ERROR_MESSAGE: &str = "h3[data-test='error']";

const MESSAGE_WAIT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContinueOutcome {
    Rejected,
    Advanced,
}

#[derive(Clone)]
pub struct CheckoutPage {
    base: BasePage,
}

impl CheckoutPage {
    pub fn new(page: &TestPage) -> Self {
        Self {
            base: BasePage::new(page),
        }
    }

    /// Fills the shipping form. Empty values leave a field blank.
    pub async fn fill_shipping(&self, first_name: &str, last_name: &str, postal_code: &str) -> Result<()> {
        tracing::info!(parent: self.base.span(), %first_name, %last_name, %postal_code, "Filling shipping details");
        self.base.fill(FIRST_NAME_INPUT, first_name, None).await?;
        self.base.fill(LAST_NAME_INPUT, last_name, None).await?;
        self.base.fill(POSTAL_CODE_INPUT, postal_code, None).await
    }

    pub async fn fill_shipping_details(&self, details: &ShippingDetails) -> Result<()> {
        self.fill_shipping(&details.first_name, &details.last_name, &details.postal_code)
            .await
    }

    /// Submits the shipping form.
    ///
    /// Returns `false` when the form shows a validation error and `true` once
    /// the overview page is reached.
    pub async fn continue_checkout(&self) -> Result<bool> {
        self.base.click(CONTINUE_BUTTON, None).await?;

        let timeout = self.base.default_timeout();
        let outcome = self
            .base
            .first_of(
                &[
                    (Condition::Visible(ERROR_MESSAGE), ContinueOutcome::Rejected),
                    (Condition::AtRoute(Route::CheckoutStepTwo), ContinueOutcome::Advanced),
                ],
                timeout,
            )
            .await;

        match outcome {
            Some(ContinueOutcome::Advanced) => Ok(true),
            Some(ContinueOutcome::Rejected) => {
                tracing::warn!(parent: self.base.span(), "Shipping details rejected");
                Ok(false)
            }
            None => Err(Error::WaitTimeout {
                condition: "checkout overview or validation error".to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Confirms the order on the overview page and waits for completion.
    pub async fn finish(&self) -> Result<()> {
        tracing::info!(parent: self.base.span(), "Finishing checkout");
        self.base.click(FINISH_BUTTON, None).await?;
        self.base.wait_for_url(Route::CheckoutComplete, None).await
    }

    /// Shipping, continue and finish in one go.
    ///
    /// Returns `false` without finishing when the shipping form is rejected;
    /// `error_message` then holds the reason.
    pub async fn complete_checkout(&self, details: &ShippingDetails) -> Result<bool> {
        self.fill_shipping_details(details).await?;
        if !self.continue_checkout().await? {
            return Ok(false);
        }
        self.finish().await?;
        Ok(true)
    }

    /// Header text of the completion page, if shown.
    pub async fn confirmation_message(&self) -> Option<String> {
        self.base
            .get_text(CONFIRMATION_HEADER, Some(MESSAGE_WAIT))
            .await
            .map(|text| text.trim().to_string())
    }

    /// Validation error of the shipping form, if shown.
    pub async fn error_message(&self) -> Option<String> {
        self.base
            .get_text(ERROR_MESSAGE, Some(MESSAGE_WAIT))
            .await
            .map(|text| text.trim().to_string())
    }
}
