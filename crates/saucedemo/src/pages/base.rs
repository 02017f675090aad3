// BasePage - element action wrapper shared by all page objects
//
// Hard-fail actions (click, fill, select) return `ElementNotInteractable`
// when their bound elapses. Soft reads (presence, text, visibility) return
// `bool`/`Option` and never fail; absence is data for the caller.
//
// The bindings expose no wait-for-URL or wait-for-function, so both are
// bounded polling loops here.

use crate::error::{Error, Result};
use crate::fixture::TestPage;
use crate::routes::{Route, Routes};
use playwright_rs::{ClickOptions, FillOptions, GotoOptions, Locator, Page, SelectOptions};
use std::time::{Duration, Instant};
use tracing::Span;

/// Interval between polls of a bounded wait
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A page state a bounded wait can watch for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition<'a> {
    /// An element matching the selector is visible
    Visible(&'a str),
    /// The page location is the given route
    AtRoute(Route),
}

/// Element action wrapper bound to exactly one page for its lifetime
#[derive(Clone)]
pub struct BasePage {
    page: Page,
    routes: Routes,
    span: Span,
    action_timeout: Duration,
    default_timeout: Duration,
}

impl BasePage {
    pub fn new(test_page: &TestPage) -> Self {
        let settings = test_page.settings();
        Self {
            page: test_page.page().clone(),
            routes: test_page.routes().clone(),
            span: test_page.span().clone(),
            action_timeout: settings.action_timeout(),
            default_timeout: settings.default_timeout(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Span this page's events are recorded under
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Bound used by element actions when the caller passes `None`
    pub fn action_timeout(&self) -> Duration {
        self.action_timeout
    }

    /// Bound used by navigation and condition waits
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Current location of the page
    pub fn current_url(&self) -> String {
        self.page.url()
    }

    /// Requests a document load of `url`.
    ///
    /// Only the load itself is awaited, no page-specific post-condition.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        tracing::info!(parent: &self.span, %url, "Navigating");
        let options = GotoOptions::new().timeout(self.default_timeout);
        self.page.goto(url, Some(options)).await?;
        Ok(())
    }

    pub async fn navigate_to(&self, route: Route) -> Result<()> {
        self.navigate(&self.routes.url(route)).await
    }

    pub async fn locator(&self, selector: &str) -> Locator {
        self.page.locator(selector).await
    }

    /// Waits up to `timeout` for the element to become actionable, then clicks it.
    pub async fn click(&self, selector: &str, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or(self.action_timeout);
        tracing::info!(parent: &self.span, %selector, "Clicking element");

        let options = ClickOptions::builder()
            .timeout(timeout.as_millis() as f64)
            .build();
        let result = self.locator(selector).await.click(Some(options)).await;
        self.hard_fail(selector, timeout, "click", result)
    }

    /// Replaces the field's value with `value` within `timeout`.
    pub async fn fill(&self, selector: &str, value: &str, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or(self.action_timeout);
        tracing::info!(parent: &self.span, %selector, %value, "Filling field");

        let options = FillOptions::builder()
            .timeout(timeout.as_millis() as f64)
            .build();
        let result = self.locator(selector).await.fill(value, Some(options)).await;
        self.hard_fail(selector, timeout, "fill", result)
    }

    /// Selects the `<option>` whose value is `value`.
    pub async fn select(&self, selector: &str, value: &str, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or(self.action_timeout);
        tracing::info!(parent: &self.span, %selector, %value, "Selecting option");

        let options = SelectOptions::builder()
            .timeout(timeout.as_millis() as f64)
            .build();
        let result = self
            .locator(selector)
            .await
            .select_option(value, Some(options))
            .await
            .map(|_| ());
        self.hard_fail(selector, timeout, "select", result)
    }

    fn hard_fail(
        &self,
        selector: &str,
        timeout: Duration,
        action: &str,
        result: playwright_rs::Result<()>,
    ) -> Result<()> {
        result.map_err(|e| {
            tracing::error!(parent: &self.span, %selector, error = %e, "Failed to {}", action);
            Error::from_action(selector, timeout.as_millis() as u64, e)
        })
    }

    /// Polls for an element matching `selector` to be present in the DOM.
    ///
    /// Returns false once `timeout` elapses instead of failing.
    pub async fn wait_for_selector(&self, selector: &str, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or(self.action_timeout);
        let locator = &self.locator(selector).await;
        poll_until(timeout, || async move { locator.count().await.unwrap_or(0) > 0 }).await
    }

    /// Text content of the first matching element, or `None` if it does not
    /// appear within `timeout`.
    pub async fn get_text(&self, selector: &str, timeout: Option<Duration>) -> Option<String> {
        if !self.wait_for_selector(selector, timeout).await {
            tracing::warn!(parent: &self.span, %selector, "Element absent, no text to read");
            return None;
        }

        match self.locator(selector).await.first().text_content().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(parent: &self.span, %selector, error = %e, "Failed to read text");
                None
            }
        }
    }

    /// Like `get_text`, falling back to `default` when the element is absent.
    pub async fn text_or(&self, selector: &str, timeout: Option<Duration>, default: &str) -> String {
        self.get_text(selector, timeout)
            .await
            .unwrap_or_else(|| default.to_string())
    }

    /// Immediate visibility check, no waiting.
    pub async fn is_visible(&self, selector: &str) -> bool {
        self.locator(selector)
            .await
            .first()
            .is_visible()
            .await
            .unwrap_or(false)
    }

    /// Number of elements currently matching `selector`, zero on error.
    pub async fn count(&self, selector: &str) -> usize {
        self.locator(selector).await.count().await.unwrap_or(0)
    }

    /// Text content of every element currently matching `selector`.
    pub async fn all_texts(&self, selector: &str) -> Result<Vec<String>> {
        let locator = self.locator(selector).await;
        let count = locator.count().await?;

        let mut texts = Vec::with_capacity(count);
        for index in 0..count {
            let text = locator.nth(index as i32).text_content().await?;
            texts.push(text.unwrap_or_default().trim().to_string());
        }
        Ok(texts)
    }

    /// Value of attribute `name` on every element currently matching `selector`.
    pub async fn all_attributes(&self, selector: &str, name: &str) -> Result<Vec<Option<String>>> {
        let locator = self.locator(selector).await;
        let count = locator.count().await?;

        let mut values = Vec::with_capacity(count);
        for index in 0..count {
            values.push(locator.nth(index as i32).get_attribute(name).await?);
        }
        Ok(values)
    }

    /// Returns true when `condition` holds right now.
    pub async fn holds(&self, condition: Condition<'_>) -> bool {
        match condition {
            Condition::Visible(selector) => self.is_visible(selector).await,
            Condition::AtRoute(route) => self.routes.matches(&self.page.url(), route),
        }
    }

    /// Waits for the first of several named conditions.
    ///
    /// Returns the tag of the condition that held first, or `None` when none
    /// held within `timeout`. Conditions are checked in the given order on
    /// every poll.
    pub async fn first_of<T: Copy>(
        &self,
        candidates: &[(Condition<'_>, T)],
        timeout: Duration,
    ) -> Option<T> {
        let start = Instant::now();
        loop {
            for (condition, tag) in candidates {
                if self.holds(*condition).await {
                    return Some(*tag);
                }
            }
            if start.elapsed() >= timeout {
                return None;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Waits until the page location is `route`.
    pub async fn wait_for_url(&self, route: Route, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        if self.first_of(&[(Condition::AtRoute(route), ())], timeout).await.is_some() {
            return Ok(());
        }

        let condition = format!("{} (at {})", self.routes.url(route), self.page.url());
        tracing::error!(parent: &self.span, %condition, "Navigation did not complete");
        Err(Error::WaitTimeout {
            condition,
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    /// Waits until the JavaScript `expression` evaluates to `true` in the page.
    ///
    /// Evaluation errors (e.g. while a navigation replaces the document)
    /// count as "not yet".
    pub async fn wait_for_condition(
        &self,
        description: &str,
        expression: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let page = &self.page;
        let satisfied = poll_until(timeout, || async move {
            page.evaluate::<(), bool>(expression, None)
                .await
                .unwrap_or(false)
        })
        .await;

        if satisfied {
            Ok(())
        } else {
            Err(Error::WaitTimeout {
                condition: description.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}

/// Polls `check` until it returns true or `timeout` elapses.
async fn poll_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    loop {
        if check().await {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Quotes `value` as an XPath string literal.
///
/// XPath 1.0 has no escapes, so values holding both quote kinds are split
/// into a `concat()` of single-quoted runs and `"'"` pieces.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
