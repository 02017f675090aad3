// Fixture - browser session and per-test page lifecycle
//
// A `Session` owns one driver and one browser for a whole run. Every test
// gets a fresh context with a single page, so cookies and storage never leak
// between tests. When a test body fails or panics, one full-page screenshot
// is handed to the artifact sink before the context is closed.
//
// Phases are logged under a per-test span; page objects built from the
// `TestPage` log under the same span.

use crate::error::{Error, Result};
use crate::report::{ArtifactSink, Attachment};
use crate::routes::{Route, Routes};
use crate::settings::{BrowserEngine, Settings};
use futures_util::FutureExt;
use playwright_rs::{
    Browser, BrowserContext, BrowserContextOptions, LaunchOptions, Page, Playwright,
    ScreenshotOptions, Viewport,
};
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::Span;

/// Extra arguments for Chromium so it runs inside containers and CI
const CHROMIUM_ARGS: [&str; 3] = ["--disable-gpu", "--no-sandbox", "--disable-dev-shm-usage"];

const VIEWPORT_WIDTH: u32 = 1920;
const VIEWPORT_HEIGHT: u32 = 1080;

/// Stage of a test's lifecycle, as recorded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Setup => "setup",
            Phase::Call => "call",
            Phase::Teardown => "teardown",
        })
    }
}

/// The page handed to a test body, with everything page objects need.
///
/// Cheap to clone; all clones drive the same browser page.
#[derive(Clone)]
pub struct TestPage {
    name: Arc<str>,
    page: Page,
    settings: Arc<Settings>,
    routes: Routes,
    span: Span,
}

impl TestPage {
    /// Name of the test this page belongs to
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Span the test's events are recorded under
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Absolute URL of `route` on the configured site
    pub fn url(&self, route: Route) -> String {
        self.routes.url(route)
    }

    pub fn current_url(&self) -> String {
        self.page.url()
    }
}

// Owns a test's context and its place in the live count. A slot dropped
// without `close` (the `run` future was cancelled) closes the context on the
// runtime and only then gives up its place.
struct ContextSlot {
    live: Arc<AtomicUsize>,
    context: Option<BrowserContext>,
}

impl ContextSlot {
    fn acquire(live: &Arc<AtomicUsize>, context: Option<BrowserContext>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            live: live.clone(),
            context,
        }
    }

    async fn close(mut self) -> Result<()> {
        match self.context.take() {
            Some(context) => Ok(context.close().await?),
            None => Ok(()),
        }
    }
}

impl Drop for ContextSlot {
    fn drop(&mut self) {
        let Some(context) = self.context.take() else {
            self.live.fetch_sub(1, Ordering::SeqCst);
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let live = self.live.clone();
                handle.spawn(async move {
                    if let Err(e) = context.close().await {
                        tracing::warn!(error = %e, "Failed to close abandoned test context");
                    }
                    live.fetch_sub(1, Ordering::SeqCst);
                });
            }
            Err(_) => {
                // Without a runtime the context stays open until the browser closes
                tracing::warn!("Test context abandoned outside a runtime");
                self.live.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}

/// One browser shared by all tests of a run
pub struct Session {
    playwright: Playwright,
    browser: Browser,
    settings: Arc<Settings>,
    routes: Routes,
    sink: Arc<dyn ArtifactSink>,
    live_contexts: Arc<AtomicUsize>,
}

impl Session {
    /// Starts the driver and launches the configured browser.
    pub async fn launch(settings: Arc<Settings>, sink: Arc<dyn ArtifactSink>) -> Result<Self> {
        tracing::info!(
            browser = %settings.browser,
            headless = settings.headless,
            base_url = %settings.base_url,
            "Launching browser session"
        );

        let playwright = Playwright::launch().await?;
        let browser_type = match settings.browser {
            BrowserEngine::Chromium => playwright.chromium(),
            BrowserEngine::Firefox => playwright.firefox(),
            BrowserEngine::Webkit => playwright.webkit(),
        };

        let mut options = LaunchOptions::new()
            .headless(settings.headless)
            .slow_mo(settings.slow_mo_ms as f64)
            .timeout(settings.default_timeout_ms as f64);
        if settings.browser == BrowserEngine::Chromium {
            options = options.args(CHROMIUM_ARGS.iter().map(|arg| arg.to_string()).collect());
        }

        let browser = match browser_type.launch_with_options(options).await {
            Ok(browser) => browser,
            Err(e) => {
                tracing::error!(error = %e, "Browser launch failed");
                if let Err(shutdown) = playwright.shutdown().await {
                    tracing::warn!(error = %shutdown, "Driver shutdown failed");
                }
                return Err(e.into());
            }
        };
        tracing::info!(version = %browser.version(), "Browser launched");

        Ok(Self {
            playwright,
            routes: Routes::new(settings.base_url.clone()),
            browser,
            settings,
            sink,
            live_contexts: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Number of test contexts currently open
    pub fn live_contexts(&self) -> usize {
        self.live_contexts.load(Ordering::SeqCst)
    }

    async fn new_context(&self) -> Result<BrowserContext> {
        let options = BrowserContextOptions::builder()
            .viewport(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
            })
            .ignore_https_errors(true)
            .build();
        Ok(self.browser.new_context_with_options(options).await?)
    }

    /// Runs `body` against a fresh page in a fresh context.
    ///
    /// On failure or panic the page is screenshotted into the sink once, then
    /// the page and context are closed and the body's outcome is returned
    /// (or the panic resumed). A teardown error is only reported when the
    /// body itself succeeded.
    pub async fn run<T, E, F, Fut>(&self, test_name: &str, body: F) -> std::result::Result<T, E>
    where
        F: FnOnce(TestPage) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<Error> + fmt::Display,
    {
        let span = tracing::info_span!("test", name = %test_name);
        tracing::info!(parent: &span, phase = %Phase::Setup, "Starting test");

        let context = self.new_context().await?;
        let slot = ContextSlot::acquire(&self.live_contexts, Some(context.clone()));
        let page = match context.new_page().await {
            Ok(page) => page,
            Err(e) => {
                if let Err(close) = slot.close().await {
                    tracing::warn!(parent: &span, error = %close, "Failed to close context");
                }
                return Err(Error::from(e).into());
            }
        };

        let test_page = TestPage {
            name: Arc::from(test_name),
            page: page.clone(),
            settings: self.settings.clone(),
            routes: self.routes.clone(),
            span: span.clone(),
        };

        tracing::info!(parent: &span, phase = %Phase::Call, "Running test body");
        let outcome = AssertUnwindSafe(body(test_page)).catch_unwind().await;

        match &outcome {
            Ok(Ok(_)) => tracing::info!(parent: &span, "Test passed"),
            Ok(Err(e)) => {
                tracing::error!(parent: &span, error = %e, "Test failed");
                self.capture_failure(test_name, &page, &span).await;
            }
            Err(_) => {
                tracing::error!(parent: &span, "Test panicked");
                self.capture_failure(test_name, &page, &span).await;
            }
        }

        tracing::info!(parent: &span, phase = %Phase::Teardown, "Closing test context");
        let page_closed = page.close().await.map_err(Error::from);
        let teardown = slot.close().await.and(page_closed);

        match outcome {
            Ok(Ok(value)) => match teardown {
                Ok(()) => Ok(value),
                Err(e) => {
                    tracing::error!(parent: &span, error = %e, "Teardown failed");
                    Err(e.into())
                }
            },
            Ok(Err(e)) => {
                if let Err(teardown) = teardown {
                    tracing::warn!(parent: &span, error = %teardown, "Teardown failed after test failure");
                }
                Err(e)
            }
            Err(panic) => {
                if let Err(teardown) = teardown {
                    tracing::warn!(parent: &span, error = %teardown, "Teardown failed after panic");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    // Screenshot problems are logged so they never mask the test's own error
    async fn capture_failure(&self, test_name: &str, page: &Page, span: &Span) {
        let options = ScreenshotOptions::builder().full_page(true).build();
        let bytes = match page.screenshot(Some(options)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(parent: span, error = %e, "Failure screenshot could not be taken");
                return;
            }
        };

        match self.sink.attach(Attachment::screenshot(test_name, bytes)).await {
            Ok(()) => tracing::info!(parent: span, "Failure screenshot attached"),
            Err(e) => {
                tracing::error!(parent: span, error = %e, "Failure screenshot could not be attached")
            }
        }
    }

    /// Closes the browser and stops the driver.
    pub async fn close(self) -> Result<()> {
        let live = self.live_contexts();
        if live > 0 {
            tracing::warn!(live, "Closing session with test contexts still open");
        }

        tracing::info!("Closing browser session");
        let closed = self.browser.close().await;
        let shutdown = self.playwright.shutdown().await;
        closed?;
        shutdown?;
        Ok(())
    }
}
