// Header - menu, cart badge and cart link shared by every signed-in page

use crate::error::Result;
use crate::fixture::TestPage;
use crate::pages::base::{BasePage, Condition};
use crate::routes::Route;
use std::time::Duration;

pub const MENU_BUTTON: &str = ".bm-burger-button";
pub const LOGOUT_LINK: &str = "#logout_sidebar_link";
pub const CART_BADGE: &str = ".shopping_cart_badge";
pub const CART_LINK: &str = ".shopping_cart_link";

// The badge is rendered with the page; a short bound is enough to read it.
const BADGE_READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// What the cart badge showed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Badge {
    /// No badge rendered, the cart is empty
    Absent,
    Count(u32),
    /// Badge text that is not a count
    Unreadable(String),
}

impl Badge {
    pub fn parse(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            None | Some("") => Badge::Absent,
            Some(text) => match text.parse() {
                Ok(count) => Badge::Count(count),
                Err(_) => Badge::Unreadable(text.to_string()),
            },
        }
    }

    /// Item count the badge stands for; absent and unreadable badges read as 0.
    pub fn count(&self) -> u32 {
        match self {
            Badge::Count(count) => *count,
            Badge::Absent | Badge::Unreadable(_) => 0,
        }
    }
}

/// Header component composed into the inventory, cart and checkout pages
#[derive(Clone)]
pub struct Header {
    base: BasePage,
}

impl Header {
    pub fn new(page: &TestPage) -> Self {
        Self::from_base(BasePage::new(page))
    }

    pub(crate) fn from_base(base: BasePage) -> Self {
        Self { base }
    }

    pub async fn open_menu(&self) -> Result<()> {
        self.base.click(MENU_BUTTON, None).await?;
        // The link is always in the DOM; only its visibility tells the menu is open
        let shown = self
            .base
            .first_of(&[(Condition::Visible(LOGOUT_LINK), ())], self.base.action_timeout())
            .await;
        if shown.is_none() {
            tracing::warn!(parent: self.base.span(), "Side menu did not open");
        }
        Ok(())
    }

    /// Opens the menu and signs out, returning once the login page is shown.
    pub async fn logout(&self) -> Result<()> {
        self.open_menu().await?;
        tracing::info!(parent: self.base.span(), "Logging out");
        self.base.click(LOGOUT_LINK, None).await?;
        self.base.wait_for_url(Route::Login, None).await
    }

    /// Items in the cart according to the badge. Never fails.
    pub async fn cart_count(&self) -> u32 {
        if self.base.count(CART_BADGE).await == 0 {
            return 0;
        }

        let text = self.base.get_text(CART_BADGE, Some(BADGE_READ_TIMEOUT)).await;
        let badge = Badge::parse(text.as_deref());
        if let Badge::Unreadable(text) = &badge {
            tracing::warn!(parent: self.base.span(), %text, "Cart badge is not a number");
        }
        badge.count()
    }

    pub async fn open_cart(&self) -> Result<()> {
        self.base.click(CART_LINK, None).await?;
        self.base.wait_for_url(Route::Cart, None).await
    }
}
