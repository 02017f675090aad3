// CartPage - cart contents, removal and the checkout entry point

use crate::catalog::parse_price;
use crate::error::Result;
use crate::fixture::TestPage;
use crate::pages::base::{BasePage, xpath_literal};
use crate::pages::header::{CART_BADGE, Header};
use crate::routes::Route;

pub const CHECKOUT_BUTTON: &str = "a.checkout_button";
pub const CART_ITEMS: &str = ".cart_item";
pub const ITEM_PRICES: &str = ".cart_item .inventory_item_price";
pub const ITEM_NAMES: &str = ".cart_item .inventory_item_name";

/// Selector of the remove button on `item_name`'s cart row
pub fn remove_button(item_name: &str) -> String {
    format!(
        "xpath=//div[text()={}]/ancestor::div[@class='cart_item']//button[text()='REMOVE']",
        xpath_literal(item_name)
    )
}

/// Page expression that holds once the badge shows `expected` items
fn badge_shows(expected: u32) -> String {
    if expected == 0 {
        format!("document.querySelector(\"{}\") === null", CART_BADGE)
    } else {
        format!(
            "(document.querySelector(\"{}\")?.textContent ?? '').trim() === '{}'",
            CART_BADGE, expected
        )
    }
}

#[derive(Clone)]
pub struct CartPage {
    base: BasePage,
    header: Header,
}

impl CartPage {
    pub fn new(page: &TestPage) -> Self {
        let base = BasePage::new(page);
        Self {
            header: Header::from_base(base.clone()),
            base,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub async fn navigate(&self) -> Result<()> {
        self.base.navigate_to(Route::Cart).await
    }

    /// Clicks checkout and waits for the shipping form.
    ///
    /// An empty cart is not blocked by the site; that is logged, not refused.
    pub async fn proceed_to_checkout(&self) -> Result<()> {
        let count = self.cart_count().await;
        if count == 0 {
            tracing::warn!(parent: self.base.span(), "Proceeding to checkout with an empty cart");
        }
        tracing::info!(parent: self.base.span(), items = count, "Proceeding to checkout");

        self.base.click(CHECKOUT_BUTTON, None).await?;
        self.base.wait_for_url(Route::CheckoutStepOne, None).await
    }

    pub async fn cart_count(&self) -> u32 {
        self.header.cart_count().await
    }

    /// Removes `item_name` from the cart.
    ///
    /// Returns `Ok(false)` without acting when the item is not in the cart.
    /// After a removal, waits for the badge to drop by one; a badge that does
    /// not update is logged but not an error.
    pub async fn remove_item(&self, item_name: &str) -> Result<bool> {
        let button = remove_button(item_name);
        if self.base.count(&button).await == 0 {
            tracing::warn!(parent: self.base.span(), item = %item_name, "Item not in cart");
            return Ok(false);
        }

        let before = self.cart_count().await;
        tracing::info!(parent: self.base.span(), item = %item_name, "Removing item from cart");
        self.base.click(&button, None).await?;

        let expected = before.saturating_sub(1);
        let updated = self
            .base
            .wait_for_condition(
                &format!("cart badge to show {}", expected),
                &badge_shows(expected),
                Some(self.base.action_timeout()),
            )
            .await;
        if let Err(e) = updated {
            tracing::error!(parent: self.base.span(), item = %item_name, error = %e, "Cart badge did not update");
        }
        Ok(true)
    }

    /// Sum of the listed item prices.
    pub async fn cart_total(&self) -> Result<f64> {
        let texts = self.base.all_texts(ITEM_PRICES).await?;
        Ok(texts.iter().filter_map(|text| parse_price(text)).sum())
    }

    pub async fn is_checkout_enabled(&self) -> Result<bool> {
        if self.base.count(CHECKOUT_BUTTON).await == 0 {
            return Ok(false);
        }
        let locator = self.base.locator(CHECKOUT_BUTTON).await;
        Ok(locator.first().is_enabled().await?)
    }

    pub async fn item_names(&self) -> Result<Vec<String>> {
        self.base.all_texts(ITEM_NAMES).await
    }

    pub async fn items_count(&self) -> usize {
        self.base.count(CART_ITEMS).await
    }
}
