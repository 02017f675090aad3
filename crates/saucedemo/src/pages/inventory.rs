// InventoryPage - product listing, sorting and add/remove buttons
//
// Per-product buttons are located by an XPath anchored on the product's
// exact display name, so names sharing a prefix never collide.

use crate::catalog::{SortOrder, parse_price};
use crate::error::Result;
use crate::fixture::TestPage;
use crate::pages::base::{BasePage, xpath_literal};
use crate::pages::header::Header;
use crate::routes::Route;
use std::collections::BTreeSet;

pub const SORT_DROPDOWN: &str = ".product_sort_container";
pub const PRODUCT_PRICES: &str = ".inventory_item_price";
pub const PRODUCT_NAMES: &str = ".inventory_item_name";
pub const INVENTORY_ITEMS: &str = ".inventory_item";
pub const PRODUCT_IMAGES: &str = ".inventory_item img";

fn item_xpath(item_name: &str, tail: &str) -> String {
    format!(
        "xpath=//div[text()={}]/ancestor::div[@class='inventory_item']{}",
        xpath_literal(item_name),
        tail
    )
}

/// Selector of the add button on `item_name`'s card
pub fn add_to_cart_button(item_name: &str) -> String {
    item_xpath(item_name, "//button[text()='ADD TO CART']")
}

/// Selector of the remove button on `item_name`'s card
pub fn remove_button(item_name: &str) -> String {
    item_xpath(item_name, "//button[text()='REMOVE']")
}

/// Selector of the image linking to `item_name`'s details page
pub fn product_image(item_name: &str) -> String {
    item_xpath(item_name, "//img")
}

#[derive(Clone)]
pub struct InventoryPage {
    base: BasePage,
    header: Header,
}

impl InventoryPage {
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
        self.base.navigate_to(Route::Inventory).await
    }

    /// Sorts by a human-readable label such as "Price (low to high)".
    ///
    /// Unmapped labels fail with `UnsupportedSortOption` before the page is
    /// touched.
    pub async fn sort(&self, label: &str) -> Result<()> {
        let order = SortOrder::from_label(label)?;
        self.sort_by(order).await
    }

    pub async fn sort_by(&self, order: SortOrder) -> Result<()> {
        tracing::info!(parent: self.base.span(), sort = %order, "Sorting products");
        self.base.select(SORT_DROPDOWN, order.token(), None).await
    }

    /// Prices in display order. Unparsable price texts are skipped.
    pub async fn product_prices(&self) -> Result<Vec<f64>> {
        let texts = self.base.all_texts(PRODUCT_PRICES).await?;
        let mut prices = Vec::with_capacity(texts.len());
        for text in texts {
            match parse_price(&text) {
                Some(price) => prices.push(price),
                None => tracing::warn!(parent: self.base.span(), %text, "Unparsable price"),
            }
        }
        Ok(prices)
    }

    /// Names in display order.
    pub async fn product_names(&self) -> Result<Vec<String>> {
        self.base.all_texts(PRODUCT_NAMES).await
    }

    pub async fn products_count(&self) -> usize {
        self.base.count(INVENTORY_ITEMS).await
    }

    /// Distinct image sources on the listing, sorted.
    pub async fn unique_product_image_urls(&self) -> Result<Vec<String>> {
        let sources: BTreeSet<String> = self
            .base
            .all_attributes(PRODUCT_IMAGES, "src")
            .await?
            .into_iter()
            .flatten()
            .collect();
        Ok(sources.into_iter().collect())
    }

    pub async fn add_to_cart(&self, item_name: &str) -> Result<()> {
        tracing::info!(parent: self.base.span(), item = %item_name, "Adding to cart");
        self.base.click(&add_to_cart_button(item_name), None).await
    }

    pub async fn remove_from_cart(&self, item_name: &str) -> Result<()> {
        tracing::info!(parent: self.base.span(), item = %item_name, "Removing from cart");
        self.base.click(&remove_button(item_name), None).await
    }

    /// True when the item's card shows a remove button.
    pub async fn is_item_in_cart(&self, item_name: &str) -> bool {
        self.base.count(&remove_button(item_name)).await > 0
    }

    pub async fn cart_count(&self) -> u32 {
        self.header.cart_count().await
    }

    pub async fn open_cart(&self) -> Result<()> {
        self.header.open_cart().await
    }

    /// Opens the details page of `item_name` through its image.
    pub async fn open_product_details(&self, item_name: &str) -> Result<()> {
        tracing::info!(parent: self.base.span(), item = %item_name, "Opening product details");
        self.base.click(&product_image(item_name), None).await?;
        self.base.wait_for_url(Route::InventoryItem, None).await
    }
}
