// ProductDetailsPage - single product view

use crate::catalog::parse_price;
use crate::error::Result;
use crate::fixture::TestPage;
use crate::pages::base::BasePage;
use crate::routes::Route;

pub const ADD_BUTTON: &str = "button.btn_primary";
pub const REMOVE_BUTTON: &str = "button.btn_secondary";
pub const BACK_BUTTON: &str = "button.inventory_details_back_button";
pub const PRODUCT_NAME: &str = ".inventory_details_name";
pub const PRODUCT_PRICE: &str = ".inventory_details_price";
pub const PRODUCT_DESCRIPTION: &str = ".inventory_details_desc";

#[derive(Clone)]
pub struct ProductDetailsPage {
    base: BasePage,
}

impl ProductDetailsPage {
    pub fn new(page: &TestPage) -> Self {
        Self {
            base: BasePage::new(page),
        }
    }

    pub async fn name(&self) -> Option<String> {
        self.base.get_text(PRODUCT_NAME, None).await
    }

    /// Displayed price text, e.g. `$29.99`
    pub async fn price(&self) -> Option<String> {
        self.base.get_text(PRODUCT_PRICE, None).await
    }

    pub async fn price_value(&self) -> Option<f64> {
        self.price().await.as_deref().and_then(parse_price)
    }

    pub async fn description(&self) -> Option<String> {
        self.base.get_text(PRODUCT_DESCRIPTION, None).await
    }

    pub async fn add_to_cart(&self) -> Result<()> {
        self.base.click(ADD_BUTTON, None).await
    }

    pub async fn remove_from_cart(&self) -> Result<()> {
        self.base.click(REMOVE_BUTTON, None).await
    }

    pub async fn return_to_inventory(&self) -> Result<()> {
        self.base.click(BACK_BUTTON, None).await?;
        self.base.wait_for_url(Route::Inventory, None).await
    }
}
