// Routes - fixed pages exposed by the storefront
//
// The site is an external contract: these paths are consumed, never modified.

use std::fmt;

/// A page of the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Inventory,
    InventoryItem,
    Cart,
    CheckoutStepOne,
    CheckoutStepTwo,
    CheckoutComplete,
}

impl Route {
    /// Path of the route relative to the site root
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "index.html",
            Route::Inventory => "inventory.html",
            Route::InventoryItem => "inventory-item.html",
            Route::Cart => "cart.html",
            Route::CheckoutStepOne => "checkout-step-one.html",
            Route::CheckoutStepTwo => "checkout-step-two.html",
            Route::CheckoutComplete => "checkout-complete.html",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Resolves routes against the configured site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    base_url: String,
}

impl Routes {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of `route`
    pub fn url(&self, route: Route) -> String {
        format!("{}/{}", self.base_url, route.path())
    }

    /// Returns true when `url` points at `route`, ignoring query and fragment.
    ///
    /// The product details page carries `?id=N`, so it is matched by path only.
    pub fn matches(&self, url: &str, route: Route) -> bool {
        let without_fragment = url.split('#').next().unwrap_or(url);
        let without_query = without_fragment
            .split('?')
            .next()
            .unwrap_or(without_fragment);
        without_query == self.url(route)
    }
}
