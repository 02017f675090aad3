// Catalog - storefront data the scenarios refer to
//
// Product display names, the sort control's label/value pairs and the
// default shipping details used by checkout scenarios.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

pub const BACKPACK: &str = "Sauce Labs Backpack";
pub const BIKE_LIGHT: &str = "Sauce Labs Bike Light";
pub const BOLT_SHIRT: &str = "Sauce Labs Bolt T-Shirt";
pub const FLEECE_JACKET: &str = "Sauce Labs Fleece Jacket";
pub const ONESIE: &str = "Sauce Labs Onesie";
pub const TEST_SHIRT: &str = "Test.allTheThings() T-Shirt (Red)";

/// Every product the storefront lists
pub const PRODUCTS: [&str; 6] = [
    BACKPACK,
    BIKE_LIGHT,
    BOLT_SHIRT,
    FLEECE_JACKET,
    ONESIE,
    TEST_SHIRT,
];

/// Orderings offered by the inventory sort control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    NameAscending,
    NameDescending,
    PriceAscending,
    PriceDescending,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::NameAscending,
        SortOrder::NameDescending,
        SortOrder::PriceAscending,
        SortOrder::PriceDescending,
    ];

    /// Human-readable label shown in the control
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::NameAscending => "Name (A to Z)",
            SortOrder::NameDescending => "Name (Z to A)",
            SortOrder::PriceAscending => "Price (low to high)",
            SortOrder::PriceDescending => "Price (high to low)",
        }
    }

    /// Value token of the matching `<option>`
    pub fn token(&self) -> &'static str {
        match self {
            SortOrder::NameAscending => "az",
            SortOrder::NameDescending => "za",
            SortOrder::PriceAscending => "lohi",
            SortOrder::PriceDescending => "hilo",
        }
    }

    /// Maps a label to its order; labels are matched exactly.
    pub fn from_label(label: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|order| order.label() == label)
            .ok_or_else(|| Error::UnsupportedSortOption(label.to_string()))
    }

    /// Returns true when `prices` are ordered as this sort demands.
    ///
    /// Name orders say nothing about prices and always hold.
    pub fn prices_ordered(&self, prices: &[f64]) -> bool {
        match self {
            SortOrder::PriceAscending => prices.windows(2).all(|w| w[0] <= w[1]),
            SortOrder::PriceDescending => prices.windows(2).all(|w| w[0] >= w[1]),
            SortOrder::NameAscending | SortOrder::NameDescending => true,
        }
    }

    /// Returns true when `names` are ordered as this sort demands.
    pub fn names_ordered<S: AsRef<str>>(&self, names: &[S]) -> bool {
        match self {
            SortOrder::NameAscending => names.windows(2).all(|w| w[0].as_ref() <= w[1].as_ref()),
            SortOrder::NameDescending => names.windows(2).all(|w| w[0].as_ref() >= w[1].as_ref()),
            SortOrder::PriceAscending | SortOrder::PriceDescending => true,
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shipping form contents for checkout step one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
}

impl ShippingDetails {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postal_code: postal_code.into(),
        }
    }
}

impl Default for ShippingDetails {
    fn default() -> Self {
        Self::new("John", "Doe", "12345")
    }
}

/// Parses a displayed price such as `$29.99` or `29.99`.
pub fn parse_price(text: &str) -> Option<f64> {
    text.trim().trim_start_matches('$').trim().parse().ok()
}
