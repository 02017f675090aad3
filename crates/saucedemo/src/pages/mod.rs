// Page objects
//
// One type per storefront page plus the shared header component. Each owns a
// `BasePage` bound to the test's page and never outlives the test.

pub mod base;
pub mod cart;
pub mod checkout;
pub mod header;
pub mod inventory;
pub mod login;
pub mod product_details;

pub use base::{BasePage, Condition};
pub use cart::CartPage;
pub use checkout::CheckoutPage;
pub use header::{Badge, Header};
pub use inventory::InventoryPage;
pub use login::{LoginOutcome, LoginPage};
pub use product_details::ProductDetailsPage;
