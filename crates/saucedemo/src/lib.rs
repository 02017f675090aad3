//! saucedemo-e2e: Page Object end-to-end suite for the SauceDemo storefront
//!
//! Page objects wrap each storefront page behind intent-level operations,
//! a `Session` owns the browser and gives every test an isolated context,
//! and failing tests leave one screenshot in an artifact sink.
//!
//! # Examples
//!
//! ```ignore
//! use saucedemo_e2e::catalog::BACKPACK;
//! use saucedemo_e2e::pages::{InventoryPage, LoginPage};
//! use saucedemo_e2e::report::DirectorySink;
//! use saucedemo_e2e::{Session, SettingsLoader, UserKind};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> saucedemo_e2e::Result<()> {
//!     let settings = SettingsLoader::from_env().load()?;
//!     saucedemo_e2e::logging::init(&settings)?;
//!
//!     let sink = Arc::new(DirectorySink::new(settings.screenshot_dir.clone()));
//!     let session = Session::launch(settings.clone(), sink).await?;
//!
//!     session
//!         .run("add backpack", |page| async move {
//!             let user = page.settings().credentials(UserKind::Standard)?.clone();
//!             LoginPage::new(&page).login_as(&user).await?;
//!
//!             let inventory = InventoryPage::new(&page);
//!             inventory.add_to_cart(BACKPACK).await?;
//!             assert_eq!(inventory.cart_count().await, 1);
//!             Ok::<_, saucedemo_e2e::Error>(())
//!         })
//!         .await?;
//!
//!     session.close().await
//! }
//! ```

pub mod catalog;
mod error;
pub mod fixture;
pub mod logging;
pub mod pages;
pub mod report;
pub mod routes;
pub mod settings;

pub use error::{Error, Result};

pub use fixture::{Phase, Session, TestPage};

pub use routes::{Route, Routes};

pub use settings::{BrowserEngine, Credentials, Settings, SettingsLoader, UserKind};
