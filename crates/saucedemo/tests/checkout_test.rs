// Integration tests for the checkout flow
//
// Tests cover:
// - Successful checkout ends on the confirmation message
// - Each missing shipping field keeps the form on step one with its own error
// - Checkout with an empty cart is not blocked by the site
// - complete_checkout reports a rejected form instead of finishing

mod common;

use common::Harness;
use saucedemo_e2e::catalog::{BACKPACK, ShippingDetails};
use saucedemo_e2e::pages::{CartPage, CheckoutPage, InventoryPage, LoginPage};
use saucedemo_e2e::{Route, UserKind};

#[tokio::test]
async fn test_successful_checkout() {
    let harness = Harness::start().await;
    let standard = harness
        .settings()
        .credentials(UserKind::Standard)
        .expect("credentials configured")
        .clone();

    harness
        .session
        .run("successful checkout", |page| async move {
            LoginPage::new(&page).login_as(&standard).await?;
            let inventory = InventoryPage::new(&page);
            inventory.add_to_cart(BACKPACK).await?;
            inventory.open_cart().await?;
            CartPage::new(&page).proceed_to_checkout().await?;

            let checkout = CheckoutPage::new(&page);
            checkout.fill_shipping("John", "Doe", "12345").await?;
            assert!(checkout.continue_checkout().await?);
            checkout.finish().await?;

            assert_eq!(
                checkout.confirmation_message().await.as_deref(),
                Some("THANK YOU FOR YOUR ORDER")
            );
            // Completing the order empties the cart
            assert_eq!(inventory.cart_count().await, 0);
            Ok::<_, anyhow::Error>(())
        })
        .await
        .expect("checkout scenario failed");

    harness.finish().await;
}

#[tokio::test]
async fn test_missing_shipping_fields() {
    let harness = Harness::start().await;
    let cases = [
        (ShippingDetails::new("", "Doe", "12345"), "Error: First Name is required"),
        (ShippingDetails::new("John", "", "12345"), "Error: Last Name is required"),
        (ShippingDetails::new("John", "Doe", ""), "Error: Postal Code is required"),
    ];

    for (details, expected) in cases {
        let standard = harness
            .settings()
            .credentials(UserKind::Standard)
            .expect("credentials configured")
            .clone();

        harness
            .session
            .run(&format!("checkout rejects: {}", expected), |page| async move {
                LoginPage::new(&page).login_as(&standard).await?;
                let inventory = InventoryPage::new(&page);
                inventory.add_to_cart(BACKPACK).await?;
                inventory.open_cart().await?;
                CartPage::new(&page).proceed_to_checkout().await?;

                let checkout = CheckoutPage::new(&page);
                checkout.fill_shipping_details(&details).await?;
                assert!(!checkout.continue_checkout().await?);
                assert_eq!(checkout.error_message().await.as_deref(), Some(expected));
                assert!(page.routes().matches(&page.current_url(), Route::CheckoutStepOne));
                Ok::<_, anyhow::Error>(())
            })
            .await
            .expect("missing field scenario failed");
    }

    assert!(harness.sink.attachments().is_empty());
    harness.finish().await;
}

#[tokio::test]
async fn test_empty_cart_checkout_allowed() {
    let harness = Harness::start().await;
    let standard = harness
        .settings()
        .credentials(UserKind::Standard)
        .expect("credentials configured")
        .clone();

    harness
        .session
        .run("empty cart checkout", |page| async move {
            LoginPage::new(&page).login_as(&standard).await?;
            let cart = CartPage::new(&page);
            cart.navigate().await?;
            assert_eq!(cart.cart_count().await, 0);
            assert!(cart.is_checkout_enabled().await?);

            cart.proceed_to_checkout().await?;
            let checkout = CheckoutPage::new(&page);
            assert!(checkout.complete_checkout(&ShippingDetails::default()).await?);
            assert_eq!(
                checkout.confirmation_message().await.as_deref(),
                Some("THANK YOU FOR YOUR ORDER")
            );
            Ok::<_, anyhow::Error>(())
        })
        .await
        .expect("empty cart scenario failed");

    harness.finish().await;
}

#[tokio::test]
async fn test_complete_checkout_stops_on_rejected_form() {
    let harness = Harness::start().await;
    let standard = harness
        .settings()
        .credentials(UserKind::Standard)
        .expect("credentials configured")
        .clone();

    harness
        .session
        .run("complete checkout with missing postal code", |page| async move {
            LoginPage::new(&page).login_as(&standard).await?;
            let cart = CartPage::new(&page);
            cart.navigate().await?;
            cart.proceed_to_checkout().await?;

            let checkout = CheckoutPage::new(&page);
            let details = ShippingDetails {
                postal_code: String::new(),
                ..ShippingDetails::default()
            };
            assert!(!checkout.complete_checkout(&details).await?);
            assert!(page.routes().matches(&page.current_url(), Route::CheckoutStepOne));
            assert_eq!(
                checkout.error_message().await.as_deref(),
                Some("Error: Postal Code is required")
            );
            Ok::<_, anyhow::Error>(())
        })
        .await
        .expect("rejected form scenario failed");

    harness.finish().await;
}
