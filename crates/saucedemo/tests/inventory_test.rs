// Integration tests for the product listing
//
// Tests cover:
// - Price sorts produce monotonic price sequences
// - Name sorts produce ordered names
// - Unmapped sort labels fail before touching the page
// - Product images: distinct for the standard user, one broken image for the problem user

mod common;

use common::Harness;
use saucedemo_e2e::catalog::{PRODUCTS, SortOrder};
use saucedemo_e2e::pages::{InventoryPage, LoginPage};
use saucedemo_e2e::{Error, UserKind};

#[tokio::test]
async fn test_sorting() {
    let harness = Harness::start().await;
    let standard = harness
        .settings()
        .credentials(UserKind::Standard)
        .expect("credentials configured")
        .clone();

    harness
        .session
        .run("inventory sorting", |page| async move {
            LoginPage::new(&page).login_as(&standard).await?;
            let inventory = InventoryPage::new(&page);

            inventory.sort("Price (low to high)").await?;
            let prices = inventory.product_prices().await?;
            assert_eq!(prices.len(), PRODUCTS.len());
            assert!(prices.windows(2).all(|w| w[0] <= w[1]), "got {prices:?}");

            inventory.sort("Price (high to low)").await?;
            let prices = inventory.product_prices().await?;
            assert!(prices.windows(2).all(|w| w[0] >= w[1]), "got {prices:?}");

            for order in [SortOrder::NameAscending, SortOrder::NameDescending] {
                inventory.sort_by(order).await?;
                let names = inventory.product_names().await?;
                assert_eq!(names.len(), PRODUCTS.len());
                assert!(order.names_ordered(&names), "{order}: {names:?}");
            }
            Ok::<_, anyhow::Error>(())
        })
        .await
        .expect("sorting scenario failed");

    harness
        .session
        .run("unsupported sort label", |page| async move {
            let inventory = InventoryPage::new(&page);
            match inventory.sort("Popularity").await {
                Err(Error::UnsupportedSortOption(label)) => assert_eq!(label, "Popularity"),
                other => panic!("expected UnsupportedSortOption, got {other:?}"),
            }
            Ok::<_, anyhow::Error>(())
        })
        .await
        .expect("unsupported sort scenario failed");

    harness.finish().await;
}

#[tokio::test]
async fn test_product_images() {
    let harness = Harness::start().await;

    for (kind, expected_images) in [(UserKind::Standard, PRODUCTS.len()), (UserKind::Problem, 1)] {
        let credentials = harness
            .settings()
            .credentials(kind)
            .expect("credentials configured")
            .clone();

        harness
            .session
            .run(&format!("product images for {:?}", kind), |page| async move {
                LoginPage::new(&page).login_as(&credentials).await?;
                let inventory = InventoryPage::new(&page);

                assert_eq!(inventory.products_count().await, PRODUCTS.len());
                let images = inventory.unique_product_image_urls().await?;
                assert_eq!(images.len(), expected_images, "got {images:?}");
                Ok::<_, anyhow::Error>(())
            })
            .await
            .expect("image scenario failed");
    }

    harness.finish().await;
}
