//! Integration tests for the cart and favorites.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database
//! - The storefront running (cargo run -p essence-storefront)
//!
//! Run with: cargo test -p essence-integration-tests -- --ignored

use std::time::Duration;

use essence_integration_tests::{
    add_to_cart, admin_client, base_url, client, create_product, database,
    delete_product_row, first_product, login, register, unique_email,
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_guest_add_twice_increments_quantity() {
    let client = client();
    let product = first_product(&client).await;
    let product_id = &product["original_id"];

    for _ in 0..2 {
        let resp = client
            .post(format!("{}/api/cart/items", base_url()))
            .json(&json!({ "product_id": product_id }))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let cart: Value = client
        .get(format!("{}/api/cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");

    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert_eq!(cart["item_count"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_quantity_zero_removes_line() {
    let client = client();
    register(&client).await;
    let product = first_product(&client).await;
    let product_id = product["original_id"].as_str().expect("original_id");

    client
        .post(format!("{}/api/cart/items", base_url()))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("Failed to add to cart");

    let cart: Value = client
        .patch(format!("{}/api/cart/items/{product_id}", base_url()))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("Failed to update quantity")
        .json()
        .await
        .expect("Failed to parse cart");

    assert_eq!(cart["item_count"], 0);
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_unknown_product_is_404() {
    let client = client();
    let resp = client
        .post(format!("{}/api/cart/items", base_url()))
        .json(&json!({ "product_id": "00000000-0000-4000-8000-000000000000" }))
        .send()
        .await
        .expect("Failed to add to cart");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_guest_cart_merges_on_register() {
    let client = client();
    let product = first_product(&client).await;

    client
        .post(format!("{}/api/cart/items", base_url()))
        .json(&json!({ "product_id": product["original_id"] }))
        .send()
        .await
        .expect("Failed to add to cart");

    let signed_in = register(&client).await;
    assert_eq!(signed_in["merged"]["cart_lines"], 1);

    let count: Value = client
        .get(format!("{}/api/cart/count", base_url()))
        .send()
        .await
        .expect("Failed to get cart count")
        .json()
        .await
        .expect("Failed to parse count");
    assert_eq!(count["count"], 1);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_favorite_toggle_twice_restores_state() {
    let client = client();
    register(&client).await;
    let product = first_product(&client).await;
    let product_id = product["original_id"].as_str().expect("original_id");
    let toggle_url = format!("{}/api/favorites/{product_id}/toggle", base_url());

    let first: Value = client
        .post(&toggle_url)
        .send()
        .await
        .expect("Failed to toggle")
        .json()
        .await
        .expect("Failed to parse toggle");
    assert_eq!(first["favorite"], true);

    let second: Value = client
        .post(&toggle_url)
        .send()
        .await
        .expect("Failed to toggle")
        .json()
        .await
        .expect("Failed to parse toggle");
    assert_eq!(second["favorite"], false);

    let favorites: Value = client
        .get(format!("{}/api/favorites", base_url()))
        .send()
        .await
        .expect("Failed to list favorites")
        .json()
        .await
        .expect("Failed to parse favorites");
    assert_eq!(favorites.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_signed_in_add_twice_increments_quantity() {
    let client = client();
    register(&client).await;
    let product = first_product(&client).await;
    let product_id = product["original_id"].as_str().expect("original_id");

    let first: Value = add_to_cart(&client, product_id)
        .await
        .json()
        .await
        .expect("Failed to parse cart update");
    assert_eq!(first["notice"]["title"], "Added to cart");
    assert_eq!(first["cart"]["items"][0]["quantity"], 1);

    let second: Value = add_to_cart(&client, product_id)
        .await
        .json()
        .await
        .expect("Failed to parse cart update");
    assert_eq!(second["notice"]["title"], "Updated cart");
    assert_eq!(second["cart"]["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(second["cart"]["items"][0]["quantity"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_add_at_line_maximum_is_rejected() {
    let client = client();
    register(&client).await;
    let product = first_product(&client).await;
    let product_id = product["original_id"].as_str().expect("original_id");

    add_to_cart(&client, product_id).await;
    let resp = client
        .patch(format!("{}/api/cart/items/{product_id}", base_url()))
        .json(&json!({ "quantity": 99 }))
        .send()
        .await
        .expect("Failed to update quantity");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = add_to_cart(&client, product_id).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let count: Value = client
        .get(format!("{}/api/cart/count", base_url()))
        .send()
        .await
        .expect("Failed to get cart count")
        .json()
        .await
        .expect("Failed to parse count");
    assert_eq!(count["count"], 99);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_guest_cart_merges_into_existing_line() {
    let client = client();
    let email = unique_email();
    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({ "email": email, "password": "correct horse battery" }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let product = first_product(&client).await;
    let product_id = product["original_id"].as_str().expect("original_id");
    add_to_cart(&client, product_id).await;
    client
        .patch(format!("{}/api/cart/items/{product_id}", base_url()))
        .json(&json!({ "quantity": 98 }))
        .send()
        .await
        .expect("Failed to update quantity");

    client
        .post(format!("{}/api/auth/logout", base_url()))
        .send()
        .await
        .expect("Failed to log out");
    for _ in 0..2 {
        add_to_cart(&client, product_id).await;
    }

    let signed_in = login(&client, &email).await;
    assert_eq!(signed_in["merged"]["cart_lines"], 1);

    let cart: Value = client
        .get(format!("{}/api/cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["items"][0]["quantity"], 99);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_add_product_deleted_behind_cache_is_404() {
    let admin = admin_client().await;
    let product_id = create_product(&admin, "Vanishing Vetiver").await;

    let client = client();
    register(&client).await;
    // Load the catalog so the server caches the new product.
    client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("Failed to list products");

    delete_product_row(&product_id).await;

    let resp = add_to_cart(&client, &product_id).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "product not found");
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_favorite_product_deleted_behind_cache_is_404() {
    let admin = admin_client().await;
    let product_id = create_product(&admin, "Fading Freesia").await;

    let client = client();
    register(&client).await;
    client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("Failed to list products");

    delete_product_row(&product_id).await;

    let resp = client
        .post(format!("{}/api/favorites/{product_id}/toggle", base_url()))
        .send()
        .await
        .expect("Failed to toggle");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let favorites: Value = client
        .get(format!("{}/api/favorites", base_url()))
        .send()
        .await
        .expect("Failed to list favorites")
        .json()
        .await
        .expect("Failed to parse favorites");
    assert_eq!(favorites.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_cart_read_does_not_wait_on_row_locks() {
    let client = client();
    let signed_in = register(&client).await;
    let user_id: Uuid = signed_in["user"]["id"]
        .as_str()
        .expect("user id")
        .parse()
        .expect("Invalid user id");
    let product = first_product(&client).await;
    add_to_cart(&client, product["original_id"].as_str().expect("original_id")).await;

    // Hold the lines the way an in-flight checkout does.
    let pool = database().await;
    let mut tx = pool.begin().await.expect("Failed to begin transaction");
    sqlx::query("SELECT 1 FROM cart WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .expect("Failed to lock cart lines");

    let resp = tokio::time::timeout(
        Duration::from_secs(5),
        client.get(format!("{}/api/cart", base_url())).send(),
    )
    .await
    .expect("Cart read waited on a row lock")
    .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::OK);

    tx.rollback().await.expect("Failed to roll back");
}
