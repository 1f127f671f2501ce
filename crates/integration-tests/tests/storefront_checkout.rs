//! Integration tests for checkout and order history.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database
//! - The storefront running (cargo run -p essence-storefront)
//!
//! Run with: cargo test -p essence-integration-tests -- --ignored

use essence_integration_tests::{
    add_address, add_to_cart, base_url, client, first_product, register,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_anonymous_checkout_is_rejected() {
    let resp = client()
        .post(format!("{}/api/checkout", base_url()))
        .json(&json!({ "address_id": null }))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_checkout_without_address_is_rejected() {
    let client = client();
    register(&client).await;

    let resp = client
        .post(format!("{}/api/checkout", base_url()))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "Please select or add a shipping address");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_credit_card_is_unavailable() {
    let client = client();
    register(&client).await;
    let address_id = add_address(&client).await;

    let resp = client
        .post(format!("{}/api/checkout", base_url()))
        .json(&json!({ "address_id": address_id, "payment_method": "credit_card" }))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_place_order_clears_cart() {
    let client = client();
    register(&client).await;
    let address_id = add_address(&client).await;
    let product = first_product(&client).await;

    client
        .post(format!("{}/api/cart/items", base_url()))
        .json(&json!({ "product_id": product["original_id"] }))
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .post(format!("{}/api/checkout", base_url()))
        .json(&json!({ "address_id": address_id, "order_notes": "Leave at the door" }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let placed: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(placed["order"]["status"], "pending");
    assert_eq!(placed["order"]["payment_method"], "cash_on_delivery");
    assert_eq!(placed["order"]["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(placed["notice"]["title"], "Order Placed Successfully!");

    let cart: Value = client
        .get(format!("{}/api/cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["item_count"], 0);

    let orders: Value = client
        .get(format!("{}/api/account/orders", base_url()))
        .send()
        .await
        .expect("Failed to list orders")
        .json()
        .await
        .expect("Failed to parse orders");
    assert_eq!(orders.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_empty_cart_cannot_check_out() {
    let client = client();
    register(&client).await;
    let address_id = add_address(&client).await;

    let resp = client
        .post(format!("{}/api/checkout", base_url()))
        .json(&json!({ "address_id": address_id }))
        .send()
        .await
        .expect("Failed to post checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_order_items_keep_their_order() {
    let client = client();
    register(&client).await;
    let address_id = add_address(&client).await;

    let listing: Value = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse product listing");
    let products = listing["products"].as_array().expect("products");
    assert!(products.len() >= 3, "seed at least three products");
    for product in products.iter().take(3) {
        add_to_cart(&client, product["original_id"].as_str().expect("original_id")).await;
    }

    let placed: Value = client
        .post(format!("{}/api/checkout", base_url()))
        .json(&json!({ "address_id": address_id }))
        .send()
        .await
        .expect("Failed to place order")
        .json()
        .await
        .expect("Failed to parse order");
    let order_id = placed["order"]["id"].as_str().expect("order id");

    let stored: Value = client
        .get(format!("{}/api/account/orders/{order_id}", base_url()))
        .send()
        .await
        .expect("Failed to get order")
        .json()
        .await
        .expect("Failed to parse order");

    let product_ids = |order: &Value| -> Vec<Value> {
        order["items"]
            .as_array()
            .expect("items")
            .iter()
            .map(|item| item["product_id"].clone())
            .collect()
    };
    assert_eq!(product_ids(&placed["order"]).len(), 3);
    assert_eq!(product_ids(&placed["order"]), product_ids(&stored));
}
