//! Integration tests for the Essence storefront API.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and seed a database, then start the server
//! essence-cli migrate
//! essence-cli seed products -f crates/cli/seed/products.yaml
//! cargo run -p essence-storefront
//!
//! # Run the ignored tests against it
//! cargo test -p essence-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `ESSENCE_TEST_BASE_URL` - Server under test (default: `http://localhost:3000`)
//! - `ESSENCE_DATABASE_URL` - Same database as the server, used to grant the
//!   admin role and to change rows behind the server's back

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::indexing_slicing)]

use essence_core::{AppRole, ProductId, UserId};
use essence_storefront::db::{ProductRepository, UserRepository};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Base URL for the storefront API.
#[must_use]
pub fn base_url() -> String {
    std::env::var("ESSENCE_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client that keeps the session cookie between requests.
///
/// Each client claims its own forwarded address so the per-IP rate limits
/// apply per test rather than to the whole run.
#[must_use]
pub fn client() -> Client {
    let bytes = Uuid::new_v4().into_bytes();
    let forwarded_for = format!("198.18.{}.{}", bytes[0], bytes[1]);

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&forwarded_for).expect("valid header value"),
    );

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// A fresh, unique email address.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4().simple())
}

/// Register a new account on `client`, leaving it signed in.
///
/// Returns the response body (`{ user, merged }`).
pub async fn register(client: &Client) -> Value {
    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "email": unique_email(),
            "password": "correct horse battery",
            "full_name": "Test Customer",
        }))
        .send()
        .await
        .expect("Failed to register");

    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to parse register response")
}

/// The first product in the catalog. The database must be seeded.
pub async fn first_product(client: &Client) -> Value {
    let listing: Value = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse product listing");

    listing["products"]
        .get(0)
        .cloned()
        .expect("Catalog is empty; seed it first")
}

/// Save a shipping address for the signed-in user and return its id.
pub async fn add_address(client: &Client) -> String {
    let saved: Value = client
        .post(format!("{}/api/account/addresses", base_url()))
        .json(&json!({
            "full_name": "Test Customer",
            "phone": "555-0100",
            "address_line_1": "1 Main Street",
            "city": "Springfield",
            "state": "IL",
            "postal_code": "62701",
        }))
        .send()
        .await
        .expect("Failed to add address")
        .json()
        .await
        .expect("Failed to parse address response");

    saved["address"]["id"]
        .as_str()
        .expect("Address id missing")
        .to_string()
}

/// Log in to an existing account on `client`. Returns the response body.
pub async fn login(client: &Client, email: &str) -> Value {
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "password": "correct horse battery" }))
        .send()
        .await
        .expect("Failed to log in");

    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse login response")
}

/// Add one unit of a product to the cart on `client`.
pub async fn add_to_cart(client: &Client, product_id: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/cart/items", base_url()))
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("Failed to add to cart")
}

/// Connect to the database the server under test uses.
pub async fn database() -> PgPool {
    let database_url = std::env::var("ESSENCE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("ESSENCE_DATABASE_URL must be set for database-backed tests");
    PgPool::connect(database_url.expose_secret())
        .await
        .expect("Failed to connect to database")
}

/// A signed-in admin client.
pub async fn admin_client() -> Client {
    let client = client();
    let signed_in = register(&client).await;
    grant_admin(signed_in["user"]["id"].as_str().expect("user id")).await;
    client
}

/// Create a product through the admin API and return its id.
pub async fn create_product(admin: &Client, name: &str) -> String {
    let resp = admin
        .post(format!("{}/api/admin/products", base_url()))
        .json(&json!({ "name": name, "price": "19.00", "category": "Fresh" }))
        .send()
        .await
        .expect("Failed to create product");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let product: Value = resp.json().await.expect("Failed to parse product");
    product["id"].as_str().expect("product id").to_string()
}

/// Delete a product row directly, leaving the server's cached catalog as is.
pub async fn delete_product_row(product_id: &str) {
    let product_id: ProductId = product_id.parse().expect("Invalid product id");
    ProductRepository::new(&database().await)
        .delete(product_id)
        .await
        .expect("Failed to delete product");
}

/// Grant the admin role directly in the database.
pub async fn grant_admin(user_id: &str) {
    let pool = database().await;
    let user_id: UserId = user_id.parse().expect("Invalid user id");
    UserRepository::new(&pool)
        .set_role(user_id, AppRole::Admin)
        .await
        .expect("Failed to grant admin role");
}
