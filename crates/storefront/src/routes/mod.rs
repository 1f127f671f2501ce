//! HTTP route handlers for storefront.
//!
//! Every endpoint speaks JSON. Errors are `{ "error": "<message>" }`.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness check
//! GET    /health/ready                        - Readiness check (database)
//!
//! # Products
//! GET    /api/products                        - Listing (?q, category, min_price, max_price)
//! GET    /api/products/categories             - Category names
//! GET    /api/products/{id}                   - Product detail
//! GET    /api/products/{id}/reviews           - Reviews with rating summary
//! POST   /api/products/{id}/reviews           - Submit a review (auth)
//!
//! # Cart (session for guests, database when signed in)
//! GET    /api/cart                            - Cart with items and subtotal
//! DELETE /api/cart                            - Clear cart
//! GET    /api/cart/count                      - Total units
//! POST   /api/cart/items                      - Add one unit { product_id }
//! PATCH  /api/cart/items/{product_id}         - Set quantity { quantity }
//! DELETE /api/cart/items/{product_id}         - Remove line
//!
//! # Favorites
//! GET    /api/favorites                       - Favorite products
//! GET    /api/favorites/{product_id}          - Favorite status
//! POST   /api/favorites/{product_id}/toggle   - Add or remove
//!
//! # Auth
//! POST   /api/auth/register                   - Create account and sign in
//! POST   /api/auth/login                      - Sign in
//! POST   /api/auth/logout                     - Sign out
//! GET    /api/auth/me                         - Current user and role
//!
//! # Checkout
//! GET    /api/checkout/summary                - Cart totals (auth)
//! POST   /api/checkout                        - Place order (auth)
//!
//! # Account (requires auth)
//! GET    /api/account                         - Dashboard
//! GET    /api/account/addresses               - Address list
//! POST   /api/account/addresses               - Add address
//! POST   /api/account/addresses/{id}/default  - Make default
//! DELETE /api/account/addresses/{id}          - Delete address
//! GET    /api/account/orders                  - Order history
//! GET    /api/account/orders/{id}             - Order detail
//!
//! # Admin (requires admin role)
//! GET    /api/admin/users                     - Users with roles
//! PUT    /api/admin/users/{id}/role           - Change role
//! GET    /api/admin/products                  - All products
//! POST   /api/admin/products                  - Create product
//! PUT    /api/admin/products/{id}             - Update product
//! DELETE /api/admin/products/{id}             - Delete product
//! GET    /api/admin/orders                    - All orders
//! PUT    /api/admin/orders/{id}/status        - Change order status
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/categories", get(products::categories))
        .route("/{id}", get(products::show))
        .route(
            "/{id}/reviews",
            get(products::reviews).post(products::create_review),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add))
        .route(
            "/items/{product_id}",
            patch(cart::update).delete(cart::remove),
        )
}

/// Create the favorites routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route("/{product_id}", get(favorites::show))
        .route("/{product_id}/toggle", post(favorites::toggle))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::place_order))
        .route("/summary", get(checkout::summary))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route("/addresses/{id}", delete(account::delete_address))
        .route(
            "/addresses/{id}/default",
            post(account::set_default_address),
        )
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::users))
        .route("/users/{id}/role", put(admin::set_role))
        .route(
            "/products",
            get(admin::products).post(admin::create_product),
        )
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/orders", get(admin::orders))
        .route("/orders/{id}/status", put(admin::set_order_status))
}

/// Create all API routes for the storefront.
///
/// Auth endpoints get the strict rate limiter; everything else the relaxed one.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/favorites", favorite_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
        .nest("/admin", admin_routes())
        .layer(api_rate_limiter());

    Router::new()
        .nest("/api", api)
        .nest("/api/auth", auth_routes().layer(auth_rate_limiter()))
}
