//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Health check
//!
//! # Auth
//! POST /auth/register                 - Create an account
//! POST /auth/login                    - Login (adopts the anonymous cart)
//! POST /auth/logout                   - Logout
//! GET  /auth/me                       - Current session user
//!
//! # Catalog (public)
//! GET  /categories                    - Category list
//! GET  /products                      - Search with filters (q, category, tag, featured)
//! GET  /products/{id}                 - Product detail
//! GET  /products/{id}/reviews         - Product reviews
//! POST /products/{id}/reviews         - Create/replace own review (auth)
//! GET  /sellers/{id}                  - Public shop page (profile + listings)
//!
//! # Cart (session or persisted row)
//! GET    /cart                        - Current cart with derived totals
//! POST   /cart/items                  - Add product (clamped to stock)
//! PATCH  /cart/items/{product_id}     - Set quantity (<= 0 removes)
//! DELETE /cart/items/{product_id}     - Remove line
//! DELETE /cart                        - Clear
//!
//! # Checkout (auth)
//! POST /checkout                      - Place order from the cart
//! GET  /checkout/payment-qr           - Payment QR image URL + delivery fee
//!
//! # Buyer orders (auth)
//! GET  /orders                        - Own orders
//! GET  /orders/{id}                   - Own order detail
//! POST /orders/{id}/cancel            - Cancel while pending
//! POST /orders/{id}/payment-proof     - Upload proof of transfer (multipart)
//!
//! # Profile (auth)
//! GET   /profile                      - Own profile
//! PATCH /profile                      - Update contact/shop fields
//!
//! # Seller dashboard (seller role)
//! GET    /dashboard/products          - Own listings incl. inactive
//! POST   /dashboard/products          - Create listing
//! POST   /dashboard/products/images   - Upload a product photo (multipart)
//! PUT    /dashboard/products/{id}     - Update own listing
//! DELETE /dashboard/products/{id}     - Delete own listing
//!
//! # Courier (delivery role)
//! GET  /delivery/orders               - Assigned orders
//! POST /delivery/orders/{id}/status   - confirmed->shipped->delivered
//!
//! # Admin (admin role)
//! GET  /admin/orders                  - All orders (optional status filter)
//! POST /admin/orders/{id}/status      - Lifecycle transition
//! POST /admin/orders/{id}/assign      - Assign/unassign courier
//! POST /admin/orders/{id}/payment     - Verify/reject payment proof
//! GET  /admin/users                   - All profiles
//! POST /admin/users/{id}/roles        - Toggle seller/delivery flags
//! POST /admin/categories              - Create category (slug derived)
//! PUT  /admin/categories/{id}         - Update category
//! DELETE /admin/categories/{id}       - Delete category (blocked by products)
//! POST /admin/products/{id}/featured  - Toggle featured flag
//! GET  /admin/settings/payment-qr     - Read payment QR URL
//! PUT  /admin/settings/payment-qr     - Set payment QR URL
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod delivery;
pub mod orders;
pub mod profile;
pub mod seller;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Body cap for the image upload routes: the image limit plus headroom for
/// multipart framing. Axum's 2 MB default would reject valid uploads before
/// the size check in the handler ever ran.
const UPLOAD_BODY_LIMIT: usize = orders::MAX_IMAGE_BYTES + 64 * 1024;

/// Assemble the full application router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Catalog
        .route("/categories", get(catalog::list_categories))
        .route("/products", get(catalog::search_products))
        .route("/products/{id}", get(catalog::get_product))
        .route(
            "/products/{id}/reviews",
            get(catalog::list_reviews).post(catalog::create_review),
        )
        .route("/sellers/{id}", get(catalog::seller_shop))
        // Cart
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/items", post(cart::add_item))
        .route(
            "/cart/items/{product_id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
        // Checkout
        .route("/checkout", post(checkout::place_order))
        .route("/checkout/payment-qr", get(checkout::payment_qr))
        // Buyer orders
        .route("/orders", get(orders::list_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/cancel", post(orders::cancel_order))
        .route(
            "/orders/{id}/payment-proof",
            post(orders::upload_proof).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Profile
        .route(
            "/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        // Seller dashboard
        .route(
            "/dashboard/products",
            get(seller::list_products).post(seller::create_product),
        )
        .route(
            "/dashboard/products/{id}",
            put(seller::update_product).delete(seller::delete_product),
        )
        .route(
            "/dashboard/products/images",
            post(seller::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Courier
        .route("/delivery/orders", get(delivery::list_assigned))
        .route("/delivery/orders/{id}/status", post(delivery::update_status))
        // Admin
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/{id}/status", post(admin::update_status))
        .route("/admin/orders/{id}/assign", post(admin::assign_courier))
        .route(
            "/admin/orders/{id}/payment",
            post(admin::review_payment_proof),
        )
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/roles", post(admin::set_role))
        .route("/admin/categories", post(admin::create_category))
        .route(
            "/admin/categories/{id}",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route("/admin/products/{id}/featured", post(admin::set_featured))
        .route(
            "/admin/settings/payment-qr",
            get(admin::get_payment_qr).put(admin::set_payment_qr),
        )
}

/// Liveness probe.
async fn health() -> &'static str {
    "ok"
}
