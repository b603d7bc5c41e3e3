//! Shared test fixtures.

use chrono::Utc;
use rust_decimal::Decimal;

use mercado_core::{CategoryId, PaymentMethod, ProductId, ProfileId};
use mercado_server::models::Product;
use mercado_server::services::checkout::CheckoutRequest;

/// A purchasable product with the given stock and whole-unit price.
#[must_use]
pub fn product(stock: i32, price: i64) -> Product {
    Product {
        id: ProductId::generate(),
        seller_id: ProfileId::generate(),
        category_id: Some(CategoryId::generate()),
        name: "Cafe organico".to_owned(),
        description: Some("Tostado medio, 500g.".to_owned()),
        price: Decimal::new(price, 0),
        original_price: None,
        stock,
        images: vec!["https://img.example.net/cafe.jpg".to_owned()],
        unit: Some("bolsa".to_owned()),
        is_active: true,
        is_featured: false,
        rating: Decimal::ZERO,
        review_count: 0,
        tags: vec!["cafe".to_owned()],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A filled-in checkout form.
#[must_use]
pub fn checkout_request(payment_method: PaymentMethod) -> CheckoutRequest {
    CheckoutRequest {
        full_name: "Maria Flores".to_owned(),
        phone: "76543210".to_owned(),
        address: "Calle Sucre 123".to_owned(),
        address_code: None,
        notes: None,
        payment_method,
    }
}
