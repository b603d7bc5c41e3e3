//! Checkout: turning a cart into an order draft.
//!
//! The draft is built as a pure value first and persisted atomically by
//! `OrderRepository::create`, so validation failures never leave a
//! half-written order behind.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use mercado_core::plus_code::{PlusCode, PlusCodeError};
use mercado_core::{PaymentMethod, ProductId, ProfileId};

use super::cart::Cart;

/// Checkout form fields submitted by the buyer.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    /// Optional Plus Code geocode refining the street address.
    pub address_code: Option<String>,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
}

/// Errors building an order draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid plus code: {0}")]
    InvalidPlusCode(#[from] PlusCodeError),
}

/// A line item ready for insertion, snapshot prices included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftItem {
    pub product_id: ProductId,
    pub seller_id: ProfileId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// A validated order ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub payment_method: PaymentMethod,
    /// Item subtotal plus the delivery fee.
    pub total: Decimal,
    /// Pipe-joined contact block: `name | phone | street address`.
    pub delivery_address: String,
    pub address_code: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<DraftItem>,
}

/// Build an order draft from a cart and the checkout form.
///
/// The charged total is the cart's snapshot total plus `delivery_fee`; stock
/// is not re-checked or decremented here.
///
/// # Errors
///
/// Returns `CheckoutError` if the cart is empty, a contact field is blank,
/// or the Plus Code doesn't parse.
pub fn build_order(
    cart: &Cart,
    request: &CheckoutRequest,
    delivery_fee: Decimal,
) -> Result<OrderDraft, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let full_name = required(&request.full_name, "name")?;
    let phone = required(&request.phone, "phone")?;
    let address = required(&request.address, "address")?;

    let address_code = match request.address_code.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(PlusCode::parse(raw)?.as_str().to_owned()),
    };

    let items = cart
        .items
        .iter()
        .map(|i| DraftItem {
            product_id: i.product_id,
            seller_id: i.seller_id,
            quantity: i.quantity,
            unit_price: i.price,
            total: i.subtotal(),
        })
        .collect();

    Ok(OrderDraft {
        payment_method: request.payment_method,
        total: cart.total() + delivery_fee,
        delivery_address: format!("{full_name} | {phone} | {address}"),
        address_code,
        notes: request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        items,
    })
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, CheckoutError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CheckoutError::MissingField(field));
    }
    Ok(trimmed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use mercado_core::CategoryId;

    use super::*;
    use crate::models::Product;

    fn product(price: i64) -> Product {
        Product {
            id: ProductId::generate(),
            seller_id: ProfileId::generate(),
            category_id: Some(CategoryId::generate()),
            name: "Miel de abeja".to_owned(),
            description: None,
            price: Decimal::new(price, 0),
            original_price: None,
            stock: 10,
            images: vec![],
            unit: None,
            is_active: true,
            is_featured: false,
            rating: Decimal::ZERO,
            review_count: 0,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            full_name: "Ana Rojas".to_owned(),
            phone: "71234567".to_owned(),
            address: "Av. Banzer 4to anillo".to_owned(),
            address_code: None,
            notes: None,
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn test_cash_checkout_total_includes_fee() {
        let mut cart = Cart::new();
        cart.add_item(&product(30), 2);
        cart.add_item(&product(15), 1);

        let draft = build_order(&cart, &request(), Decimal::new(10, 0)).unwrap();
        assert_eq!(draft.total, Decimal::new(85, 0));
        assert_eq!(draft.payment_method, PaymentMethod::Cash);
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].total, Decimal::new(60, 0));
    }

    #[test]
    fn test_delivery_address_is_pipe_joined() {
        let mut cart = Cart::new();
        cart.add_item(&product(5), 1);

        let draft = build_order(&cart, &request(), Decimal::ZERO).unwrap();
        assert_eq!(
            draft.delivery_address,
            "Ana Rojas | 71234567 | Av. Banzer 4to anillo"
        );
    }

    #[test]
    fn test_empty_cart_rejected() {
        let cart = Cart::new();
        assert_eq!(
            build_order(&cart, &request(), Decimal::ZERO),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn test_blank_contact_fields_rejected() {
        let mut cart = Cart::new();
        cart.add_item(&product(5), 1);

        let mut req = request();
        req.phone = "   ".to_owned();
        assert_eq!(
            build_order(&cart, &req, Decimal::ZERO),
            Err(CheckoutError::MissingField("phone"))
        );
    }

    #[test]
    fn test_plus_code_is_validated_and_normalized() {
        let mut cart = Cart::new();
        cart.add_item(&product(5), 1);

        let mut req = request();
        req.address_code = Some("5hj86r89+m5".to_owned());
        let draft = build_order(&cart, &req, Decimal::ZERO).unwrap();
        assert_eq!(draft.address_code.as_deref(), Some("5HJ86R89+M5"));

        req.address_code = Some("not-a-code".to_owned());
        assert!(matches!(
            build_order(&cart, &req, Decimal::ZERO),
            Err(CheckoutError::InvalidPlusCode(_))
        ));

        // Blank codes are simply absent.
        req.address_code = Some("  ".to_owned());
        let draft = build_order(&cart, &req, Decimal::ZERO).unwrap();
        assert_eq!(draft.address_code, None);
    }
}
