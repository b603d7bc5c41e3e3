//! Order and line-item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercado_core::{
    OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, ProfileId,
};

/// A placed order.
///
/// Lifecycle (`status`) and payment verification (`payment_status`) are
/// independent axes; see `mercado_core::lifecycle` for the transition rules
/// that connect them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: ProfileId,
    /// Courier assigned by the admin; `None` until dispatch.
    pub delivery_id: Option<ProfileId>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Storage URL of the buyer's uploaded proof of transfer (QR orders).
    pub payment_proof_url: Option<String>,
    /// Grand total at checkout time: item subtotal plus the delivery fee.
    pub total: Decimal,
    /// Pipe-joined contact block: `name | phone | street address`.
    pub delivery_address: String,
    /// Optional Plus Code geocode supplementing the street address.
    pub address_code: Option<String>,
    /// Free-form buyer note to the courier.
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Human-facing short reference, e.g. `#3F2A1B9C`.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("#{}", self.id.short_code())
    }
}

/// A line item captured at checkout.
///
/// Name-independent snapshot: `unit_price` and `total` are frozen at checkout
/// time, so later edits to the product do not rewrite order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Seller snapshot so per-seller views survive product deletion.
    pub seller_id: ProfileId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// An order together with its line items, as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
