//! Cart value type.
//!
//! The cart owns its mutation rules so handlers and the persistence layer
//! stay dumb: adding clamps to the product's stock at call time, setting a
//! quantity at or below zero removes the line, and totals are always derived
//! from the items rather than stored.
//!
//! Prices in the cart are snapshots. A seller editing a product's price does
//! not touch carts that already hold it; checkout charges the snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercado_core::{ProductId, ProfileId};

use crate::models::Product;

/// One cart line: a product snapshot plus a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub seller_id: ProfileId,
    pub name: String,
    /// Unit price at the time the item was added.
    pub price: Decimal,
    /// Stock ceiling at the time the item was added.
    pub stock: i32,
    pub image_url: Option<String>,
    pub quantity: i32,
}

impl CartItem {
    fn snapshot(product: &Product, quantity: i32) -> Self {
        Self {
            product_id: product.id,
            seller_id: product.seller_id,
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            image_url: product.primary_image().map(String::from),
            quantity,
        }
    }

    /// Line subtotal.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A shopping cart.
///
/// Serialized as JSON both into the `carts` table (authenticated users) and
/// into the session (anonymous visitors).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a product, merging with an existing line for the same product.
    ///
    /// The resulting quantity is clamped to the product's stock as of this
    /// call; adding an out-of-stock product is a no-op.
    pub fn add_item(&mut self, product: &Product, quantity: i32) {
        if quantity <= 0 || product.stock <= 0 {
            return;
        }

        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(quantity).min(product.stock);
                // Refresh the snapshot ceiling alongside the merge.
                item.stock = product.stock;
            }
            None => {
                let quantity = quantity.min(product.stock);
                self.items.push(CartItem::snapshot(product, quantity));
            }
        }
    }

    /// Remove a product's line entirely.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Set a line's quantity directly. Zero or negative removes the line.
    ///
    /// Unknown products are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i32) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line subtotals (snapshot prices).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> i32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge another cart into this one (anonymous cart adopted at login).
    ///
    /// Lines for the same product keep this cart's snapshot and add the
    /// incoming quantity, capped by the snapshot's stock ceiling.
    pub fn merge(&mut self, other: Self) {
        for incoming in other.items {
            match self
                .items
                .iter_mut()
                .find(|i| i.product_id == incoming.product_id)
            {
                Some(item) => {
                    item.quantity = item.quantity.saturating_add(incoming.quantity).min(item.stock);
                }
                None => self.items.push(incoming),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use mercado_core::{CategoryId, ProfileId};

    use super::*;

    fn product(stock: i32, price: i64) -> Product {
        Product {
            id: ProductId::generate(),
            seller_id: ProfileId::generate(),
            category_id: Some(CategoryId::generate()),
            name: "Queso criollo".to_owned(),
            description: None,
            price: Decimal::new(price, 0),
            original_price: None,
            stock,
            images: vec!["https://img.example.net/queso.jpg".to_owned()],
            unit: Some("kg".to_owned()),
            is_active: true,
            is_featured: false,
            rating: Decimal::ZERO,
            review_count: 0,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let p = product(3, 10);
        let mut cart = Cart::new();
        cart.add_item(&p, 5);
        assert_eq!(cart.items[0].quantity, 3);

        // Adding more of the same product stays clamped.
        cart.add_item(&p, 2);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_add_merges_lines() {
        let p = product(10, 10);
        let mut cart = Cart::new();
        cart.add_item(&p, 2);
        cart.add_item(&p, 3);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn test_add_saturates_on_huge_quantity() {
        let p = product(3, 10);
        let mut cart = Cart::new();
        cart.add_item(&p, 5);
        // The sum must saturate rather than wrap; the clamp still applies.
        cart.add_item(&p, i32::MAX);
        assert_eq!(cart.items[0].quantity, 3);
    }

    #[test]
    fn test_merge_saturates_on_huge_quantity() {
        let p = product(5, 10);
        let mut saved = Cart::new();
        saved.add_item(&p, 4);

        // A persisted cart can carry any quantity an old client wrote.
        let mut incoming = Cart::new();
        incoming.add_item(&p, 1);
        incoming.items[0].quantity = i32::MAX;

        saved.merge(incoming);
        assert_eq!(saved.items[0].quantity, 5);
    }

    #[test]
    fn test_out_of_stock_add_is_noop() {
        let p = product(0, 10);
        let mut cart = Cart::new();
        cart.add_item(&p, 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let p = product(10, 10);
        let mut cart = Cart::new();
        cart.add_item(&p, 2);
        cart.update_quantity(p.id, 0);
        assert!(cart.is_empty());

        cart.add_item(&p, 2);
        cart.update_quantity(p.id, -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_sets_directly() {
        let p = product(10, 10);
        let mut cart = Cart::new();
        cart.add_item(&p, 2);
        cart.update_quantity(p.id, 7);
        assert_eq!(cart.items[0].quantity, 7);

        // Unknown products are ignored.
        cart.update_quantity(ProductId::generate(), 3);
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_total_and_count_are_derived() {
        let a = product(10, 10);
        let b = product(10, 25);
        let mut cart = Cart::new();
        cart.add_item(&a, 2);
        cart.add_item(&b, 1);
        assert_eq!(cart.total(), Decimal::new(45, 0));
        assert_eq!(cart.count(), 3);

        cart.remove_item(a.id);
        assert_eq!(cart.total(), Decimal::new(25, 0));
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn test_price_is_a_snapshot() {
        let mut p = product(10, 10);
        let mut cart = Cart::new();
        cart.add_item(&p, 1);

        // Seller raises the price after the item is in the cart.
        p.price = Decimal::new(99, 0);
        assert_eq!(cart.total(), Decimal::new(10, 0));
    }

    #[test]
    fn test_clear() {
        let p = product(10, 10);
        let mut cart = Cart::new();
        cart.add_item(&p, 2);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_json_round_trip() {
        let p = product(10, 10);
        let mut cart = Cart::new();
        cart.add_item(&p, 2);

        let json = serde_json::to_string(&cart).unwrap();
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_merge_adopts_anonymous_cart() {
        let a = product(5, 10);
        let b = product(5, 20);

        let mut anon = Cart::new();
        anon.add_item(&a, 2);
        anon.add_item(&b, 1);

        let mut saved = Cart::new();
        saved.add_item(&a, 4);

        saved.merge(anon);
        assert_eq!(saved.items.len(), 2);
        // 4 + 2 capped by the stock ceiling of 5.
        assert_eq!(saved.items[0].quantity, 5);
        assert_eq!(saved.items[1].quantity, 1);
    }
}
