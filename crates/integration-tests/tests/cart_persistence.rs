//! Cart serialization and the anonymous-cart adoption that happens at login.
//!
//! The same `Cart` value is stored as JSON in the session (anonymous
//! visitors) and in the `carts` table (authenticated users); these tests pin
//! the document shape and the merge semantics between the two.

use rust_decimal::Decimal;

use mercado_server::services::cart::Cart;

use mercado_integration_tests::fixtures;

#[test]
fn test_cart_document_shape() {
    let mut cart = Cart::new();
    let product = fixtures::product(8, 25);
    cart.add_item(&product, 3);

    let doc = serde_json::to_value(&cart).expect("cart should serialize");
    let items = doc
        .get("items")
        .and_then(|v| v.as_array())
        .expect("document has an items array");
    assert_eq!(items.len(), 1);

    let line = &items[0];
    assert_eq!(line["product_id"], product.id.to_string());
    assert_eq!(line["quantity"], 3);
    assert_eq!(line["name"], "Cafe organico");
}

#[test]
fn test_cart_roundtrips_through_json() {
    let mut cart = Cart::new();
    cart.add_item(&fixtures::product(8, 25), 3);
    cart.add_item(&fixtures::product(2, 90), 1);

    let json = serde_json::to_string(&cart).expect("serialize");
    let restored: Cart = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, cart);
    assert_eq!(restored.total(), cart.total());
}

#[test]
fn test_login_adopts_anonymous_cart() {
    let shared = fixtures::product(10, 15);

    // The persisted cart already holds 4 units from a previous session.
    let mut persisted = Cart::new();
    persisted.add_item(&shared, 4);
    persisted.add_item(&fixtures::product(3, 50), 1);

    // The visitor browsed anonymously and added more of the same product.
    let mut anonymous = Cart::new();
    anonymous.add_item(&shared, 2);
    anonymous.add_item(&fixtures::product(5, 8), 5);

    persisted.merge(anonymous);

    assert_eq!(persisted.items.len(), 3);
    let merged_line = persisted
        .items
        .iter()
        .find(|i| i.product_id == shared.id)
        .expect("shared line survives the merge");
    assert_eq!(merged_line.quantity, 6);
}

#[test]
fn test_merge_respects_stock_ceiling() {
    let scarce = fixtures::product(5, 40);

    let mut persisted = Cart::new();
    persisted.add_item(&scarce, 4);

    let mut anonymous = Cart::new();
    anonymous.add_item(&scarce, 4);

    persisted.merge(anonymous);

    // 4 + 4 would exceed the 5 in stock; the merge caps at the snapshot.
    assert_eq!(persisted.items[0].quantity, 5);
    assert_eq!(persisted.total(), Decimal::new(200, 0));
}

#[test]
fn test_empty_anonymous_cart_is_a_noop() {
    let mut persisted = Cart::new();
    persisted.add_item(&fixtures::product(10, 15), 2);
    let before = persisted.clone();

    persisted.merge(Cart::new());
    assert_eq!(persisted, before);
}
