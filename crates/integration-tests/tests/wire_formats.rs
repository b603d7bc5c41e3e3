//! Wire and storage format contracts.
//!
//! Statuses are stored as lowercase text and serialized the same way in
//! JSON; these tests pin that the two representations never drift apart.

use std::str::FromStr;

use mercado_core::{OrderStatus, PaymentMethod, PaymentStatus};

#[test]
fn test_order_status_json_matches_storage_form() {
    for status in OrderStatus::ALL {
        let json = serde_json::to_string(&status).expect("serialize");
        assert_eq!(json, format!("\"{}\"", status.as_str()));
    }
}

#[test]
fn test_order_status_storage_roundtrip() {
    for status in OrderStatus::ALL {
        assert_eq!(OrderStatus::from_str(status.as_str()).ok(), Some(status));
    }
    assert!(OrderStatus::from_str("Pending").is_err(), "case sensitive");
    assert!(OrderStatus::from_str("unknown").is_err());
}

#[test]
fn test_payment_status_storage_roundtrip() {
    for status in [
        PaymentStatus::Pending,
        PaymentStatus::Verified,
        PaymentStatus::Rejected,
    ] {
        assert_eq!(PaymentStatus::from_str(status.as_str()).ok(), Some(status));
    }
}

#[test]
fn test_payment_method_forms() {
    assert_eq!(PaymentMethod::Cash.as_str(), "cash");
    assert_eq!(PaymentMethod::Qr.as_str(), "qr");
    assert_eq!(
        serde_json::from_str::<PaymentMethod>("\"qr\"").expect("deserialize"),
        PaymentMethod::Qr
    );
    assert!(PaymentMethod::Qr.requires_verification());
    assert!(!PaymentMethod::Cash.requires_verification());
}
