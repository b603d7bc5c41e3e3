//! Role flags and the view gating derived from them.
//!
//! Roles are additive booleans on the profile row; `RoleSet::permits`
//! is what the `RequireAdmin` / `RequireCourier` / `RequireSeller`
//! extractors consult, and the flags flatten into the profile JSON the
//! clients read.

use chrono::Utc;
use mercado_core::{Actor, Email, ProfileId, RoleSet};
use mercado_server::models::Profile;

#[test]
fn test_every_account_is_a_buyer() {
    let plain = RoleSet::from_flags(false, false, false);
    assert!(plain.permits(Actor::Buyer));
    assert!(!plain.permits(Actor::Seller));
    assert!(!plain.permits(Actor::Admin));
    assert!(!plain.permits(Actor::Courier));
}

#[test]
fn test_roles_are_additive_not_exclusive() {
    let all = RoleSet::from_flags(true, true, true);
    assert!(all.permits(Actor::Buyer));
    assert!(all.permits(Actor::Seller));
    assert!(all.permits(Actor::Admin));
    assert!(all.permits(Actor::Courier));
}

#[test]
fn test_seller_flag_does_not_grant_admin_or_courier_views() {
    let seller = RoleSet::from_flags(true, false, false);
    assert!(seller.permits(Actor::Seller));
    assert!(!seller.permits(Actor::Admin));
    assert!(!seller.permits(Actor::Courier));
}

#[test]
fn test_role_flags_flatten_into_profile_json() {
    let profile = Profile {
        id: ProfileId::generate(),
        email: Email::parse("vendor@example.net").expect("valid email"),
        full_name: "Vendor".to_owned(),
        phone: None,
        address: None,
        address_code: None,
        avatar_url: None,
        roles: RoleSet::from_flags(true, false, true),
        shop_name: Some("La Tiendita".to_owned()),
        shop_description: None,
        shop_logo_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let doc = serde_json::to_value(&profile).expect("serialize");
    // Flags appear as top-level booleans, not nested under "roles".
    assert_eq!(doc["seller"], true);
    assert_eq!(doc["admin"], false);
    assert_eq!(doc["delivery"], true);
    assert!(doc.get("roles").is_none());
}
