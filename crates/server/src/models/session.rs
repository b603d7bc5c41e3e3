//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use mercado_core::{Email, ProfileId, RoleSet};

/// Session-stored user identity.
///
/// The role set is resolved from the profile's flags at login time; role
/// changes take effect on the next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Profile's database ID.
    pub id: ProfileId,
    /// User's email address.
    pub email: Email,
    /// Capabilities granted by the profile's role flags.
    pub roles: RoleSet,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous visitor's cart, merged into the user's
    /// persisted cart at login and removed.
    pub const ANON_CART: &str = "anon_cart";
}
