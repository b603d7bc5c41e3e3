//! Role capability set and acting roles.
//!
//! Profiles carry boolean role flags (`is_seller`, `is_admin`, `is_delivery`)
//! that are not mutually exclusive; an account can hold several roles at once.
//! Rather than threading ad hoc boolean checks through handler code, the flags
//! are resolved once at session start into a [`RoleSet`], and mutations are
//! authorized against a single [`Actor`] chosen per endpoint.

use serde::{Deserialize, Serialize};

/// The role an authenticated user is acting under for a given mutation.
///
/// A multi-role account picks up the actor from the surface it is using:
/// the admin panel acts as `Admin`, the courier view as `Courier`, the
/// listing dashboard as `Seller`, and the storefront as `Buyer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Buyer,
    Seller,
    Courier,
    Admin,
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => f.write_str("buyer"),
            Self::Seller => f.write_str("seller"),
            Self::Courier => f.write_str("courier"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// Capability set resolved from a profile's role flags.
///
/// Every authenticated user is implicitly a buyer; the flags grant additional
/// surfaces on top of that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleSet {
    pub seller: bool,
    pub admin: bool,
    pub delivery: bool,
}

impl RoleSet {
    /// Build a capability set from profile role flags.
    #[must_use]
    pub const fn from_flags(is_seller: bool, is_admin: bool, is_delivery: bool) -> Self {
        Self {
            seller: is_seller,
            admin: is_admin,
            delivery: is_delivery,
        }
    }

    /// A plain buyer with no extra capabilities.
    #[must_use]
    pub const fn buyer() -> Self {
        Self {
            seller: false,
            admin: false,
            delivery: false,
        }
    }

    /// Whether this user may act under the given actor role.
    #[must_use]
    pub const fn permits(self, actor: Actor) -> bool {
        match actor {
            Actor::Buyer => true,
            Actor::Seller => self.seller,
            Actor::Courier => self.delivery,
            Actor::Admin => self.admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_buyer_permits_only_buyer() {
        let roles = RoleSet::buyer();
        assert!(roles.permits(Actor::Buyer));
        assert!(!roles.permits(Actor::Seller));
        assert!(!roles.permits(Actor::Courier));
        assert!(!roles.permits(Actor::Admin));
    }

    #[test]
    fn test_flags_grant_capabilities() {
        let roles = RoleSet::from_flags(false, true, false);
        assert!(roles.permits(Actor::Admin));
        assert!(!roles.permits(Actor::Courier));

        let roles = RoleSet::from_flags(false, false, true);
        assert!(roles.permits(Actor::Courier));
        assert!(!roles.permits(Actor::Admin));

        let roles = RoleSet::from_flags(true, false, false);
        assert!(roles.permits(Actor::Seller));
        assert!(!roles.permits(Actor::Courier));
    }

    #[test]
    fn test_roles_combine() {
        // Flags are not mutually exclusive: one account can hold all three.
        let roles = RoleSet::from_flags(true, true, true);
        assert!(roles.seller);
        assert!(roles.permits(Actor::Buyer));
        assert!(roles.permits(Actor::Courier));
        assert!(roles.permits(Actor::Admin));
    }
}
