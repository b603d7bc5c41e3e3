//! User profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::{Email, ProfileId, RoleSet};

/// A marketplace account.
///
/// Every profile can buy; the role flags in [`RoleSet`] grant the seller,
/// courier and admin surfaces on top of that. The password hash lives in a
/// separate `profile_passwords` table and is never part of this model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub email: Email,
    pub full_name: String,
    pub phone: Option<String>,
    /// Default delivery address, prefilled at checkout.
    pub address: Option<String>,
    /// Optional Plus Code supplementing the street address.
    pub address_code: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub roles: RoleSet,
    /// Storefront branding, only meaningful when `roles.seller` is set.
    pub shop_name: Option<String>,
    pub shop_description: Option<String>,
    pub shop_logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
