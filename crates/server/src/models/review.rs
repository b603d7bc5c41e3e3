//! Product review model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::{ProductId, ProfileId, ReviewId};

/// A buyer review of a product.
///
/// One review per (product, buyer) pair; submitting again replaces the
/// earlier rating and comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub buyer_id: ProfileId,
    /// Reviewer display name, denormalized for listing.
    pub buyer_name: String,
    /// Star rating, 1 to 5.
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
