//! Domain models for the marketplace.

pub mod catalog;
pub mod order;
pub mod profile;
pub mod review;
pub mod session;

pub use catalog::{Category, Product, slugify};
pub use order::{Order, OrderItem, OrderWithItems};
pub use profile::Profile;
pub use review::Review;
pub use session::CurrentUser;
pub use session::keys as session_keys;
