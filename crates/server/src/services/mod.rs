//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Email/password registration and login (argon2)
//! - `cart` - Cart value type and its mutation rules
//! - `checkout` - Cart-to-order conversion
//! - `storage` - Object storage client for uploaded images

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod storage;
