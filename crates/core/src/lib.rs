//! Mercado Core - Shared types library.
//!
//! This crate provides common types used across all Mercado components:
//! - `server` - Marketplace HTTP API (buyers, sellers, couriers, admin)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, statuses and roles
//! - [`lifecycle`] - Order status transition table and payment review rules
//! - [`plus_code`] - Plus Code (Open Location Code) validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod lifecycle;
pub mod plus_code;
pub mod types;

pub use types::*;
