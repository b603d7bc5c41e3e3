//! Integration tests for Mercado.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mercado-integration-tests
//! ```
//!
//! These tests exercise the domain flows end to end at the logic level,
//! crossing the crate boundary between `mercado-core` (lifecycle rules,
//! role gating) and `mercado-server` (cart, checkout, models) without a
//! running database.

pub mod fixtures;
