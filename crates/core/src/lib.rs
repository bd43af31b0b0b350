//! Éclat Core - Shared domain types library.
//!
//! This crate provides the catalog types used across all Éclat components:
//! - `catalog` - Dual-backend data access (remote table API or local storage)
//! - `storefront` - Public catalog API and admin back-office
//! - `cli` - Command-line tools for seeding and inspecting the catalog
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, roles and the catalog entities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
