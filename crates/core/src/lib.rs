//! Trego Core - Shared types library.
//!
//! This crate provides common types used across all Trego components:
//! - `api` - REST API backend for the delivery-management dashboard
//! - `cli` - Command-line tools for bootstrapping and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
