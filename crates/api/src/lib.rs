//! Trego API library.
//!
//! This crate provides the delivery-management backend as a library so the
//! CLI and integration tests can reuse the store, identity, and aggregation
//! code paths without going through HTTP.
//!
//! # Modules
//!
//! - [`config`] - Environment-based configuration
//! - [`store`] - Record store clients (managed document database + in-memory)
//! - [`identity`] - Identity service clients (token verification, user admin)
//! - [`models`] - Persisted documents and request payloads
//! - [`services`] - The delivery aggregation updater
//! - [`routes`] - HTTP route handlers
//! - [`middleware`] - Authentication extractors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
