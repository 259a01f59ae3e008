//! Integration tests for Trego.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the API against the in-memory backend
//! STORE_BACKEND=memory cargo run -p trego-api
//!
//! # Run integration tests against it
//! cargo test -p trego-integration-tests -- --ignored
//! ```
//!
//! The tests live in `tests/` and are `#[ignore]`d by default so `cargo
//! test` stays hermetic; they need a reachable server at `TREGO_API_URL`
//! (default `http://localhost:5000`).
