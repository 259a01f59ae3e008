//! Persisted documents and request payloads.
//!
//! Wire names are camelCase and match the stored documents exactly; these
//! types are the single source of truth for the field names the aggregate
//! updater and the dashboard both rely on (`totalDeliveries`, `totalSpent`,
//! `clientId`, ...).

pub mod client;
pub mod deliverer;
pub mod delivery;
pub mod user;

pub use client::{Client, NewClient, UpdateClient};
pub use deliverer::{Deliverer, NewDeliverer, UpdateDeliverer};
pub use delivery::{Delivery, NewDelivery, UpdateDelivery};
pub use user::{NewUser, UpdateProfile, User};
