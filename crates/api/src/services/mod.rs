//! Domain services shared by the route handlers.

pub mod aggregates;

pub use aggregates::AggregateUpdater;
