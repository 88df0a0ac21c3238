//! twodo Core - Domain entities, services, and traits.
//!
//! This crate contains the task ordering, realtime reconciliation and
//! relationship logic for twodo. It is database-agnostic and defines the
//! platform traits that are implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod ordering;
pub mod profiles;
pub mod realtime;
pub mod relationships;
pub mod tags;
pub mod tasks;

// Re-export error types
pub use errors::Error;
pub use errors::ErrorKind;
pub use errors::Result;
