//! SQLite storage implementation for twodo.
//!
//! This crate plays the hosted platform for the core crate. It implements the
//! repository traits defined in `twodo-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The server-side procedures (friend requests, boards, sort swaps), each
//!   run as one transaction on the writer actor
//! - Change publishing after commit, feeding the realtime hub
//!
//! # Architecture
//!
//! ```text
//!          core (domain, realtime)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate) ──► ChangeSink
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod profiles;
pub mod relationships;
pub mod tags;
pub mod tasks;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use errors::StorageError;

pub use profiles::ProfileRepository;
pub use relationships::RelationshipRepository;
pub use tags::TagRepository;
pub use tasks::TaskRepository;

// Re-export from twodo-core for convenience
pub use twodo_core::errors::{DatabaseError, Error, Result};
