//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring stored documents
//! - `schema.rs`: static collection/index declarations
//! - `mongo.rs`: idempotent bootstrap operations against a live database

pub mod models;
pub mod mongo;
pub mod schema;

pub use models::DEFAULT_CLIENT_ID;
pub use mongo::{BootstrapReport, SchemaBootstrap, SchemaReport};
pub use schema::{COLLECTIONS, INDEXES, IndexSpec};
