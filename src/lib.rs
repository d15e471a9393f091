pub mod config;
pub mod db;
pub mod error;

pub use config::BootstrapConfig;
pub use db::{BootstrapReport, SchemaBootstrap};
pub use error::InitError;
