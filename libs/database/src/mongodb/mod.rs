//! MongoDB connector and utilities
//!
//! Provides connection management and MongoDB-specific helpers.

mod config;
mod connector;
mod health;

pub use config::MongoConfig;
pub use connector::{MongoError, client_options, connect, connect_with_retry};
pub use health::{check_health, ping};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
