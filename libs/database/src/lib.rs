//! Database connectors and startup utilities
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connection, readiness ping
//! - `config` - `core_config::FromEnv` for the connection settings
//!
//! # Example
//!
//! ```ignore
//! use database::common::RetryConfig;
//! use database::mongodb::{self, MongoConfig};
//! use core_config::FromEnv;
//!
//! let config = MongoConfig::from_env()?;
//! let client = mongodb::connect_with_retry(&config, &RetryConfig::default()).await?;
//! let db = client.database(&config.database);
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::RetryConfig;
