//! Products Domain
//!
//! This module provides a complete domain implementation for managing products using MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, code uniqueness, broadcast
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! Successful creates and deletes push the first page of the catalogue to
//! WebSocket subscribers through the [`realtime::EventBroadcaster`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_products::{
//!     handlers,
//!     mongodb::MongoProductRepository,
//!     realtime::{self, ChannelBroadcaster},
//!     service::ProductService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a MongoDB client
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("mydb");
//!
//! // Create a repository, a broadcaster and the service
//! let repository = MongoProductRepository::new(&db);
//! let broadcaster = Arc::new(ChannelBroadcaster::default());
//! let service = ProductService::new(repository, broadcaster.clone());
//!
//! // Create Axum routers
//! let products = handlers::router(service);
//! let ws = realtime::router(broadcaster);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod query;
pub mod realtime;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{ProductError, ProductResult, StatusMode};
pub use handlers::ApiDoc;
pub use models::{
    CreateProduct, DeleteOutcome, Page, PageQuery, PayloadBody, Product, ProductBody,
    ProductLookup, ProductResponse, UpdateOutcome, UpdateProduct,
};
pub use mongodb::MongoProductRepository;
pub use query::ListFilters;
pub use realtime::{ChannelBroadcaster, EventBroadcaster, ProductEvent};
pub use repository::ProductRepository;
pub use service::ProductService;
