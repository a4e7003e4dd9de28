use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::ProductResult;
use crate::models::{DeleteOutcome, Page, PageQuery, Product, ProductLookup, UpdateOutcome, UpdateProduct};

/// Repository trait for Product persistence
///
/// This trait defines the data access interface for products.
/// Implementations can use different storage backends (MongoDB, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List products page by page, with optional sort and filters
    async fn paginate(&self, query: PageQuery) -> ProductResult<Page<Product>>;

    /// Find the first product matching a lookup
    async fn find_one(&self, lookup: ProductLookup) -> ProductResult<Option<Product>>;

    /// Insert a new product
    async fn create(&self, product: Product) -> ProductResult<Product>;

    /// Apply a partial update
    async fn update(&self, id: ObjectId, changes: UpdateProduct) -> ProductResult<UpdateOutcome>;

    /// Delete a product by ID
    async fn delete(&self, id: ObjectId) -> ProductResult<DeleteOutcome>;
}
