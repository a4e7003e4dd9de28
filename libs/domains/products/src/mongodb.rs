//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{FindOptions, IndexOptions},
    Collection, Database, IndexModel,
};
use tracing::instrument;

use crate::error::ProductResult;
use crate::models::{DeleteOutcome, Page, PageQuery, Product, ProductLookup, UpdateOutcome, UpdateProduct};
use crate::query::sort_document;
use crate::repository::ProductRepository;

pub const DEFAULT_COLLECTION: &str = "products";

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    /// Create a new MongoProductRepository
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    /// Create a new MongoProductRepository with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Product>(collection_name);
        Self { collection }
    }

    /// Initialize indexes for listing and code lookups.
    ///
    /// The code index is not unique: uniqueness is checked before writes.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "code": 1 })
                .options(IndexOptions::builder().name("idx_code".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1, "price": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category_price".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Product> {
        &self.collection
    }

    fn find_options(query: &PageQuery) -> FindOptions {
        let limit = query.effective_limit();
        FindOptions::builder()
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .skip(query.skip())
            .sort(sort_document(query.sort.as_deref()))
            .build()
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self))]
    async fn paginate(&self, query: PageQuery) -> ProductResult<Page<Product>> {
        let filter = query.filters.to_document();

        let total_docs = self.collection.count_documents(filter.clone()).await?;
        let cursor = self
            .collection
            .find(filter)
            .with_options(Self::find_options(&query))
            .await?;
        let docs: Vec<Product> = cursor.try_collect().await?;

        Ok(Page::new(
            docs,
            total_docs,
            query.effective_limit(),
            query.effective_page(),
        ))
    }

    #[instrument(skip(self))]
    async fn find_one(&self, lookup: ProductLookup) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(lookup.to_document()).await?;
        Ok(product)
    }

    #[instrument(skip(self, product), fields(product_code = %product.code))]
    async fn create(&self, product: Product) -> ProductResult<Product> {
        self.collection.insert_one(&product).await?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: ObjectId, changes: UpdateProduct) -> ProductResult<UpdateOutcome> {
        let set = changes.to_set_document();
        if set.is_empty() {
            tracing::debug!(product_id = %id, "Empty update, nothing to apply");
            return Ok(UpdateOutcome::default());
        }

        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;

        tracing::info!(
            product_id = %id,
            matched = result.matched_count,
            modified = result.modified_count,
            "Product updated"
        );
        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> ProductResult<DeleteOutcome> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count > 0 {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }
}
