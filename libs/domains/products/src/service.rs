//! Product Service - Business logic layer

use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{
    ProductError, ProductResult, StatusMode, INVALID_ID_LOOKUP, INVALID_ID_MUTATION,
};
use crate::models::{
    CreateProduct, Page, PageQuery, ProductLookup, ProductResponse, UpdateOutcome, UpdateProduct,
};
use crate::realtime::{BroadcastError, EventBroadcaster, ProductEvent};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// Validates identifiers and required fields, enforces code uniqueness,
/// delegates persistence to the repository and pushes the fresh listing
/// to realtime subscribers after a create or delete.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    broadcaster: Arc<dyn EventBroadcaster>,
    status_mode: StatusMode,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository and broadcaster
    pub fn new(repository: R, broadcaster: Arc<dyn EventBroadcaster>) -> Self {
        Self {
            repository: Arc::new(repository),
            broadcaster,
            status_mode: StatusMode::default(),
        }
    }

    pub fn with_status_mode(mut self, status_mode: StatusMode) -> Self {
        self.status_mode = status_mode;
        self
    }

    pub fn status_mode(&self) -> StatusMode {
        self.status_mode
    }

    /// List products page by page
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: PageQuery) -> ProductResult<Page<ProductResponse>> {
        self.repository
            .paginate(query)
            .await
            .map(|page| page.map(ProductResponse::from))
            .map_err(|e| ProductError::List(e.into_cause()))
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> ProductResult<ProductResponse> {
        let oid = parse_id(id, INVALID_ID_LOOKUP)?;

        match self.repository.find_one(ProductLookup::Id(oid)).await {
            Ok(Some(product)) => Ok(product.into()),
            Ok(None) => Err(ProductError::Missing),
            Err(e) => {
                tracing::warn!(product_id = %id, error = %e, "Product lookup failed");
                Err(ProductError::Fetch(id.to_string()))
            }
        }
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(product_code = ?input.code))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<ProductResponse> {
        let unfilled = input.unfilled_fields();
        let Some(product) = input.into_product() else {
            return Err(ProductError::UnfilledFields(unfilled));
        };

        self.ensure_code_free(&product.code, ProductError::DuplicateCode)
            .await?;

        let created = self
            .repository
            .create(product)
            .await
            .map_err(|e| ProductError::CreateFailed(e.into_cause()))?;

        self.notify(ProductEvent::UpdateProducts).await;
        Ok(created.into())
    }

    /// Apply a partial update.
    ///
    /// A new code is checked against every stored product, including the
    /// one being updated.
    #[instrument(skip(self, changes))]
    pub async fn update_product(
        &self,
        id: &str,
        changes: UpdateProduct,
    ) -> ProductResult<UpdateOutcome> {
        let oid = parse_id(id, INVALID_ID_MUTATION)?;

        if let Some(code) = changes.code() {
            self.ensure_code_free(code, ProductError::CodeTaken).await?;
        }

        self.repository
            .update(oid, changes)
            .await
            .map_err(|e| ProductError::UpdateFailed(e.into_cause()))
    }

    /// Delete a product by ID
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> ProductResult<()> {
        let oid = parse_id(id, INVALID_ID_MUTATION)?;

        let outcome = self
            .repository
            .delete(oid)
            .await
            .map_err(|e| ProductError::DeleteFailed {
                id: id.to_string(),
                cause: e.into_cause(),
            })?;

        if outcome.deleted_count == 0 {
            return Err(ProductError::NotFound(id.to_string()));
        }

        self.notify(ProductEvent::DeleteProducts).await;
        Ok(())
    }

    async fn ensure_code_free(
        &self,
        code: &str,
        conflict: fn(String) -> ProductError,
    ) -> ProductResult<()> {
        match self
            .repository
            .find_one(ProductLookup::Code(code.to_string()))
            .await
        {
            Ok(None) => Ok(()),
            Ok(Some(_)) => Err(conflict(code.to_string())),
            Err(e) => Err(ProductError::CodeLookup(e.into_cause())),
        }
    }

    /// Push the first page of the catalogue to subscribers.
    ///
    /// Failures are logged and never reach the caller.
    async fn notify(&self, event: ProductEvent) {
        let page = match self.repository.paginate(PageQuery::default()).await {
            Ok(page) => page.map(ProductResponse::from),
            Err(e) => {
                tracing::warn!(event = %event, error = %e, "Failed to load listing for broadcast");
                return;
            }
        };

        let payload = match serde_json::to_value(&page) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(event = %event, error = %e, "Failed to encode listing for broadcast");
                return;
            }
        };

        match self.broadcaster.emit(event, payload) {
            Ok(reached) => tracing::debug!(event = %event, subscribers = reached, "Broadcast sent"),
            Err(BroadcastError::NoListeners) => {
                tracing::debug!(event = %event, "No realtime subscribers connected")
            }
            Err(e) => tracing::warn!(event = %event, error = %e, "Broadcast failed"),
        }
    }
}

fn parse_id(id: &str, message: &'static str) -> ProductResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| ProductError::InvalidId {
        id: id.to_string(),
        message,
    })
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            broadcaster: Arc::clone(&self.broadcaster),
            status_mode: self.status_mode,
        }
    }
}
