use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::query::ListFilters;

/// Product entity - represents a product stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    /// Product code, unique across the catalogue
    pub code: String,
    pub price: f64,
    #[serde(default = "default_status")]
    pub status: bool,
    pub stock: i64,
    pub category: String,
    /// Ordered image references
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

/// Product as returned over HTTP and pushed to realtime subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    /// Hex encoded ObjectId
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub code: String,
    pub price: f64,
    pub status: bool,
    pub stock: i64,
    pub category: String,
    pub thumbnails: Vec<String>,
}

/// Request body for creating a product.
///
/// Every field is optional at the wire level so that missing values can be
/// reported as a single "unfilled fields" answer instead of a decode error.
///
/// Scalars are read leniently: numeric strings count as numbers, and blank
/// or unreadable values count as unfilled.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct CreateProduct {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub status: Option<bool>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub stock: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

/// Partial update of a product.
///
/// Has no identifier field, so an `_id` in the request body is dropped
/// during deserialization and never reaches the repository. Scalars that
/// cannot be read as their type are left out of the update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct UpdateProduct {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub status: Option<bool>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub stock: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: Option<String>,
    pub thumbnails: Option<Vec<String>>,
}

/// Point lookup accepted by the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductLookup {
    Id(ObjectId),
    Code(String),
}

/// Listing request handed to the repository.
///
/// `PageQuery::default()` means "no limit, page, sort or filters supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub page: Option<u64>,
    pub sort: Option<String>,
    pub filters: ListFilters,
}

/// One page of results plus paging metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub page: u64,
    /// 1-based index of the first document of this page
    pub paging_counter: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
}

/// Result of a partial update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Result of a delete by id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// `{ "product": ... }` body of a successful lookup
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductBody {
    pub product: ProductResponse,
}

/// `{ "payload": "..." }` body of a successful create or delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayloadBody {
    pub payload: String,
}

pub const DEFAULT_LIMIT: u64 = 10;
pub const DEFAULT_PAGE: u64 = 1;

/// Decoders for loosely typed request bodies.
///
/// Clients post form-style JSON (`"price": "10"`). A value that cannot be
/// read as the field's type decodes to `None`.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    // Integers beyond this lose precision as f64.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    fn whole(value: f64) -> Option<i64> {
        (value.fract() == 0.0 && value.abs() <= MAX_EXACT).then_some(value as i64)
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(value.filter(|v| v.is_finite()))
    }

    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole))
            }
            _ => None,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => Some(b),
            Value::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            _ => None,
        })
    }
}

fn default_status() -> bool {
    true
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl CreateProduct {
    /// Names of required fields that are missing, empty or zero
    pub fn unfilled_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !filled(&self.title) {
            missing.push("title");
        }
        if !filled(&self.description) {
            missing.push("description");
        }
        if !filled(&self.code) {
            missing.push("code");
        }
        if !self.price.is_some_and(|p| p != 0.0 && !p.is_nan()) {
            missing.push("price");
        }
        if !self.stock.is_some_and(|s| s != 0) {
            missing.push("stock");
        }
        if !filled(&self.category) {
            missing.push("category");
        }
        missing
    }

    /// Build the entity to insert. Returns `None` when a required field is unfilled.
    pub fn into_product(self) -> Option<Product> {
        if !self.unfilled_fields().is_empty() {
            return None;
        }
        Some(Product {
            id: ObjectId::new(),
            title: self.title?,
            description: self.description?,
            code: self.code?,
            price: self.price?,
            status: self.status.unwrap_or_else(default_status),
            stock: self.stock?,
            category: self.category?,
            thumbnails: self.thumbnails,
        })
    }
}

impl UpdateProduct {
    /// The new code, if the update carries a non-empty one
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.to_set_document().is_empty()
    }

    /// Fields to `$set`; absent fields are left untouched
    pub fn to_set_document(&self) -> Document {
        let mut set = doc! {};
        if let Some(ref title) = self.title {
            set.insert("title", title.as_str());
        }
        if let Some(ref description) = self.description {
            set.insert("description", description.as_str());
        }
        if let Some(ref code) = self.code {
            set.insert("code", code.as_str());
        }
        if let Some(price) = self.price {
            set.insert("price", price);
        }
        if let Some(status) = self.status {
            set.insert("status", status);
        }
        if let Some(stock) = self.stock {
            set.insert("stock", stock);
        }
        if let Some(ref category) = self.category {
            set.insert("category", category.as_str());
        }
        if let Some(ref thumbnails) = self.thumbnails {
            let refs: Vec<Bson> = thumbnails.iter().cloned().map(Bson::String).collect();
            set.insert("thumbnails", refs);
        }
        set
    }
}

impl ProductLookup {
    pub fn to_document(&self) -> Document {
        match self {
            ProductLookup::Id(id) => doc! { "_id": *id },
            ProductLookup::Code(code) => doc! { "code": code.as_str() },
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_hex(),
            title: product.title,
            description: product.description,
            code: product.code,
            price: product.price,
            status: product.status,
            stock: product.stock,
            category: product.category,
            thumbnails: product.thumbnails,
        }
    }
}

impl PageQuery {
    /// Effective page size, never zero
    pub fn effective_limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).max(1)
    }

    /// Effective 1-based page number
    pub fn effective_page(&self) -> u64 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    /// Documents to skip before the requested page
    pub fn skip(&self) -> u64 {
        (self.effective_page() - 1).saturating_mul(self.effective_limit())
    }
}

impl<T> Page<T> {
    /// Build a page and derive the paging metadata from the totals
    pub fn new(docs: Vec<T>, total_docs: u64, limit: u64, page: u64) -> Self {
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = total_docs.div_ceil(limit).max(1);
        let has_prev_page = page > 1;
        let has_next_page = page < total_pages;

        Self {
            docs,
            total_docs,
            limit,
            total_pages,
            page,
            paging_counter: (page - 1) * limit + 1,
            has_prev_page,
            has_next_page,
            prev_page: has_prev_page.then(|| page - 1),
            next_page: has_next_page.then(|| page + 1),
        }
    }

    /// Convert the documents while keeping the paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            docs: self.docs.into_iter().map(f).collect(),
            total_docs: self.total_docs,
            limit: self.limit,
            total_pages: self.total_pages,
            page: self.page,
            paging_counter: self.paging_counter,
            has_prev_page: self.has_prev_page,
            has_next_page: self.has_next_page,
            prev_page: self.prev_page,
            next_page: self.next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_input() -> CreateProduct {
        CreateProduct {
            title: Some("Keyboard".to_string()),
            description: Some("Mechanical keyboard".to_string()),
            code: Some("KB-01".to_string()),
            price: Some(120.5),
            status: None,
            stock: Some(7),
            category: Some("peripherals".to_string()),
            thumbnails: vec![],
        }
    }

    #[test]
    fn test_complete_input_has_no_unfilled_fields() {
        assert!(complete_input().unfilled_fields().is_empty());
    }

    #[test]
    fn test_empty_strings_and_zero_numbers_are_unfilled() {
        let input = CreateProduct {
            title: Some(String::new()),
            price: Some(0.0),
            stock: Some(0),
            ..complete_input()
        };
        assert_eq!(input.unfilled_fields(), vec!["title", "price", "stock"]);
    }

    #[test]
    fn test_status_and_thumbnails_are_optional() {
        let product = complete_input().into_product().unwrap();
        assert!(product.status);
        assert!(product.thumbnails.is_empty());
        assert_eq!(product.code, "KB-01");
    }

    #[test]
    fn test_into_product_rejects_unfilled_input() {
        let input = CreateProduct {
            category: None,
            ..complete_input()
        };
        assert!(input.into_product().is_none());
    }

    #[test]
    fn test_update_set_document_only_has_supplied_fields() {
        let update = UpdateProduct {
            price: Some(99.0),
            thumbnails: Some(vec!["a.png".to_string()]),
            ..Default::default()
        };
        let set = update.to_set_document();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_f64("price").unwrap(), 99.0);
        assert!(!set.contains_key("_id"));
    }

    #[test]
    fn test_update_ignores_identifier_in_body() {
        let update: UpdateProduct = serde_json::from_value(serde_json::json!({
            "_id": "60f1b2c3d4e5f6a7b8c9d0e1",
            "title": "Renamed"
        }))
        .unwrap();
        let set = update.to_set_document();
        assert!(!set.contains_key("_id"));
        assert_eq!(set.get_str("title").unwrap(), "Renamed");
    }

    #[test]
    fn test_create_reads_form_style_numbers() {
        let input: CreateProduct = serde_json::from_value(serde_json::json!({
            "title": "Pen",
            "description": "Blue ink",
            "code": 42,
            "price": "10",
            "stock": " 3 ",
            "status": "false",
            "category": "office"
        }))
        .unwrap();

        assert!(input.unfilled_fields().is_empty());
        let product = input.into_product().unwrap();
        assert_eq!(product.price, 10.0);
        assert_eq!(product.stock, 3);
        assert_eq!(product.code, "42");
        assert!(!product.status);
    }

    #[test]
    fn test_create_falsy_and_unreadable_values_are_unfilled() {
        let input: CreateProduct = serde_json::from_value(serde_json::json!({
            "title": "Pen",
            "description": null,
            "price": "cheap",
            "stock": "",
            "category": false
        }))
        .unwrap();

        assert_eq!(
            input.unfilled_fields(),
            vec!["description", "code", "price", "stock", "category"]
        );
    }

    #[test]
    fn test_create_fractional_stock_is_unfilled() {
        let input: CreateProduct =
            serde_json::from_value(serde_json::json!({ "stock": 2.5, "price": 0 })).unwrap();
        assert_eq!(input.stock, None);
        assert_eq!(input.price, Some(0.0));
    }

    #[test]
    fn test_update_skips_unreadable_scalars() {
        let update: UpdateProduct = serde_json::from_value(serde_json::json!({
            "price": "12.5",
            "stock": "many",
            "status": 1
        }))
        .unwrap();
        let set = update.to_set_document();

        assert_eq!(set.get_f64("price").unwrap(), 12.5);
        assert!(!set.contains_key("stock"));
        assert!(set.get_bool("status").unwrap());
    }

    #[test]
    fn test_update_empty_code_is_not_a_code_change() {
        let update = UpdateProduct {
            code: Some(String::new()),
            ..Default::default()
        };
        assert!(update.code().is_none());
    }

    #[test]
    fn test_page_metadata_middle_page() {
        let page = Page::new(vec![1, 2, 3], 25, 10, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.paging_counter, 11);
        assert_eq!(page.prev_page, Some(1));
        assert_eq!(page.next_page, Some(3));
        assert!(page.has_prev_page && page.has_next_page);
    }

    #[test]
    fn test_page_metadata_empty_collection() {
        let page: Page<u8> = Page::new(vec![], 0, 10, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next_page);
        assert!(!page.has_prev_page);
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn test_page_query_defaults_and_skip() {
        let query = PageQuery::default();
        assert_eq!(query.effective_limit(), DEFAULT_LIMIT);
        assert_eq!(query.effective_page(), DEFAULT_PAGE);
        assert_eq!(query.skip(), 0);

        let query = PageQuery {
            limit: Some(5),
            page: Some(3),
            ..Default::default()
        };
        assert_eq!(query.skip(), 10);
    }

    #[test]
    fn test_product_response_uses_hex_id() {
        let product = complete_input().into_product().unwrap();
        let hex = product.id.to_hex();
        let response = ProductResponse::from(product);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["_id"], hex);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page: Page<u8> = Page::new(vec![], 0, 10, 1);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("totalDocs").is_some());
        assert!(json.get("hasNextPage").is_some());
    }
}
