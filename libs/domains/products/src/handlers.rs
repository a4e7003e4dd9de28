//! HTTP handlers for Products API

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::OpenApi;

use axum_helpers::{ErrorResponse, JsonBody};

use crate::error::{ProductResult, StatusMode};
use crate::models::{
    CreateProduct, Page, PageQuery, PayloadBody, ProductBody, ProductResponse, UpdateOutcome,
    UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(
            ProductResponse, CreateProduct, UpdateProduct, UpdateOutcome,
            ProductBody, PayloadBody, ErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalogue endpoints")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{pid}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

fn respond<T: Serialize>(mode: StatusMode, result: ProductResult<T>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response_with(mode),
    }
}

/// List products page by page
///
/// Every query key other than `limit`, `page` and `sort` is a filter:
/// `field=value` for equality, `field[gt|gte|lt|lte|ne]=value` for ranges.
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(
        ("limit" = Option<u64>, Query, description = "Page size, defaults to 10"),
        ("page" = Option<u64>, Query, description = "1-based page number, defaults to 1"),
        ("sort" = Option<String>, Query, description = "`asc`/`desc` by price, or `field`/`-field`"),
    ),
    responses(
        (status = 200, description = "One page of products", body = Page<ProductResponse>),
        (status = 400, description = "Invalid query or listing failure", body = ErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let result = match PageQuery::from_params(params) {
        Ok(query) => service.list_products(query).await,
        Err(e) => Err(e),
    };
    respond(service.status_mode(), result)
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 200, description = "Product added, or `error` when required fields are unfilled", body = PayloadBody),
        (status = 300, description = "Insert failed", body = ErrorResponse),
        (status = 400, description = "Code already registered", body = ErrorResponse),
        (status = 500, description = "Code lookup failed", body = ErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    JsonBody(input): JsonBody<CreateProduct>,
) -> Response {
    let result = service.create_product(input).await.map(|_| PayloadBody {
        payload: "Product added".to_string(),
    });
    respond(service.status_mode(), result)
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{pid}",
    tag = "Products",
    params(
        ("pid" = String, Path, description = "Product ObjectId (24 hex digits)")
    ),
    responses(
        (status = 200, description = "Product found, or `error` when it does not exist", body = ProductBody),
        (status = 400, description = "Invalid id or lookup failure", body = ErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(pid): Path<String>,
) -> Response {
    let result = service
        .get_product(&pid)
        .await
        .map(|product| ProductBody { product });
    respond(service.status_mode(), result)
}

/// Update a product
#[utoipa::path(
    put,
    path = "/{pid}",
    tag = "Products",
    params(
        ("pid" = String, Path, description = "Product ObjectId (24 hex digits)")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Update applied", body = UpdateOutcome),
        (status = 300, description = "Update failed", body = ErrorResponse),
        (status = 400, description = "Invalid id or code already taken", body = ErrorResponse),
        (status = 500, description = "Code lookup failed", body = ErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(pid): Path<String>,
    JsonBody(changes): JsonBody<UpdateProduct>,
) -> Response {
    let result = service.update_product(&pid, changes).await;
    respond(service.status_mode(), result)
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{pid}",
    tag = "Products",
    params(
        ("pid" = String, Path, description = "Product ObjectId (24 hex digits)")
    ),
    responses(
        (status = 200, description = "Product deleted", body = PayloadBody),
        (status = 300, description = "Delete failed", body = ErrorResponse),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Product does not exist", body = ErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(pid): Path<String>,
) -> Response {
    let result = service.delete_product(&pid).await.map(|()| PayloadBody {
        payload: format!("Product {} deleted", pid),
    });
    respond(service.status_mode(), result)
}
