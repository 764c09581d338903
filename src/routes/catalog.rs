//! Catalog endpoints, mounted once per [`CatalogKind`] under `/api/products`,
//! `/api/flowers` and `/api/packings`.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::catalog::{
        CatalogItemList, CreateReviewRequest, ItemWithReviews, ReviewCreated,
        UpdateCatalogItemRequest,
    },
    error::AppResult,
    kind::CatalogKind,
    middleware::auth::AuthUser,
    models::CatalogItem,
    response::ApiResponse,
    routes::params::{Pagination, SearchQuery},
    services::{catalog_service, review_service},
    state::AppState,
};

pub fn router(kind: CatalogKind) -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/admin", get(list_paged))
        .route("/search", get(search_items))
        .route("/slug/{slug}", get(get_by_slug))
        .route(
            "/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/{id}/reviews", post(create_review))
        .layer(Extension(kind))
}

#[utoipa::path(
    get,
    path = "/api/{kind}",
    params(("kind" = String, Path, description = "products | flowers | packings")),
    responses(
        (status = 200, description = "Every item of the kind", body = ApiResponse<CatalogItemList>)
    ),
    tag = "Catalog"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Extension(kind): Extension<CatalogKind>,
) -> AppResult<Json<ApiResponse<CatalogItemList>>> {
    let resp = catalog_service::list_items(&state, kind).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/{kind}/admin",
    params(
        ("kind" = String, Path, description = "products | flowers | packings"),
        Pagination
    ),
    responses(
        (status = 200, description = "One page of items", body = ApiResponse<CatalogItemList>),
        (status = 401, description = "No Token"),
        (status = 403, description = "Invalid Admin Token")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_paged(
    State(state): State<AppState>,
    Extension(kind): Extension<CatalogKind>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CatalogItemList>>> {
    let resp = catalog_service::list_paged(&state, &user, kind, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/{kind}/search",
    params(
        ("kind" = String, Path, description = "products | flowers | packings"),
        SearchQuery
    ),
    responses(
        (status = 200, description = "Filtered, sorted page of items", body = ApiResponse<CatalogItemList>)
    ),
    tag = "Catalog"
)]
pub async fn search_items(
    State(state): State<AppState>,
    Extension(kind): Extension<CatalogKind>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<CatalogItemList>>> {
    let resp = catalog_service::search(&state, kind, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/{kind}/slug/{slug}",
    params(
        ("kind" = String, Path, description = "products | flowers | packings"),
        ("slug" = String, Path, description = "Item slug")
    ),
    responses(
        (status = 200, description = "Item with its reviews", body = ApiResponse<ItemWithReviews>),
        (status = 404, description = "Item not found")
    ),
    tag = "Catalog"
)]
pub async fn get_by_slug(
    State(state): State<AppState>,
    Extension(kind): Extension<CatalogKind>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ItemWithReviews>>> {
    let resp = catalog_service::get_by_slug(&state, kind, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "products | flowers | packings"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Get item", body = ApiResponse<CatalogItem>),
        (status = 404, description = "Item not found")
    ),
    tag = "Catalog"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Extension(kind): Extension<CatalogKind>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CatalogItem>>> {
    let resp = catalog_service::get_by_id(&state, kind, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/{kind}",
    params(("kind" = String, Path, description = "products | flowers | packings")),
    responses(
        (status = 201, description = "Placeholder item created", body = ApiResponse<CatalogItem>),
        (status = 403, description = "Invalid Admin Token")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_item(
    State(state): State<AppState>,
    Extension(kind): Extension<CatalogKind>,
    user: AuthUser,
) -> AppResult<(StatusCode, Json<ApiResponse<CatalogItem>>)> {
    let resp = catalog_service::create_item(&state, &user, kind).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "products | flowers | packings"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = UpdateCatalogItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<CatalogItem>),
        (status = 400, description = "Invalid field value"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Slug or name already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Extension(kind): Extension<CatalogKind>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCatalogItemRequest>,
) -> AppResult<Json<ApiResponse<CatalogItem>>> {
    let resp = catalog_service::update_item(&state, &user, kind, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "products | flowers | packings"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item deleted"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(kind): Extension<CatalogKind>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalog_service::delete_item(&state, &user, kind, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/{kind}/{id}/reviews",
    params(
        ("kind" = String, Path, description = "products | flowers | packings"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = ApiResponse<ReviewCreated>),
        (status = 400, description = "Invalid rating or duplicate author"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_review(
    State(state): State<AppState>,
    Extension(kind): Extension<CatalogKind>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ReviewCreated>>)> {
    let resp = review_service::submit_review(&state, &user, kind, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
