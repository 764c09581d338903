use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderList, OrderSummary},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Order, PaymentResult},
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_orders).post(create_order))
        .route("/mine", get(list_my_orders))
        .route("/summary", get(order_summary))
        .route("/{id}", get(get_order).delete(delete_order))
        .route("/{id}/pay", put(pay_order))
        .route("/{id}/deliver", put(deliver_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created from the cart snapshot", body = ApiResponse<Order>),
        (status = 400, description = "Cart is empty")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Every order", body = ApiResponse<OrderList>),
        (status = 403, description = "Invalid Admin Token")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_all(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/mine",
    responses(
        (status = 200, description = "Orders of the caller", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_mine(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/summary",
    responses(
        (status = 200, description = "Sales summary", body = ApiResponse<OrderSummary>),
        (status = 403, description = "Invalid Admin Token")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn order_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderSummary>>> {
    let resp = order_service::summary(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Get order", body = ApiResponse<Order>),
        (status = 404, description = "Order Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/pay",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = PaymentResult,
    responses(
        (status = 200, description = "Order marked paid", body = ApiResponse<Order>),
        (status = 400, description = "Order already paid"),
        (status = 404, description = "Order Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn pay_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payment): Json<PaymentResult>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::mark_paid(&state, &user, id, payment).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/deliver",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order marked delivered", body = ApiResponse<Order>),
        (status = 400, description = "Order already delivered"),
        (status = 404, description = "Order Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn deliver_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::mark_delivered(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Order Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, &user, id).await?;
    Ok(Json(resp))
}
