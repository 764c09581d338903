use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    cart::{CartLine, CheckoutTotals, compute_totals},
    dto::orders::{CreateOrderRequest, DailySales, OrderList, OrderSummary},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_owner_or_admin},
    models::{GeoPoint, Order, OrderItem, PaymentResult, ShippingAddress},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Persist a snapshot of the submitted cart. Stock is not decremented.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.order_items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    if payload.order_items.iter().any(|line| line.quantity == 0) {
        return Err(AppError::BadRequest("Cart has invalid quantity".into()));
    }

    let totals = resolve_totals(&payload);
    let now = Utc::now();
    let address = payload.shipping_address;
    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        shipping_full_name: Set(address.full_name),
        shipping_address: Set(address.address),
        shipping_city: Set(address.city),
        shipping_lat: Set(address.location.map(|geo| geo.lat)),
        shipping_lng: Set(address.location.map(|geo| geo.lng)),
        payment_method: Set(payload.payment_method),
        payment_result: Set(None),
        items_price: Set(totals.items_price),
        shipping_price: Set(totals.shipping_price),
        tax_price: Set(totals.tax_price),
        total_price: Set(totals.total_price),
        is_paid: Set(false),
        paid_at: Set(None),
        is_delivered: Set(false),
        delivered_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(payload.order_items.len());
    for (position, line) in payload.order_items.into_iter().enumerate() {
        let item = snapshot_line(order.id, position, line)?.insert(&txn).await?;
        items.push(item);
    }

    txn.commit().await?;

    tracing::info!(order_id = %order.id, user_id = %user.user_id, total = order.total_price, "order created");
    audit::record(
        &state.pool,
        user.user_id,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "New Order Created",
        order_from_parts(order, items),
        Some(Meta::empty()),
    ))
}

pub async fn mark_paid(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payment: PaymentResult,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(order_not_found)?;
    ensure_owner_or_admin(user, order.user_id)?;

    if order.is_paid {
        return Err(AppError::BadRequest("Order already paid".into()));
    }

    let payment_result =
        serde_json::to_value(&payment).map_err(|e| AppError::Internal(e.into()))?;
    let now = Utc::now();
    let mut active: OrderActive = order.into();
    active.is_paid = Set(true);
    active.paid_at = Set(Some(now.into()));
    active.payment_result = Set(Some(payment_result));
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_paid",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    let order = with_items(state, order).await?;
    Ok(ApiResponse::success("Order Paid", order, Some(Meta::empty())))
}

pub async fn mark_delivered(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(order_not_found)?;

    if order.is_delivered {
        return Err(AppError::BadRequest("Order already delivered".into()));
    }

    let now = Utc::now();
    let mut active: OrderActive = order.into();
    active.is_delivered = Set(true);
    active.delivered_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_delivered",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    let order = with_items(state, order).await?;
    Ok(ApiResponse::success("Order Delivered", order, Some(Meta::empty())))
}

pub async fn list_mine(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let rows = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .find_with_related(OrderItems)
        .all(&state.orm)
        .await?;
    Ok(order_list(rows))
}

pub async fn list_all(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let rows = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .find_with_related(OrderItems)
        .all(&state.orm)
        .await?;
    Ok(order_list(rows))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(order_not_found)?;
    ensure_owner_or_admin(user, order.user_id)?;

    let order = with_items(state, order).await?;
    Ok(ApiResponse::success("Order", order, Some(Meta::empty())))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(order_not_found)?;
    order.delete(&state.orm).await?;

    tracing::info!(order_id = %id, "order deleted");
    audit::record(
        &state.pool,
        user.user_id,
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Sales dashboard figures; the daily series is bucketed by UTC calendar day.
pub async fn summary(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderSummary>> {
    ensure_admin(user)?;

    let (total_orders, total_sales): (i64, f64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(total_price), 0)::DOUBLE PRECISION FROM orders",
    )
    .fetch_one(&state.pool)
    .await?;

    let (total_users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.pool)
        .await?;

    let daily_series = sqlx::query_as::<_, DailySales>(
        r#"
        SELECT to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS date,
               COUNT(*) AS orders,
               COALESCE(SUM(total_price), 0)::DOUBLE PRECISION AS sales
        FROM orders
        GROUP BY 1
        ORDER BY 1 ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Summary",
        OrderSummary {
            total_orders,
            total_sales,
            total_users,
            daily_series,
        },
        Some(Meta::empty()),
    ))
}

/// Client supplied prices are kept only when all four are present.
pub fn resolve_totals(payload: &CreateOrderRequest) -> CheckoutTotals {
    match (
        payload.items_price,
        payload.shipping_price,
        payload.tax_price,
        payload.total_price,
    ) {
        (Some(items_price), Some(shipping_price), Some(tax_price), Some(total_price)) => {
            CheckoutTotals {
                items_price,
                shipping_price,
                tax_price,
                total_price,
            }
        }
        _ => compute_totals(&payload.order_items),
    }
}

fn snapshot_line(order_id: Uuid, position: usize, line: CartLine) -> AppResult<OrderItemActive> {
    let too_large = || AppError::BadRequest("Cart has invalid quantity".into());
    let quantity = i32::try_from(line.quantity).map_err(|_| too_large())?;
    let bouquet_number = line
        .bouquet_number
        .map(i32::try_from)
        .transpose()
        .map_err(|_| too_large())?;
    let position = i32::try_from(position).map_err(|_| too_large())?;

    Ok(OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        position: Set(position),
        item_id: Set(line.item_id),
        kind: Set(line.kind),
        name: Set(line.name),
        slug: Set(line.slug),
        image: Set(line.image),
        price: Set(line.price),
        quantity: Set(quantity),
        bouquet_number: Set(bouquet_number),
    })
}

fn order_not_found() -> AppError {
    AppError::NotFound("Order Not Found".into())
}

fn order_list(rows: Vec<(OrderModel, Vec<OrderItemModel>)>) -> ApiResponse<OrderList> {
    let items: Vec<Order> = rows
        .into_iter()
        .map(|(order, items)| order_from_parts(order, items))
        .collect();
    let total = items.len() as i64;
    ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(1, total.max(1), total)),
    )
}

async fn with_items(state: &AppState, order: OrderModel) -> AppResult<Order> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?;
    Ok(order_from_parts(order, items))
}

fn order_from_parts(model: OrderModel, mut items: Vec<OrderItemModel>) -> Order {
    items.sort_by_key(|item| item.position);
    let location = match (model.shipping_lat, model.shipping_lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        _ => None,
    };
    let payment_result = model.payment_result.and_then(|raw| {
        serde_json::from_value(raw)
            .map_err(|err| tracing::warn!(order_id = %model.id, error = %err, "unreadable payment result"))
            .ok()
    });

    Order {
        id: model.id,
        user_id: model.user_id,
        order_items: items.into_iter().map(order_item_from_entity).collect(),
        shipping_address: ShippingAddress {
            full_name: model.shipping_full_name,
            address: model.shipping_address,
            city: model.shipping_city,
            location,
        },
        payment_method: model.payment_method,
        payment_result,
        items_price: model.items_price,
        shipping_price: model.shipping_price,
        tax_price: model.tax_price,
        total_price: model.total_price,
        is_paid: model.is_paid,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        is_delivered: model.is_delivered,
        delivered_at: model.delivered_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        product: model.item_id,
        kind: model.kind,
        name: model.name,
        slug: model.slug,
        image: model.image,
        price: model.price,
        quantity: model.quantity,
        bouquet_number: model.bouquet_number,
    }
}
