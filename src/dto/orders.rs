use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    cart::CartLine,
    models::{Order, ShippingAddress},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_items: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    /// When any of the four prices is missing the server computes all of them.
    pub items_price: Option<f64>,
    pub shipping_price: Option<f64>,
    pub tax_price: Option<f64>,
    pub total_price: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
pub struct DailySales {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub orders: i64,
    pub sales: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total_orders: i64,
    pub total_sales: f64,
    pub total_users: i64,
    pub daily_series: Vec<DailySales>,
}
