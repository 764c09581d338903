use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::{CatalogItem, Review};

/// Partial update. An absent (or `null`) field keeps the stored value; any
/// present value, including `0` and `""`, replaces it.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCatalogItemRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub count_in_stock: Option<i32>,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogItemList {
    pub items: Vec<CatalogItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemWithReviews {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    /// Accepts a JSON number or a numeric string.
    #[schema(value_type = f64)]
    pub rating: Value,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreated {
    pub review: Review,
    pub num_reviews: i32,
    pub rating: f64,
}
