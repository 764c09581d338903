use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CreateReviewRequest, ReviewCreated},
    entity::{
        catalog_items::ActiveModel as ItemActive,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews},
    },
    error::{AppError, AppResult},
    kind::CatalogKind,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::catalog_service::{find_model, review_from_entity},
    state::AppState,
};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Append a review under the caller's display name, then refresh the
/// item's derived `rating`/`numReviews`.
pub async fn submit_review(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
    item_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<ReviewCreated>> {
    let rating = parse_rating(&payload.rating)?;
    if payload.comment.trim().is_empty() {
        return Err(AppError::BadRequest("Comment is required".into()));
    }

    let item = find_model(state, kind, item_id).await?;

    // Keyed by display name: two accounts sharing a name count as one author.
    let already = Reviews::find()
        .filter(ReviewCol::ItemId.eq(item.id))
        .filter(ReviewCol::AuthorName.eq(user.name.as_str()))
        .count(&state.orm)
        .await?;
    if already > 0 {
        return Err(AppError::BadRequest("You already submitted a review".into()));
    }

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        item_id: Set(item.id),
        author_name: Set(user.name.clone()),
        rating: Set(rating),
        comment: Set(payload.comment),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let (num_reviews, average) = refresh_rating(state, item.id).await?;

    tracing::info!(item_id = %item.id, num_reviews, rating = average, "review submitted");
    audit::record(
        &state.pool,
        user.user_id,
        "review_create",
        kind.collection(),
        serde_json::json!({ "item_id": item.id, "review_id": review.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review Created",
        ReviewCreated {
            review: review_from_entity(review),
            num_reviews,
            rating: average,
        },
        Some(Meta::empty()),
    ))
}

/// Recompute the derived review fields of one item from its stored reviews.
///
/// Runs as a separate read and write after the review insert, so two
/// concurrent submissions may race. Callers only see this function, which
/// leaves room for a transactional version later.
pub async fn refresh_rating(state: &AppState, item_id: Uuid) -> AppResult<(i32, f64)> {
    let ratings: Vec<i32> = Reviews::find()
        .select_only()
        .column(ReviewCol::Rating)
        .filter(ReviewCol::ItemId.eq(item_id))
        .into_tuple()
        .all(&state.orm)
        .await?;

    let num_reviews = i32::try_from(ratings.len())
        .map_err(|_| AppError::Internal(anyhow::anyhow!("review count overflow")))?;
    let average = average_rating(&ratings);

    ItemActive {
        id: sea_orm::ActiveValue::Unchanged(item_id),
        rating: Set(average),
        num_reviews: Set(num_reviews),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .update(&state.orm)
    .await?;

    Ok((num_reviews, average))
}

/// Arithmetic mean, `0` for an item without reviews.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    sum as f64 / ratings.len() as f64
}

/// Accept a JSON number or a numeric string holding a whole star count.
pub fn parse_rating(raw: &Value) -> AppResult<i32> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite() && v.fract() == 0.0)
    .ok_or_else(|| AppError::BadRequest("Invalid rating value".into()))?;

    let stars = value as i64;
    if !(MIN_RATING..=MAX_RATING).contains(&stars) {
        return Err(AppError::BadRequest("Rating must be between 1 and 5".into()));
    }
    Ok(stars as i32)
}
