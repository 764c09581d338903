//! One CRUD service for every catalog kind. Kind-specific behaviour (labels,
//! flower attributes) comes from [`CatalogKind`].

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CatalogItemList, ItemWithReviews, UpdateCatalogItemRequest},
    entity::{
        catalog_items::{ActiveModel, Column, Entity as CatalogItems, Model as CatalogModel},
        reviews::{Column as ReviewCol, Entity as Reviews, Model as ReviewModel},
    },
    error::{AppError, AppResult},
    kind::CatalogKind,
    middleware::auth::{AuthUser, ensure_admin},
    models::{CatalogItem, Review},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, SearchOrder, SearchQuery},
    state::AppState,
};

pub const PLACEHOLDER_IMAGE: &str = "/images/p1.jpg";

/// Public browse: every item of the kind, no paging.
pub async fn list_items(
    state: &AppState,
    kind: CatalogKind,
) -> AppResult<ApiResponse<CatalogItemList>> {
    let items = of_kind(kind)
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        kind.collection(),
        CatalogItemList { items },
        None,
    ))
}

pub async fn list_paged(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
    pagination: Pagination,
) -> AppResult<ApiResponse<CatalogItemList>> {
    ensure_admin(user)?;
    let finder = of_kind(kind)
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id);
    page_of(state, kind, finder, &pagination).await
}

pub async fn search(
    state: &AppState,
    kind: CatalogKind,
    query: SearchQuery,
) -> AppResult<ApiResponse<CatalogItemList>> {
    let filters = query.filters();
    let mut condition = Condition::all();

    if let Some(name) = filters.name.as_deref() {
        condition = condition.add(Expr::col(Column::Name).ilike(like_pattern(name)));
    }
    if let Some((min, max)) = filters.price {
        condition = condition
            .add(Column::Price.gte(min))
            .add(Column::Price.lte(max));
    }
    if let Some(min_rating) = filters.min_rating {
        condition = condition.add(Column::Rating.gte(min_rating));
    }

    let finder = of_kind(kind).filter(condition);
    let finder = match filters.order {
        SearchOrder::Featured => finder.order_by_asc(Column::CreatedAt),
        SearchOrder::Lowest => finder.order_by_asc(Column::Price),
        SearchOrder::Highest => finder.order_by_desc(Column::Price),
        SearchOrder::TopRated => finder.order_by_desc(Column::Rating),
        SearchOrder::Newest | SearchOrder::Default => finder.order_by_desc(Column::CreatedAt),
    }
    .order_by_desc(Column::Id);

    page_of(state, kind, finder, &query.pagination()).await
}

pub async fn get_by_id(
    state: &AppState,
    kind: CatalogKind,
    id: Uuid,
) -> AppResult<ApiResponse<CatalogItem>> {
    let item = find_model(state, kind, id).await?;
    Ok(ApiResponse::success(kind.label(), item_from_entity(item), None))
}

pub async fn get_by_slug(
    state: &AppState,
    kind: CatalogKind,
    slug: &str,
) -> AppResult<ApiResponse<ItemWithReviews>> {
    let item = of_kind(kind)
        .filter(Column::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(kind.not_found()))?;

    let reviews = Reviews::find()
        .filter(ReviewCol::ItemId.eq(item.id))
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    Ok(ApiResponse::success(
        kind.label(),
        ItemWithReviews {
            item: item_from_entity(item),
            reviews,
        },
        None,
    ))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
) -> AppResult<ApiResponse<CatalogItem>> {
    ensure_admin(user)?;
    let item = placeholder(kind, Uuid::new_v4())
        .insert(&state.orm)
        .await
        .map_err(duplicate_key(kind))?;

    tracing::info!(kind = ?kind, id = %item.id, "catalog item created");
    audit::record(
        &state.pool,
        user.user_id,
        "catalog_create",
        kind.collection(),
        serde_json::json!({ "item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success(
        format!("{} Created", kind.label()),
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
    id: Uuid,
    payload: UpdateCatalogItemRequest,
) -> AppResult<ApiResponse<CatalogItem>> {
    ensure_admin(user)?;
    let existing = find_model(state, kind, id).await?;

    let mut active: ActiveModel = existing.into();
    apply_update(kind, &mut active, payload)?;
    active.updated_at = Set(Utc::now().into());
    let item = active
        .update(&state.orm)
        .await
        .map_err(duplicate_key(kind))?;

    audit::record(
        &state.pool,
        user.user_id,
        "catalog_update",
        kind.collection(),
        serde_json::json!({ "item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success(
        format!("{} Updated", kind.label()),
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = CatalogItems::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::Kind.eq(kind))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(kind.not_found()));
    }

    tracing::info!(kind = ?kind, id = %id, "catalog item deleted");
    audit::record(
        &state.pool,
        user.user_id,
        "catalog_delete",
        kind.collection(),
        serde_json::json!({ "item_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        format!("{} Deleted", kind.label()),
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn find_model(
    state: &AppState,
    kind: CatalogKind,
    id: Uuid,
) -> AppResult<CatalogModel> {
    of_kind(kind)
        .filter(Column::Id.eq(id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(kind.not_found()))
}

fn of_kind(kind: CatalogKind) -> Select<CatalogItems> {
    CatalogItems::find().filter(Column::Kind.eq(kind))
}

async fn page_of(
    state: &AppState,
    kind: CatalogKind,
    finder: Select<CatalogItems>,
    pagination: &Pagination,
) -> AppResult<ApiResponse<CatalogItemList>> {
    let (page, limit, offset) = pagination.normalize();
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        kind.collection(),
        CatalogItemList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Fresh item persisted with placeholder values, edited afterwards.
pub fn placeholder(kind: CatalogKind, id: Uuid) -> ActiveModel {
    let now = Utc::now();
    let stamp = now.timestamp_millis();
    let (color, size) = if kind.has_flower_attributes() {
        (Some("sample color".to_string()), Some("sample size".to_string()))
    } else {
        (None, None)
    };
    ActiveModel {
        id: Set(id),
        kind: Set(kind),
        name: Set(format!("sample name {stamp}")),
        slug: Set(format!("sample-name-{stamp}")),
        image: Set(PLACEHOLDER_IMAGE.to_string()),
        images: Set(Vec::new()),
        description: Set("sample description".to_string()),
        price: Set(0.0),
        count_in_stock: Set(0),
        rating: Set(0.0),
        num_reviews: Set(0),
        color: Set(color),
        size: Set(size),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

/// Copy every present field of the patch onto the model. Derived fields
/// (`rating`, `numReviews`) are never touched here.
pub fn apply_update(
    kind: CatalogKind,
    active: &mut ActiveModel,
    payload: UpdateCatalogItemRequest,
) -> AppResult<()> {
    validate_update(&payload)?;

    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(slug) = payload.slug {
        active.slug = Set(slug);
    }
    if let Some(image) = payload.image {
        active.image = Set(image);
    }
    if let Some(images) = payload.images {
        active.images = Set(images);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(count) = payload.count_in_stock {
        active.count_in_stock = Set(count);
    }
    if kind.has_flower_attributes() {
        if let Some(color) = payload.color {
            active.color = Set(Some(color));
        }
        if let Some(size) = payload.size {
            active.size = Set(Some(size));
        }
    }
    Ok(())
}

fn validate_update(payload: &UpdateCatalogItemRequest) -> AppResult<()> {
    let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
    if blank(&payload.name) || blank(&payload.image) {
        return Err(AppError::BadRequest("Name and image cannot be empty".into()));
    }
    if let Some(slug) = payload.slug.as_deref() {
        if !is_url_safe_slug(slug) {
            return Err(AppError::BadRequest(
                "Slug must be non-empty and contain only letters, digits, '-' or '_'".into(),
            ));
        }
    }
    if payload.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(AppError::BadRequest("Price must be a non-negative number".into()));
    }
    if payload.count_in_stock.is_some_and(|c| c < 0) {
        return Err(AppError::BadRequest("Count in stock cannot be negative".into()));
    }
    Ok(())
}

fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `ILIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn duplicate_key(kind: CatalogKind) -> impl FnOnce(DbErr) -> AppError {
    move |err| match AppError::from(err) {
        AppError::Conflict(_) => {
            AppError::Conflict(format!("{} slug or name already exists", kind.label()))
        }
        other => other,
    }
}

pub(crate) fn item_from_entity(model: CatalogModel) -> CatalogItem {
    CatalogItem {
        id: model.id,
        kind: model.kind,
        name: model.name,
        slug: model.slug,
        image: model.image,
        images: model.images,
        description: model.description,
        price: model.price,
        count_in_stock: model.count_in_stock,
        rating: model.rating,
        num_reviews: model.num_reviews,
        color: model.color,
        size: model.size,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        item_id: model.item_id,
        author_name: model.author_name,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn stored(kind: CatalogKind) -> ActiveModel {
        let now = Utc::now().into();
        let model = CatalogModel {
            id: Uuid::new_v4(),
            kind,
            name: "Red roses".into(),
            slug: "red-roses".into(),
            image: "/images/r.jpg".into(),
            images: vec![],
            description: "Eleven red roses".into(),
            price: 45.0,
            count_in_stock: 8,
            rating: 4.5,
            num_reviews: 2,
            color: Some("red".into()),
            size: Some("large".into()),
            created_at: now,
            updated_at: now,
        };
        model.into()
    }

    #[test]
    fn update_only_touches_present_fields() {
        let mut active = stored(CatalogKind::Product);
        let patch = UpdateCatalogItemRequest {
            price: Some(30.0),
            ..Default::default()
        };
        apply_update(CatalogKind::Product, &mut active, patch).unwrap();

        assert_eq!(active.price, ActiveValue::Set(30.0));
        assert!(matches!(active.name, ActiveValue::Unchanged(ref n) if n == "Red roses"));
        assert!(matches!(active.image, ActiveValue::Unchanged(_)));
        assert!(matches!(active.count_in_stock, ActiveValue::Unchanged(8)));
    }

    #[test]
    fn explicit_zero_is_written() {
        let mut active = stored(CatalogKind::Packing);
        let patch = UpdateCatalogItemRequest {
            count_in_stock: Some(0),
            description: Some(String::new()),
            ..Default::default()
        };
        apply_update(CatalogKind::Packing, &mut active, patch).unwrap();

        assert_eq!(active.count_in_stock, ActiveValue::Set(0));
        assert_eq!(active.description, ActiveValue::Set(String::new()));
    }

    #[test]
    fn flower_attributes_only_apply_to_flowers() {
        let patch = UpdateCatalogItemRequest {
            color: Some("white".into()),
            ..Default::default()
        };

        let mut flower = stored(CatalogKind::Flower);
        apply_update(CatalogKind::Flower, &mut flower, patch.clone()).unwrap();
        assert_eq!(flower.color, ActiveValue::Set(Some("white".into())));

        let mut bouquet = stored(CatalogKind::Product);
        apply_update(CatalogKind::Product, &mut bouquet, patch).unwrap();
        assert!(matches!(bouquet.color, ActiveValue::Unchanged(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            UpdateCatalogItemRequest {
                price: Some(-1.0),
                ..Default::default()
            },
            UpdateCatalogItemRequest {
                count_in_stock: Some(-3),
                ..Default::default()
            },
            UpdateCatalogItemRequest {
                slug: Some("red roses".into()),
                ..Default::default()
            },
            UpdateCatalogItemRequest {
                name: Some("  ".into()),
                ..Default::default()
            },
        ];
        for patch in cases {
            let mut active = stored(CatalogKind::Product);
            let err = apply_update(CatalogKind::Product, &mut active, patch).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[test]
    fn placeholder_fills_defaults_per_kind() {
        let flower = placeholder(CatalogKind::Flower, Uuid::new_v4());
        assert_eq!(flower.color, ActiveValue::Set(Some("sample color".into())));
        assert_eq!(flower.price, ActiveValue::Set(0.0));

        let packing = placeholder(CatalogKind::Packing, Uuid::new_v4());
        assert_eq!(packing.color, ActiveValue::Set(None));
        assert!(matches!(packing.slug, ActiveValue::Set(ref s) if s.starts_with("sample-name-")));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rose"), "%rose%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
