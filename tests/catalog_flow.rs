mod common;

use common::{create_user, insert_item, setup_state, unique};
use flower_shop_api::{
    dto::catalog::{CreateReviewRequest, UpdateCatalogItemRequest},
    error::AppError,
    kind::CatalogKind,
    routes::params::{Pagination, SearchQuery},
    services::{catalog_service, review_service},
};
use serde_json::json;

#[tokio::test]
async fn duplicate_slug_is_a_conflict() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin", true).await?;

    let first = insert_item(&state, CatalogKind::Packing, &unique("ribbon"), 3.0, 10).await?;
    let second = insert_item(&state, CatalogKind::Packing, &unique("ribbon"), 3.0, 10).await?;

    let err = catalog_service::update_item(
        &state,
        &admin,
        CatalogKind::Packing,
        second.id,
        UpdateCatalogItemRequest {
            slug: Some(first.slug.clone()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Same slug under another kind is fine.
    let flower = insert_item(&state, CatalogKind::Flower, &unique("ribbon"), 3.0, 10).await?;
    let moved = catalog_service::update_item(
        &state,
        &admin,
        CatalogKind::Flower,
        flower.id,
        UpdateCatalogItemRequest {
            slug: Some(first.slug.clone()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(moved.data.unwrap().slug, first.slug);

    Ok(())
}

#[tokio::test]
async fn third_page_of_forty_five_holds_five_items() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let prefix = unique("page");
    for n in 0..45 {
        insert_item(&state, CatalogKind::Flower, &format!("{prefix} {n:02}"), 1.0, 1).await?;
    }

    let resp = catalog_service::search(
        &state,
        CatalogKind::Flower,
        SearchQuery {
            query: Some(prefix.clone()),
            page: Some("3".into()),
            page_size: Some("20".into()),
            ..Default::default()
        },
    )
    .await?;

    let meta = resp.meta.unwrap();
    assert_eq!(resp.data.unwrap().items.len(), 5);
    assert_eq!(meta.total, Some(45));
    assert_eq!(meta.total_pages, Some(3));
    Ok(())
}

#[tokio::test]
async fn search_filters_by_price_and_sorts() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let prefix = unique("sort");
    for price in [40.0, 5.0, 25.0, 90.0] {
        insert_item(&state, CatalogKind::Product, &format!("{prefix} {price}"), price, 3).await?;
    }

    let resp = catalog_service::search(
        &state,
        CatalogKind::Product,
        SearchQuery {
            query: Some(prefix.to_uppercase()),
            price: Some("10-50".into()),
            rating: Some("all".into()),
            order: Some("lowest".into()),
            ..Default::default()
        },
    )
    .await?;

    let prices: Vec<f64> = resp.data.unwrap().items.iter().map(|i| i.price).collect();
    assert_eq!(prices, [25.0, 40.0]);
    Ok(())
}

#[tokio::test]
async fn update_keeps_untouched_fields() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin", true).await?;
    let item = insert_item(&state, CatalogKind::Product, &unique("peonies"), 55.0, 7).await?;

    let updated = catalog_service::update_item(
        &state,
        &admin,
        CatalogKind::Product,
        item.id,
        UpdateCatalogItemRequest {
            price: Some(30.0),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.price, 30.0);
    assert_eq!(updated.name, item.name);
    assert_eq!(updated.image, item.image);
    assert_eq!(updated.count_in_stock, 7);

    let emptied = catalog_service::update_item(
        &state,
        &admin,
        CatalogKind::Product,
        item.id,
        UpdateCatalogItemRequest {
            count_in_stock: Some(0),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(emptied.count_in_stock, 0);
    assert_eq!(emptied.price, 30.0);
    Ok(())
}

#[tokio::test]
async fn reviews_average_and_reject_repeat_authors() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let alice = create_user(&state, &unique("alice"), false).await?;
    let bob = create_user(&state, &unique("bob"), false).await?;
    let item = insert_item(&state, CatalogKind::Flower, &unique("lily"), 6.0, 30).await?;

    let review = |rating: serde_json::Value| CreateReviewRequest {
        rating,
        comment: "Lovely".into(),
    };

    review_service::submit_review(&state, &alice, CatalogKind::Flower, item.id, review(json!(5)))
        .await?;
    let second = review_service::submit_review(
        &state,
        &bob,
        CatalogKind::Flower,
        item.id,
        review(json!("4")),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(second.num_reviews, 2);
    assert_eq!(second.rating, 4.5);

    let err = review_service::submit_review(
        &state,
        &alice,
        CatalogKind::Flower,
        item.id,
        review(json!(1)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "You already submitted a review");

    let detail = catalog_service::get_by_slug(&state, CatalogKind::Flower, &item.slug)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.item.num_reviews, 2);
    assert_eq!(detail.item.rating, 4.5);
    assert_eq!(detail.reviews.len(), 2);
    Ok(())
}

#[tokio::test]
async fn lookups_are_scoped_to_the_kind() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let item = insert_item(&state, CatalogKind::Packing, &unique("box"), 20.0, 5).await?;

    let err = catalog_service::get_by_id(&state, CatalogKind::Flower, item.id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Flower Not Found");

    let found = catalog_service::get_by_id(&state, CatalogKind::Packing, item.id).await?;
    assert_eq!(found.data.unwrap().id, item.id);
    Ok(())
}

#[tokio::test]
async fn placeholder_create_and_admin_delete() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin", true).await?;
    let shopper = create_user(&state, "shopper", false).await?;

    let err = catalog_service::create_item(&state, &shopper, CatalogKind::Flower)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let created = catalog_service::create_item(&state, &admin, CatalogKind::Flower)
        .await?
        .data
        .unwrap();
    assert!(created.name.starts_with("sample name "));
    assert_eq!(created.color.as_deref(), Some("sample color"));
    assert_eq!(created.rating, 0.0);

    let listed = catalog_service::list_paged(
        &state,
        &admin,
        CatalogKind::Flower,
        Pagination::new(1, 5),
    )
    .await?;
    assert_eq!(listed.meta.unwrap().per_page, Some(5));

    catalog_service::delete_item(&state, &admin, CatalogKind::Flower, created.id).await?;
    let err = catalog_service::delete_item(&state, &admin, CatalogKind::Flower, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}
