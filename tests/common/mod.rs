#![allow(dead_code)]

use std::sync::Arc;

use flower_shop_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    entity::{catalog_items::Model as CatalogModel, users::ActiveModel as UserActive},
    kind::CatalogKind,
    middleware::auth::AuthUser,
    services::catalog_service,
    state::AppState,
};
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

/// Connect and migrate, or `None` when no database is configured.
///
/// Tests never truncate: every row they create carries a fresh uuid in its
/// unique columns so several test binaries can share one database.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 5).await?;
    // The sqlx migrator holds an advisory lock, so concurrent tests are safe.
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(Some(AppState {
        orm: create_orm_conn(&pool),
        pool,
        config: Arc::new(AppConfig {
            database_url,
            jwt_secret: "integration-secret".into(),
            host: "127.0.0.1".into(),
            port: 0,
            max_connections: 5,
        }),
    }))
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub async fn create_user(state: &AppState, name: &str, is_admin: bool) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(format!("{}@example.com", unique(name))),
        password_hash: Set("dummy".into()),
        is_admin: Set(is_admin),
        created_at: Set(chrono::Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        name: user.name,
        email: user.email,
        is_admin: user.is_admin,
    })
}

/// Insert a catalog row directly, bypassing the placeholder create whose
/// millisecond slug may collide between parallel tests.
pub async fn insert_item(
    state: &AppState,
    kind: CatalogKind,
    name: &str,
    price: f64,
    count_in_stock: i32,
) -> anyhow::Result<CatalogModel> {
    let mut active = catalog_service::placeholder(kind, Uuid::new_v4());
    active.name = Set(name.to_string());
    active.slug = Set(unique("item"));
    active.price = Set(price);
    active.count_in_stock = Set(count_in_stock);
    Ok(active.insert(&state.orm).await?)
}
