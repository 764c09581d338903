//! Wipes every table and loads a small demo catalog plus two accounts.

use chrono::Utc;
use sea_orm::ActiveEnum;
use flower_shop_api::{
    config::AppConfig,
    db::create_pool,
    kind::CatalogKind,
    services::auth_service::hash_password,
};
use uuid::Uuid;

struct Fixture {
    kind: CatalogKind,
    name: &'static str,
    slug: &'static str,
    image: &'static str,
    description: &'static str,
    price: f64,
    count_in_stock: i32,
    color: Option<&'static str>,
    size: Option<&'static str>,
}

const FIXTURES: &[Fixture] = &[
    Fixture {
        kind: CatalogKind::Product,
        name: "Roses bouquet",
        slug: "roses-bouquet",
        image: "/images/p1.jpg",
        description: "Fifteen red roses tied with ribbon",
        price: 65.0,
        count_in_stock: 12,
        color: None,
        size: None,
    },
    Fixture {
        kind: CatalogKind::Product,
        name: "Spring mix",
        slug: "spring-mix",
        image: "/images/p2.jpg",
        description: "Tulips, daffodils and hyacinths",
        price: 48.0,
        count_in_stock: 0,
        color: None,
        size: None,
    },
    Fixture {
        kind: CatalogKind::Flower,
        name: "Red rose",
        slug: "red-rose",
        image: "/images/flowers/f1.jpg",
        description: "Long-stem garden rose",
        price: 4.0,
        count_in_stock: 200,
        color: Some("red"),
        size: Some("60 cm"),
    },
    Fixture {
        kind: CatalogKind::Flower,
        name: "White tulip",
        slug: "white-tulip",
        image: "/images/flowers/f2.jpg",
        description: "Dutch tulip",
        price: 2.5,
        count_in_stock: 150,
        color: Some("white"),
        size: Some("40 cm"),
    },
    Fixture {
        kind: CatalogKind::Packing,
        name: "Wrapping paper",
        slug: "wrapping-paper",
        image: "/images/packings/p1.jpg",
        description: "Kraft paper wrap",
        price: 20.0,
        count_in_stock: 100,
        color: None,
        size: None,
    },
    Fixture {
        kind: CatalogKind::Packing,
        name: "Box",
        slug: "box",
        image: "/images/packings/p2.jpg",
        description: "Round hat box",
        price: 20.0,
        count_in_stock: 50,
        color: None,
        size: None,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    reset(&pool).await?;
    let admin_id = insert_user(&pool, "Admin", "admin@example.com", "123456", true).await?;
    let user_id = insert_user(&pool, "Customer", "user@example.com", "123456", false).await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn reset(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        "TRUNCATE order_items, orders, reviews, catalog_items, audit_logs, users CASCADE",
    )
    .execute(pool)
    .await?;
    println!("Cleared all tables");
    Ok(())
}

async fn insert_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, is_admin)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(is_admin)
    .fetch_one(pool)
    .await?;

    println!("Created user {email} (admin={is_admin})");
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    for fixture in FIXTURES {
        sqlx::query(
            r#"
            INSERT INTO catalog_items
                (id, kind, name, slug, image, images, description, price,
                 count_in_stock, rating, num_reviews, color, size, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, 0, $10, $11, $12, $12)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fixture.kind.to_value())
        .bind(fixture.name)
        .bind(fixture.slug)
        .bind(fixture.image)
        .bind(Vec::<String>::new())
        .bind(fixture.description)
        .bind(fixture.price)
        .bind(fixture.count_in_stock)
        .bind(fixture.color)
        .bind(fixture.size)
        .bind(now)
        .execute(pool)
        .await?;
    }

    for kind in CatalogKind::ALL {
        let seeded = FIXTURES.iter().filter(|f| f.kind == kind).count();
        println!("Seeded {seeded} {}", kind.collection());
    }
    Ok(())
}
