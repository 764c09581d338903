use sea_orm::entity::prelude::*;

use crate::kind::CatalogKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "catalog_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: CatalogKind,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub images: Vec<String>,
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub count_in_stock: i32,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    pub num_reviews: i32,
    pub color: Option<String>,
    pub size: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
