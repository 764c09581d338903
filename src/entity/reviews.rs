use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub author_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::catalog_items::Entity",
        from = "Column::ItemId",
        to = "super::catalog_items::Column::Id",
        on_delete = "Cascade"
    )]
    CatalogItems,
}

impl Related<super::catalog_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CatalogItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
