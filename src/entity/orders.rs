use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_full_name: String,
    pub shipping_address: String,
    pub shipping_city: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub shipping_lat: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub shipping_lng: Option<f64>,
    pub payment_method: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub payment_result: Option<Json>,
    #[sea_orm(column_type = "Double")]
    pub items_price: f64,
    #[sea_orm(column_type = "Double")]
    pub shipping_price: f64,
    #[sea_orm(column_type = "Double")]
    pub tax_price: f64,
    #[sea_orm(column_type = "Double")]
    pub total_price: f64,
    pub is_paid: bool,
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
