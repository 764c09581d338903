//! The three sellable catalog kinds and the per-kind settings that let a
//! single catalog service serve all of them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Ready-made bouquet.
    #[sea_orm(string_value = "product")]
    Product,
    #[sea_orm(string_value = "flower")]
    Flower,
    #[sea_orm(string_value = "packing")]
    Packing,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 3] = [
        CatalogKind::Product,
        CatalogKind::Flower,
        CatalogKind::Packing,
    ];

    /// Display label used in response messages ("Flower Not Found").
    pub fn label(self) -> &'static str {
        match self {
            CatalogKind::Product => "Product",
            CatalogKind::Flower => "Flower",
            CatalogKind::Packing => "Packing",
        }
    }

    /// Collection segment mounted under `/api`.
    pub fn collection(self) -> &'static str {
        match self {
            CatalogKind::Product => "products",
            CatalogKind::Flower => "flowers",
            CatalogKind::Packing => "packings",
        }
    }

    /// Flowers carry the extra `color`/`size` attributes.
    pub fn has_flower_attributes(self) -> bool {
        matches!(self, CatalogKind::Flower)
    }

    /// Flowers and packings are composed into custom bouquets in the cart.
    pub fn is_bouquet_component(self) -> bool {
        !matches!(self, CatalogKind::Product)
    }

    pub fn not_found(self) -> String {
        format!("{} Not Found", self.label())
    }
}
