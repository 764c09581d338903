use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::auth::UserInfo,
    kind::CatalogKind,
    models::{CatalogItem, ShippingAddress},
};

/// One cart entry. `bouquet_number` is only ever set for flower and
/// packing lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: Uuid,
    pub kind: CatalogKind,
    pub name: String,
    pub image: String,
    pub slug: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bouquet_number: Option<u32>,
}

impl CartLine {
    pub fn from_item(item: &CatalogItem, quantity: u32) -> Self {
        Self {
            item_id: item.id,
            kind: item.kind,
            name: item.name.clone(),
            image: item.image.clone(),
            slug: item.slug.clone(),
            price: item.price,
            quantity,
            bouquet_number: None,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub cart_items: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    /// Bouquet that new flower/packing lines join.
    pub bouquet_number: u32,
}

impl Default for CartState {
    fn default() -> Self {
        Self {
            cart_items: Vec::new(),
            shipping_address: ShippingAddress::default(),
            payment_method: String::new(),
            bouquet_number: 1,
        }
    }
}

impl CartState {
    pub fn line(&self, item_id: Uuid) -> Option<&CartLine> {
        self.cart_items.iter().find(|line| line.item_id == item_id)
    }

    /// Highest bouquet number currently held by any flower/packing line.
    pub fn max_bouquet_number(&self) -> Option<u32> {
        self.cart_items
            .iter()
            .filter(|line| line.kind.is_bouquet_component())
            .filter_map(|line| line.bouquet_number)
            .max()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user_info: Option<UserInfo>,
    pub cart: CartState,
}

impl SessionState {
    /// Quantity to request when the shopper clicks "add" on an item:
    /// one more than what the cart already holds.
    pub fn next_quantity(&self, item_id: Uuid) -> u32 {
        self.cart
            .line(item_id)
            .map_or(1, |line| line.quantity.saturating_add(1))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Sorry. Product is out of stock")]
    OutOfStock,
}

/// Client-side stock gate consulted before dispatching an add. The server
/// is only asked for the current count and does not reserve anything.
pub fn check_stock(count_in_stock: i32, requested: u32) -> Result<(), CartError> {
    let available = u32::try_from(count_in_stock).unwrap_or(0);
    if requested > available {
        return Err(CartError::OutOfStock);
    }
    Ok(())
}
