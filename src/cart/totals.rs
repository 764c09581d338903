use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::state::CartLine;

/// Orders strictly above this items price ship for free.
pub const FREE_SHIPPING_THRESHOLD: f64 = 100.0;
pub const FLAT_SHIPPING_PRICE: f64 = 20.0;
/// Tax is carried on every order but currently always zero.
pub const TAX_RATE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub items_price: f64,
    pub shipping_price: f64,
    pub tax_price: f64,
    pub total_price: f64,
}

/// Half-up rounding to two decimals, e.g. `123.2345 -> 123.23`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + f64::EPSILON).round() / 100.0
}

pub fn compute_totals(lines: &[CartLine]) -> CheckoutTotals {
    let items_price = round2(lines.iter().map(CartLine::line_total).sum());
    let shipping_price = if items_price > FREE_SHIPPING_THRESHOLD {
        0.0
    } else {
        FLAT_SHIPPING_PRICE
    };
    let tax_price = round2(TAX_RATE * items_price);
    CheckoutTotals {
        items_price,
        shipping_price,
        tax_price,
        total_price: round2(items_price + shipping_price + tax_price),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// A ready-made bouquet, shown on its own.
    Item(Uuid),
    /// A shopper-composed bouquet.
    Bouquet(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartGroup {
    pub key: GroupKey,
    pub lines: Vec<CartLine>,
}

impl CartGroup {
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

/// Partition lines for display, keeping the order in which each group
/// first appears in the cart.
pub fn group_lines(lines: &[CartLine]) -> Vec<CartGroup> {
    let mut groups: Vec<CartGroup> = Vec::new();
    for line in lines {
        let key = match line.bouquet_number {
            Some(number) if line.kind.is_bouquet_component() => GroupKey::Bouquet(number),
            _ => GroupKey::Item(line.item_id),
        };
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => group.lines.push(line.clone()),
            None => groups.push(CartGroup {
                key,
                lines: vec![line.clone()],
            }),
        }
    }
    groups
}
