//! Cart line items

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Money;

/// Catalog identifier of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId(id)
    }
}

/// What a fragment hands to `add_item`: catalog data without a quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub image_ref: String,
}

impl ItemDetails {
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            image_ref: image_ref.into(),
        }
    }
}

/// One line of the cart; `quantity` is always at least 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub image_ref: String,
}

impl CartItem {
    pub(crate) fn first(details: ItemDetails) -> Self {
        Self {
            id: details.id,
            name: details.name,
            unit_price: details.unit_price,
            quantity: 1,
            image_ref: details.image_ref,
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}
