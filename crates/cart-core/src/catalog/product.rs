//! Product and stock records.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// A catalog product, and the shape of a cart line.
///
/// `amount` is only meaningful inside a cart; catalog records omit it and
/// deserialize with `amount = 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Display price. Not used for any calculation.
    pub price: f64,
    /// Image URL.
    pub image: String,
    /// Units held in the cart.
    #[serde(default)]
    pub amount: i64,
}

impl Product {
    pub fn new(id: u64, title: impl Into<String>, price: f64, image: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(id),
            title: title.into(),
            price,
            image: image.into(),
            amount: 0,
        }
    }

    /// Same product with `amount` replaced.
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }
}

/// Units of a product available for purchase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockEntry {
    pub id: ProductId,
    pub amount: i64,
}

impl StockEntry {
    pub fn new(id: u64, amount: i64) -> Self {
        Self {
            id: ProductId::new(id),
            amount,
        }
    }

    /// Check if `requested` units can be held at once.
    pub fn can_fulfill(&self, requested: i64) -> bool {
        requested <= self.amount
    }
}
