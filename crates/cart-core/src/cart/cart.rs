//! Cart value type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, StockEntry};
use crate::error::CartError;
use crate::ids::ProductId;

/// Ordered cart lines, unique by product id.
///
/// Serializes as a bare JSON array of products, which is the snapshot
/// format. Every line holds `amount >= 1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from arbitrary lines, dropping lines with a non-positive
    /// amount and every repeat of an id after its first line.
    ///
    /// Returns the cart and the number of lines dropped.
    pub fn from_items(items: Vec<Product>) -> (Self, usize) {
        let total = items.len();
        let mut kept: Vec<Product> = Vec::with_capacity(total);
        for item in items {
            if item.amount > 0 && !kept.iter().any(|p| p.id == item.id) {
                kept.push(item);
            }
        }
        let dropped = total - kept.len();
        (Self { items: kept }, dropped)
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.items.iter()
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Units of `id` in the cart, 0 if absent.
    pub fn amount_of(&self, id: ProductId) -> i64 {
        self.get(id).map(|p| p.amount).unwrap_or(0)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, p| total.saturating_add(p.amount))
    }

    /// Amount held per product id.
    pub fn amounts(&self) -> HashMap<ProductId, i64> {
        self.items.iter().map(|p| (p.id, p.amount)).collect()
    }

    /// Add one unit of `product`, checked against `stock`.
    ///
    /// An existing line is incremented; otherwise `product` is appended with
    /// `amount = 1` regardless of the amount it carries. Returns the new
    /// amount. Nothing changes on error.
    pub fn add_one(&mut self, product: Product, stock: &StockEntry) -> Result<i64, CartError> {
        let id = product.id;
        let candidate = match self.amount_of(id).checked_add(1) {
            Some(candidate) if stock.can_fulfill(candidate) => candidate,
            next => {
                return Err(CartError::OutOfStock {
                    product_id: id,
                    requested: next.unwrap_or(i64::MAX),
                    available: stock.amount,
                })
            }
        };

        match self.items.iter_mut().find(|p| p.id == id) {
            Some(existing) => existing.amount = candidate,
            None => self.items.push(product.with_amount(candidate)),
        }
        Ok(candidate)
    }

    /// Set the amount of an existing line, checked against `stock`.
    ///
    /// `amount <= 0` is ignored and returns `Ok(false)`.
    pub fn set_amount(
        &mut self,
        id: ProductId,
        amount: i64,
        stock: &StockEntry,
    ) -> Result<bool, CartError> {
        if amount <= 0 {
            return Ok(false);
        }
        let line = self
            .items
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CartError::ProductNotFound(id))?;
        if !stock.can_fulfill(amount) {
            return Err(CartError::OutOfStock {
                product_id: id,
                requested: amount,
                available: stock.amount,
            });
        }
        line.amount = amount;
        Ok(true)
    }

    /// Remove the line for `id` and return it.
    pub fn remove(&mut self, id: ProductId) -> Result<Product, CartError> {
        let index = self
            .items
            .iter()
            .position(|p| p.id == id)
            .ok_or(CartError::ProductNotFound(id))?;
        Ok(self.items.remove(index))
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
