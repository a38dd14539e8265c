//! Cart error types.

use cart_cache::CacheError;
use cart_data::FetchError;
use thiserror::Error;

use crate::ids::ProductId;

/// Errors returned by cart operations.
///
/// A failed operation never changes the cart or its snapshot.
#[derive(Error, Debug)]
pub enum CartError {
    /// Requested quantity exceeds available stock.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Product missing from the catalog or from the cart.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Catalog or stock lookup failed while adding.
    #[error("Failed to add product {product_id}: {source}")]
    AddFailed {
        product_id: ProductId,
        #[source]
        source: FetchError,
    },

    /// Stock lookup failed while changing an amount.
    #[error("Failed to update product {product_id}: {source}")]
    UpdateFailed {
        product_id: ProductId,
        #[source]
        source: FetchError,
    },

    /// Snapshot could not be read or written.
    #[error("Cart storage error: {0}")]
    Storage(#[from] CacheError),
}

impl CartError {
    pub fn is_out_of_stock(&self) -> bool {
        matches!(self, CartError::OutOfStock { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CartError::ProductNotFound(_))
    }
}
