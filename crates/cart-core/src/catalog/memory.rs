//! In-memory catalog.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use cart_data::FetchError;

use crate::catalog::{CatalogService, Product, StockEntry};
use crate::ids::ProductId;

/// [`CatalogService`] serving fixed products and adjustable stock.
///
/// Lookups of unknown ids fail with a 404 `HttpError`, like the HTTP API.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
    stock: RwLock<HashMap<ProductId, i64>>,
    unavailable: AtomicBool,
    stock_requests: AtomicUsize,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product with `stock` units available.
    pub fn with_product(mut self, product: Product, stock: i64) -> Self {
        let id = product.id;
        self.products.retain(|p| p.id != id);
        self.products.push(product.with_amount(0));
        if let Ok(levels) = self.stock.get_mut() {
            levels.insert(id, stock);
        }
        self
    }

    /// Add a stock record for an id that has no catalog product.
    pub fn with_stock(self, id: ProductId, stock: i64) -> Self {
        self.set_stock(id, stock);
        self
    }

    /// Change the available units of `id`.
    pub fn set_stock(&self, id: ProductId, amount: i64) {
        if let Ok(mut levels) = self.stock.write() {
            levels.insert(id, amount);
        }
    }

    /// Drop the stock record of `id`.
    pub fn remove_stock(&self, id: ProductId) {
        if let Ok(mut levels) = self.stock.write() {
            levels.remove(&id);
        }
    }

    /// Make every lookup fail with a 503 until called with `false`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stock lookups served so far, bulk or single.
    pub fn stock_requests(&self) -> usize {
        self.stock_requests.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), FetchError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(FetchError::HttpError {
                status: 503,
                message: "catalog unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn levels(&self) -> Result<HashMap<ProductId, i64>, FetchError> {
        self.stock
            .read()
            .map(|levels| levels.clone())
            .map_err(|_| FetchError::RequestError("stock table poisoned".to_string()))
    }
}

fn not_found() -> FetchError {
    FetchError::HttpError {
        status: 404,
        message: "Not Found".to_string(),
    }
}

#[async_trait]
impl CatalogService for StaticCatalog {
    async fn products(&self) -> Result<Vec<Product>, FetchError> {
        self.check_available()?;
        Ok(self.products.clone())
    }

    async fn product(&self, id: ProductId) -> Result<Product, FetchError> {
        self.check_available()?;
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn stock_levels(&self) -> Result<Vec<StockEntry>, FetchError> {
        self.stock_requests.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut entries: Vec<StockEntry> = self
            .levels()?
            .into_iter()
            .map(|(id, amount)| StockEntry { id, amount })
            .collect();
        entries.sort_by_key(|s| s.id);
        Ok(entries)
    }

    async fn stock(&self, id: ProductId) -> Result<StockEntry, FetchError> {
        self.stock_requests.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.levels()?
            .get(&id)
            .map(|&amount| StockEntry { id, amount })
            .ok_or_else(not_found)
    }
}
