//! Product catalog and stock lookups.

#[cfg(any(test, feature = "test-util"))]
mod memory;
mod product;
mod service;

#[cfg(any(test, feature = "test-util"))]
pub use memory::StaticCatalog;
pub use product::{Product, StockEntry};
pub use service::{CatalogService, HttpCatalog};
