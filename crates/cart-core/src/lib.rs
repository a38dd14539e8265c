//! Stock-validated shopping cart state with durable snapshots.
//!
//! This crate reconciles three sources of truth:
//!
//! - **Cart**: the in-memory lines the shopper holds
//! - **Snapshot**: the cart as last written to a [`cart_cache::KeyValueStore`]
//! - **Stock**: remote availability served by a [`CatalogService`]
//!
//! [`CartStore`] is the only writer. It guarantees that no line exceeds the
//! stock observed when it was last changed, no product appears twice, and no
//! line holds fewer than one unit.
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_core::prelude::*;
//! use cart_cache::FileStore;
//! use cart_data::FetchClient;
//!
//! let catalog = HttpCatalog::new(FetchClient::new("http://localhost:3333"));
//! let mut store = CartStore::with_default_key(catalog, FileStore::open(".cart")?)?;
//!
//! if let Err(e) = store.add_product(ProductId::new(1)).await {
//!     show_toast(Notice::for_failure(Operation::Add, &e));
//! }
//! println!("{} products in cart", store.cart().len());
//! ```

pub mod error;
pub mod ids;

pub mod cart;
pub mod catalog;

pub use cart::{Cart, CartStore, Notice, NoticeLevel, Operation, DEFAULT_CART_KEY};
pub use catalog::{CatalogService, HttpCatalog, Product, StockEntry};
pub use error::CartError;
pub use ids::ProductId;

#[cfg(any(test, feature = "test-util"))]
pub use catalog::StaticCatalog;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, CartStore, Notice, NoticeLevel, Operation, DEFAULT_CART_KEY};
    pub use crate::catalog::{CatalogService, HttpCatalog, Product, StockEntry};
    pub use crate::error::CartError;
    pub use crate::ids::ProductId;

    #[cfg(any(test, feature = "test-util"))]
    pub use crate::catalog::StaticCatalog;
}
