//! Durable key-value persistence for cart snapshots.
//!
//! Provides a small [`KeyValueStore`] seam with a file-backed and an
//! in-memory backend, plus a [`Cache`] wrapper that handles JSON
//! serialization.
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_cache::{Cache, FileStore};
//!
//! let cache = Cache::new(FileStore::open(".cart")?);
//!
//! // Store a value
//! cache.set("@RocketShoes:cart", &cart)?;
//!
//! // Retrieve a value
//! let cart: Option<Cart> = cache.get("@RocketShoes:cart")?;
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KeyValueStore, MemoryStore};
}
