//! Persisted cart state.

use cart_cache::{Cache, CacheError, KeyValueStore};
use cart_data::FetchError;

use crate::cart::Cart;
use crate::catalog::{CatalogService, Product, StockEntry};
use crate::error::CartError;
use crate::ids::ProductId;

/// Storage key of the cart snapshot.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

/// The cart, its catalog collaborator, and its durable snapshot.
///
/// Every mutation builds the next cart on a copy, writes the snapshot, and
/// only then replaces the in-memory cart. A failed validation, lookup, or
/// write leaves both untouched.
///
/// Mutations take `&mut self`, so operations on one store never interleave.
/// Share a store between tasks behind a `tokio::sync::Mutex`.
///
/// # Example
///
/// ```rust,ignore
/// let catalog = HttpCatalog::new(FetchClient::new("http://localhost:3333"));
/// let mut store = CartStore::with_default_key(catalog, FileStore::open(".cart")?)?;
///
/// match store.add_product(ProductId::new(1)).await {
///     Ok(amount) => println!("now holding {amount}"),
///     Err(e) => eprintln!("{}", Notice::for_failure(Operation::Add, &e)),
/// }
/// ```
pub struct CartStore<C, S> {
    catalog: C,
    cache: Cache<S>,
    key: String,
    cart: Cart,
}

impl<C: CatalogService, S: KeyValueStore> CartStore<C, S> {
    /// Open the store, restoring the snapshot saved under `key`.
    ///
    /// A missing snapshot yields an empty cart. An unreadable one is
    /// discarded with a warning and also yields an empty cart; it stays in
    /// storage until the next successful mutation overwrites it.
    pub fn open(catalog: C, store: S, key: impl Into<String>) -> Result<Self, CartError> {
        let cache = Cache::new(store);
        let key = key.into();
        let cart = load_snapshot(&cache, &key)?;
        tracing::debug!(key = %key, lines = cart.len(), "cart opened");
        Ok(Self {
            catalog,
            cache,
            key,
            cart,
        })
    }

    /// Open the store under [`DEFAULT_CART_KEY`].
    pub fn with_default_key(catalog: C, store: S) -> Result<Self, CartError> {
        Self::open(catalog, store, DEFAULT_CART_KEY)
    }

    /// The current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Replace the in-memory cart with the stored snapshot.
    pub fn reload(&mut self) -> Result<(), CartError> {
        self.cart = load_snapshot(&self.cache, &self.key)?;
        Ok(())
    }

    /// Add one unit of `id`, returning the amount now in the cart.
    ///
    /// Fetches the catalog record and the stock entry together. An unknown
    /// product fails with [`CartError::ProductNotFound`]; a product with no
    /// stock record counts as zero units available.
    pub async fn add_product(&mut self, id: ProductId) -> Result<i64, CartError> {
        let (product, stock) =
            futures::future::join(self.catalog.product(id), self.catalog.stock(id)).await;

        let result = match (product, stock_or_empty(id, stock)) {
            (Err(e), _) if e.is_not_found() => Err(CartError::ProductNotFound(id)),
            (Err(source), _) | (_, Err(source)) => Err(CartError::AddFailed {
                product_id: id,
                source,
            }),
            (Ok(product), Ok(stock)) => self.apply_add(product, &stock),
        };

        match &result {
            Ok(amount) => tracing::debug!(product_id = %id, amount, "product added"),
            Err(e) => tracing::info!(product_id = %id, error = %e, "add rejected"),
        }
        result
    }

    /// Remove the line for `id`.
    pub fn remove_product(&mut self, id: ProductId) -> Result<Product, CartError> {
        let result = self.apply_remove(id);
        match &result {
            Ok(_) => tracing::debug!(product_id = %id, "product removed"),
            Err(e) => tracing::info!(product_id = %id, error = %e, "remove rejected"),
        }
        result
    }

    /// Set the amount held of `id`.
    ///
    /// `amount <= 0` is ignored without any lookup and returns `Ok(false)`;
    /// quantities are never zeroed through this call, use
    /// [`remove_product`](Self::remove_product) instead.
    pub async fn update_product_amount(
        &mut self,
        id: ProductId,
        amount: i64,
    ) -> Result<bool, CartError> {
        if amount <= 0 {
            tracing::trace!(product_id = %id, amount, "non-positive amount ignored");
            return Ok(false);
        }

        let result = self.apply_update(id, amount).await;
        match &result {
            Ok(_) => tracing::debug!(product_id = %id, amount, "amount updated"),
            Err(e) => tracing::info!(product_id = %id, amount, error = %e, "update rejected"),
        }
        result
    }

    fn apply_add(&mut self, product: Product, stock: &StockEntry) -> Result<i64, CartError> {
        let mut next = self.cart.clone();
        let amount = next.add_one(product, stock)?;
        self.commit(next)?;
        Ok(amount)
    }

    fn apply_remove(&mut self, id: ProductId) -> Result<Product, CartError> {
        let mut next = self.cart.clone();
        let removed = next.remove(id)?;
        self.commit(next)?;
        Ok(removed)
    }

    async fn apply_update(&mut self, id: ProductId, amount: i64) -> Result<bool, CartError> {
        if !self.cart.contains(id) {
            return Err(CartError::ProductNotFound(id));
        }
        let stock = stock_or_empty(id, self.catalog.stock(id).await).map_err(|source| {
            CartError::UpdateFailed {
                product_id: id,
                source,
            }
        })?;

        let mut next = self.cart.clone();
        let changed = next.set_amount(id, amount, &stock)?;
        self.commit(next)?;
        Ok(changed)
    }

    fn commit(&mut self, next: Cart) -> Result<(), CartError> {
        self.cache.set(&self.key, &next)?;
        self.cart = next;
        Ok(())
    }
}

impl<C, S> std::fmt::Debug for CartStore<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

/// A 404 from the stock endpoint means no units are available.
fn stock_or_empty(
    id: ProductId,
    stock: Result<StockEntry, FetchError>,
) -> Result<StockEntry, FetchError> {
    match stock {
        Err(e) if e.is_not_found() => Ok(StockEntry { id, amount: 0 }),
        other => other,
    }
}

fn load_snapshot<S: KeyValueStore>(cache: &Cache<S>, key: &str) -> Result<Cart, CartError> {
    match cache.get::<Vec<Product>>(key) {
        Ok(Some(items)) => {
            let (cart, dropped) = Cart::from_items(items);
            if dropped > 0 {
                tracing::warn!(key, dropped, "dropped invalid lines from cart snapshot");
            }
            Ok(cart)
        }
        Ok(None) => Ok(Cart::new()),
        Err(CacheError::SerializeError(e)) => {
            tracing::warn!(key, error = %e, "discarding unreadable cart snapshot");
            Ok(Cart::new())
        }
        // Bytes that are not UTF-8 are as corrupt as malformed JSON.
        Err(CacheError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
            tracing::warn!(key, error = %e, "discarding unreadable cart snapshot");
            Ok(Cart::new())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use cart_cache::MemoryStore;
    use std::sync::Arc;

    fn shoe(id: u64) -> Product {
        Product::new(id, format!("Tênis {}", id), 179.9, format!("https://img/{}.jpg", id))
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_product(shoe(1), 5)
            .with_product(shoe(2), 2)
            .with_product(shoe(3), 0)
    }

    fn open(
        catalog: StaticCatalog,
    ) -> (CartStore<StaticCatalog, Arc<MemoryStore>>, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let store = CartStore::with_default_key(catalog, Arc::clone(&storage)).unwrap();
        (store, storage)
    }

    fn snapshot(storage: &MemoryStore) -> Option<Cart> {
        storage
            .get(DEFAULT_CART_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
            Err(CacheError::StoreError("read-only".to_string()))
        }

        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::StoreError("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_add_new_product() {
        let (mut store, storage) = open(catalog());

        let amount = store.add_product(ProductId::new(1)).await.unwrap();
        assert_eq!(amount, 1);
        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.cart().get(ProductId::new(1)).unwrap().title, "Tênis 1");
        assert_eq!(snapshot(&storage).as_ref(), Some(store.cart()));
    }

    #[tokio::test]
    async fn test_add_until_stock_runs_out() {
        let (mut store, storage) = open(catalog());
        let id = ProductId::new(1);

        for expected in 1..=5 {
            assert_eq!(store.add_product(id).await.unwrap(), expected);
        }
        let before = storage.get(DEFAULT_CART_KEY).unwrap();

        let err = store.add_product(id).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::OutOfStock { requested: 6, available: 5, .. }
        ));
        assert_eq!(store.cart().amount_of(id), 5);
        assert_eq!(storage.get(DEFAULT_CART_KEY).unwrap(), before);
    }

    #[tokio::test]
    async fn test_add_without_stock() {
        let (mut store, storage) = open(catalog());

        let err = store.add_product(ProductId::new(3)).await.unwrap_err();
        assert!(err.is_out_of_stock());
        assert!(store.cart().is_empty());
        assert!(snapshot(&storage).is_none());
    }

    #[tokio::test]
    async fn test_add_missing_stock_record_is_out_of_stock() {
        let catalog = catalog();
        catalog.remove_stock(ProductId::new(2));
        let (mut store, _) = open(catalog);

        let err = store.add_product(ProductId::new(2)).await.unwrap_err();
        assert!(matches!(err, CartError::OutOfStock { available: 0, .. }));
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let (mut store, storage) = open(catalog().with_stock(ProductId::new(9), 4));

        let err = store.add_product(ProductId::new(9)).await.unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(id) if id == ProductId::new(9)));
        assert!(store.cart().is_empty());
        assert!(snapshot(&storage).is_none());
    }

    #[tokio::test]
    async fn test_add_when_catalog_unavailable() {
        let (mut store, _) = open(catalog());
        store.catalog().set_unavailable(true);

        let err = store.add_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CartError::AddFailed { .. }));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_sees_stock_drift() {
        let (mut store, _) = open(catalog());
        let id = ProductId::new(1);
        store.add_product(id).await.unwrap();
        store.add_product(id).await.unwrap();

        store.catalog().set_stock(id, 2);
        assert!(store.add_product(id).await.unwrap_err().is_out_of_stock());
        assert_eq!(store.cart().amount_of(id), 2);
    }

    #[tokio::test]
    async fn test_remove_product() {
        let (mut store, storage) = open(catalog());
        store.add_product(ProductId::new(1)).await.unwrap();
        store.add_product(ProductId::new(2)).await.unwrap();

        let removed = store.remove_product(ProductId::new(1)).unwrap();
        assert_eq!(removed.amount, 1);
        assert!(!store.cart().contains(ProductId::new(1)));
        assert_eq!(snapshot(&storage).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_absent_product() {
        let (mut store, storage) = open(catalog());
        store.add_product(ProductId::new(2)).await.unwrap();
        let before = store.cart().clone();

        let err = store.remove_product(ProductId::new(1)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.cart(), &before);
        assert_eq!(snapshot(&storage), Some(before));
    }

    #[tokio::test]
    async fn test_update_non_positive_is_noop() {
        let (mut store, storage) = open(catalog());
        store.add_product(ProductId::new(1)).await.unwrap();
        let lookups = store.catalog().stock_requests();
        let before = storage.get(DEFAULT_CART_KEY).unwrap();

        assert!(!store.update_product_amount(ProductId::new(1), 0).await.unwrap());
        assert!(!store.update_product_amount(ProductId::new(1), -5).await.unwrap());
        assert!(!store.update_product_amount(ProductId::new(7), 0).await.unwrap());

        assert_eq!(store.cart().amount_of(ProductId::new(1)), 1);
        assert_eq!(store.catalog().stock_requests(), lookups);
        assert_eq!(storage.get(DEFAULT_CART_KEY).unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_within_stock() {
        let (mut store, storage) = open(catalog());
        store.add_product(ProductId::new(1)).await.unwrap();

        assert!(store.update_product_amount(ProductId::new(1), 4).await.unwrap());
        assert_eq!(store.cart().amount_of(ProductId::new(1)), 4);
        assert_eq!(snapshot(&storage).unwrap().amount_of(ProductId::new(1)), 4);

        assert!(store.update_product_amount(ProductId::new(1), 1).await.unwrap());
        assert_eq!(store.cart().amount_of(ProductId::new(1)), 1);
    }

    #[tokio::test]
    async fn test_update_beyond_stock() {
        let (mut store, _) = open(catalog());
        store.add_product(ProductId::new(2)).await.unwrap();

        let err = store
            .update_product_amount(ProductId::new(2), 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::OutOfStock { requested: 3, available: 2, .. }
        ));
        assert_eq!(store.cart().amount_of(ProductId::new(2)), 1);
    }

    #[tokio::test]
    async fn test_update_absent_product() {
        let (mut store, _) = open(catalog());

        let err = store
            .update_product_amount(ProductId::new(1), 2)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.catalog().stock_requests(), 0);
    }

    #[tokio::test]
    async fn test_update_when_stock_unavailable() {
        let (mut store, _) = open(catalog());
        store.add_product(ProductId::new(1)).await.unwrap();
        store.catalog().set_unavailable(true);

        let err = store
            .update_product_amount(ProductId::new(1), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::UpdateFailed { .. }));
        assert_eq!(store.cart().amount_of(ProductId::new(1)), 1);
    }

    #[tokio::test]
    async fn test_restores_snapshot() {
        let storage = Arc::new(MemoryStore::new());
        {
            let mut store =
                CartStore::with_default_key(catalog(), Arc::clone(&storage)).unwrap();
            store.add_product(ProductId::new(2)).await.unwrap();
            store.add_product(ProductId::new(1)).await.unwrap();
            store.add_product(ProductId::new(2)).await.unwrap();
        }

        let store = CartStore::with_default_key(catalog(), storage).unwrap();
        let ids: Vec<u64> = store.cart().iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(store.cart().amount_of(ProductId::new(2)), 2);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let storage = Arc::new(MemoryStore::with_entry(DEFAULT_CART_KEY, "[{\"id\": 1,"));
        let mut store = CartStore::with_default_key(catalog(), Arc::clone(&storage)).unwrap();
        assert!(store.cart().is_empty());
        assert_eq!(
            storage.get(DEFAULT_CART_KEY).unwrap().as_deref(),
            Some("[{\"id\": 1,")
        );

        store.add_product(ProductId::new(1)).await.unwrap();
        assert_eq!(snapshot(&storage).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_utf8_snapshot_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = cart_cache::FileStore::open(dir.path()).unwrap();
        std::fs::write(files.path_for(DEFAULT_CART_KEY), [0xff, 0xfe, 0x5b]).unwrap();

        let mut store = CartStore::with_default_key(catalog(), files).unwrap();
        assert!(store.cart().is_empty());

        store.add_product(ProductId::new(1)).await.unwrap();
        let reopened = CartStore::with_default_key(
            catalog(),
            cart_cache::FileStore::open(dir.path()).unwrap(),
        )
        .unwrap();
        assert_eq!(reopened.cart().amount_of(ProductId::new(1)), 1);
    }

    #[tokio::test]
    async fn test_add_to_line_at_max_amount() {
        let raw = serde_json::to_string(&vec![shoe(1).with_amount(i64::MAX)]).unwrap();
        let storage = Arc::new(MemoryStore::with_entry(DEFAULT_CART_KEY, raw.clone()));
        let mut store = CartStore::with_default_key(catalog(), Arc::clone(&storage)).unwrap();

        let err = store.add_product(ProductId::new(1)).await.unwrap_err();
        assert!(err.is_out_of_stock());
        assert_eq!(store.cart().amount_of(ProductId::new(1)), i64::MAX);
        assert_eq!(storage.get(DEFAULT_CART_KEY).unwrap(), Some(raw));
    }

    #[test]
    fn test_snapshot_with_invalid_lines_is_repaired() {
        let raw = serde_json::to_string(&vec![
            shoe(1).with_amount(2),
            shoe(1).with_amount(3),
            shoe(2).with_amount(0),
        ])
        .unwrap();
        let storage = MemoryStore::with_entry("cart", raw);

        let store = CartStore::open(catalog(), storage, "cart").unwrap();
        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.cart().amount_of(ProductId::new(1)), 2);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cart() {
        let storage = ReadOnlyStore(MemoryStore::new());
        let mut store = CartStore::with_default_key(catalog(), storage).unwrap();

        let err = store.add_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CartError::Storage(_)));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_reload() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = CartStore::with_default_key(catalog(), Arc::clone(&storage)).unwrap();
        store.add_product(ProductId::new(1)).await.unwrap();

        storage.set(DEFAULT_CART_KEY, "[]").unwrap();
        store.reload().unwrap();
        assert!(store.cart().is_empty());
    }
}
