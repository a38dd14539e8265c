//! Product/stock query service.

use async_trait::async_trait;
use cart_data::{FetchClient, FetchError};

use crate::catalog::{Product, StockEntry};
use crate::ids::ProductId;

/// Read-only remote lookup of the catalog and stock levels.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// `GET /products`
    async fn products(&self) -> Result<Vec<Product>, FetchError>;

    /// `GET /products/{id}`
    async fn product(&self, id: ProductId) -> Result<Product, FetchError>;

    /// `GET /stock`
    async fn stock_levels(&self) -> Result<Vec<StockEntry>, FetchError>;

    /// `GET /stock/{id}`
    async fn stock(&self, id: ProductId) -> Result<StockEntry, FetchError>;
}

/// [`CatalogService`] backed by the JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: FetchClient,
}

impl HttpCatalog {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &FetchClient {
        &self.client
    }
}

#[async_trait]
impl CatalogService for HttpCatalog {
    async fn products(&self) -> Result<Vec<Product>, FetchError> {
        self.client.get_json("/products").await
    }

    async fn product(&self, id: ProductId) -> Result<Product, FetchError> {
        self.client.get_json(format!("/products/{}", id)).await
    }

    async fn stock_levels(&self) -> Result<Vec<StockEntry>, FetchError> {
        self.client.get_json("/stock").await
    }

    async fn stock(&self, id: ProductId) -> Result<StockEntry, FetchError> {
        self.client.get_json(format!("/stock/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn catalog_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "Tênis Leve", "price": 179.9, "image": "a.jpg"},
                {"id": 2, "title": "Tênis VR", "price": 139.9, "image": "b.jpg"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"id": 2, "title": "Tênis VR", "price": 139.9, "image": "b.jpg"}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stock"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "amount": 3},
                {"id": 2, "amount": 5}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stock/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2, "amount": 5})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products/9"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({})))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_list_endpoints() {
        let server = catalog_server().await;
        let catalog = HttpCatalog::new(FetchClient::new(server.uri()));

        let products = catalog.products().await.unwrap();
        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|p| p.amount == 0));

        let stock = catalog.stock_levels().await.unwrap();
        assert_eq!(stock, vec![StockEntry::new(1, 3), StockEntry::new(2, 5)]);
    }

    #[tokio::test]
    async fn test_single_item_endpoints() {
        let server = catalog_server().await;
        let catalog = HttpCatalog::new(FetchClient::new(server.uri()));

        let product = catalog.product(ProductId::new(2)).await.unwrap();
        assert_eq!(product.title, "Tênis VR");
        let stock = catalog.stock(ProductId::new(2)).await.unwrap();
        assert_eq!(stock.amount, 5);
    }

    #[tokio::test]
    async fn test_missing_product() {
        let server = catalog_server().await;
        let catalog = HttpCatalog::new(FetchClient::new(server.uri()));

        let err = catalog.product(ProductId::new(9)).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
