//! HTTP client utilities for the cart's product and stock lookups.
//!
//! Provides a small async API over `reqwest` with base-URL resolution and
//! buffered JSON responses.
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_data::FetchClient;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Stock {
//!     id: u64,
//!     amount: i64,
//! }
//!
//! let client = FetchClient::new("http://localhost:3333");
//!
//! let stock: Stock = client
//!     .get("/stock/1")
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod error;
mod request;
mod response;

use std::time::Duration;

use serde::de::DeserializeOwned;

pub use error::FetchError;
pub use request::RequestBuilder;
pub use response::Response;

/// HTTP client bound to one API base URL.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FetchClient {
    base_url: String,
    client: reqwest::Client,
    default_headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl FetchClient {
    /// Create a client for `base_url`. Requests have no timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            default_headers: vec![("Accept".to_string(), "application/json".to_string())],
            timeout: None,
        }
    }

    /// Apply a timeout to every request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a GET request. `path` is joined to the base URL unless it is
    /// already absolute.
    pub fn get(&self, path: impl AsRef<str>) -> RequestBuilder {
        RequestBuilder {
            client: self.client.clone(),
            url: self.resolve(path.as_ref()),
            headers: self.default_headers.clone(),
            query: Vec::new(),
            timeout: self.timeout,
        }
    }

    /// GET `path`, fail on non-2xx, and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: impl AsRef<str>) -> Result<T, FetchError> {
        self.get(path).send().await?.error_for_status()?.json()
    }

    fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, RequestBuilder, Response};
}
