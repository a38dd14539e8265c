//! HTTP request builder.

use std::time::Duration;

use crate::{FetchError, Response};

/// A GET request being assembled against a [`crate::FetchClient`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) client: reqwest::Client,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) timeout: Option<Duration>,
}

impl RequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Override the client's timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The resolved request URL, before query parameters.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send the request and buffer the response.
    ///
    /// Non-2xx statuses are returned as a normal [`Response`]; use
    /// [`Response::error_for_status`] to turn them into errors.
    pub async fn send(self) -> Result<Response, FetchError> {
        let url = reqwest::Url::parse(&self.url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.url, e)))?;

        let mut request = self.client.get(url);
        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = Response::from_reqwest(request.send().await?).await?;
        tracing::debug!(method = "GET", url = %self.url, status = response.status, "request completed");
        Ok(response)
    }
}
