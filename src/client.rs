//! HTTP client wrapper for metadata requests.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::MetadataError;

/// A single GET against a metadata service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRequest {
    pub url: String,
    pub headers: Vec<(&'static str, &'static str)>,
    pub query: Vec<(&'static str, &'static str)>,
    pub timeout: Duration,
}

impl MetadataRequest {
    /// Append a query parameter.
    pub fn query(mut self, key: &'static str, value: &'static str) -> Self {
        self.query.push((key, value));
        self
    }
}

/// Status and body of a metadata response that reached the server.
///
/// Transport failures never produce a response; they surface as
/// [`MetadataError::Request`] or [`MetadataError::Timeout`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataResponse {
    pub status: u16,
    pub body: String,
}

impl MetadataResponse {
    /// Whether the server reported the path as absent.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Trimmed body, or [`MetadataError::NotFound`] on 404.
    ///
    /// Any other status counts as success.
    pub fn into_text(self) -> Result<String, MetadataError> {
        if self.is_not_found() {
            return Err(MetadataError::NotFound);
        }
        Ok(self.body.trim().to_string())
    }
}

/// HTTP client bound to one provider's metadata service.
///
/// Every request carries the provider's required header (if any) and the
/// same timeout, so probes and field getters share one convention.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    inner: Client,
    base_url: String,
    header: Option<(&'static str, &'static str)>,
    timeout: Duration,
}

impl MetadataClient {
    /// Create a client for the given base URL, timeout, and required header.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        header: Option<(&'static str, &'static str)>,
    ) -> Result<Self, MetadataError> {
        let inner = Client::builder()
            .danger_accept_invalid_certs(false)
            .build()?;
        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
            header,
            timeout,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build a request for a path below the base URL.
    pub fn request(&self, path: &str) -> MetadataRequest {
        MetadataRequest {
            url: format!("{}{}", self.base_url, path),
            headers: self.header.into_iter().collect(),
            query: Vec::new(),
            timeout: self.timeout,
        }
    }

    /// Issue exactly one GET. No retries.
    pub async fn fetch(&self, request: &MetadataRequest) -> Result<MetadataResponse, MetadataError> {
        let mut builder = self
            .inner
            .get(&request.url)
            .timeout(request.timeout)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(*name, *value);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        debug!(url = %request.url, status, "metadata response");

        Ok(MetadataResponse { status, body })
    }

    /// Fetch a path and return its trimmed body.
    pub async fn get_text(&self, request: &MetadataRequest) -> Result<String, MetadataError> {
        self.fetch(request).await?.into_text()
    }

    /// Fetch a path and deserialize its body as JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        request: &MetadataRequest,
    ) -> Result<T, MetadataError> {
        let text = self.get_text(request).await?;
        serde_json::from_str(&text).map_err(MetadataError::from)
    }

    /// Reachability check against a sentinel request.
    ///
    /// Anything but a transport failure or a 404 counts as an answer; the
    /// body is not inspected.
    pub async fn probe(&self, request: &MetadataRequest) -> bool {
        match self.fetch(request).await {
            Ok(response) => !response.is_not_found(),
            Err(e) => {
                debug!(url = %request.url, error = %e, "probe failed");
                false
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> MetadataError {
    if e.is_timeout() {
        MetadataError::Timeout
    } else {
        MetadataError::Request(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_strips_trailing_slash() {
        let client =
            MetadataClient::new("http://localhost:8080/", Duration::from_secs(5), None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_request_carries_header_and_timeout() {
        let client = MetadataClient::new(
            "http://localhost:8080",
            Duration::from_secs(7),
            Some(("Metadata-Flavor", "Google")),
        )
        .unwrap();
        let request = client.request("/computeMetadata/v1/instance/id");

        assert_eq!(
            request.url,
            "http://localhost:8080/computeMetadata/v1/instance/id"
        );
        assert_eq!(request.headers, vec![("Metadata-Flavor", "Google")]);
        assert_eq!(request.timeout, Duration::from_secs(7));
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_request_without_header() {
        let client =
            MetadataClient::new("http://localhost:8080", Duration::from_secs(5), None).unwrap();
        let request = client.request("/latest/meta-data/").query("a", "b");
        assert!(request.headers.is_empty());
        assert_eq!(request.query, vec![("a", "b")]);
    }

    #[test]
    fn test_response_into_text() {
        let ok = MetadataResponse {
            status: 200,
            body: "  i-1234\n".to_string(),
        };
        assert_eq!(ok.into_text().unwrap(), "i-1234");

        let missing = MetadataResponse {
            status: 404,
            body: "Not Found".to_string(),
        };
        assert!(matches!(missing.into_text(), Err(MetadataError::NotFound)));
    }

    #[test]
    fn test_non_2xx_is_not_rejected() {
        let response = MetadataResponse {
            status: 500,
            body: "oops".to_string(),
        };
        assert!(!response.is_not_found());
        assert_eq!(response.into_text().unwrap(), "oops");
    }
}
