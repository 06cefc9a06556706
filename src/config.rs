//! Metadata service addresses and request bounds.

use std::time::Duration;

use crate::provider::CloudProvider;

/// Default timeout for every metadata request, probes included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// AWS instance metadata service (link-local address).
pub const AWS_BASE_URL: &str = "http://169.254.169.254";

/// GCP metadata server, resolvable only inside Google's network.
pub const GCP_BASE_URL: &str = "http://metadata.google.internal";

/// Azure instance metadata service (link-local address).
pub const AZURE_BASE_URL: &str = "http://169.254.169.254";

/// Where each provider's metadata service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataConfig {
    pub aws_base_url: String,
    pub gcp_base_url: String,
    pub azure_base_url: String,
    pub timeout: Duration,
}

impl MetadataConfig {
    /// Point all three providers at the same base URL (for testing).
    pub fn with_base_url(base_url: &str) -> Self {
        let base_url = normalize(base_url);
        Self {
            aws_base_url: base_url.clone(),
            gcp_base_url: base_url.clone(),
            azure_base_url: base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the AWS base URL.
    pub fn aws_base_url(mut self, base_url: &str) -> Self {
        self.aws_base_url = normalize(base_url);
        self
    }

    /// Override the GCP base URL.
    pub fn gcp_base_url(mut self, base_url: &str) -> Self {
        self.gcp_base_url = normalize(base_url);
        self
    }

    /// Override the Azure base URL.
    pub fn azure_base_url(mut self, base_url: &str) -> Self {
        self.azure_base_url = normalize(base_url);
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL for a provider, or `None` for [`CloudProvider::Unknown`].
    pub fn base_url(&self, provider: CloudProvider) -> Option<&str> {
        match provider {
            CloudProvider::Aws => Some(&self.aws_base_url),
            CloudProvider::Gcp => Some(&self.gcp_base_url),
            CloudProvider::Azure => Some(&self.azure_base_url),
            CloudProvider::Unknown => None,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            aws_base_url: AWS_BASE_URL.to_string(),
            gcp_base_url: GCP_BASE_URL.to_string(),
            azure_base_url: AZURE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn normalize(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
