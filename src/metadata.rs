//! CloudMetadata struct and core implementation.

use std::sync::Arc;

use serde_json::Value;

use crate::config::MetadataConfig;
use crate::detector::detect_provider;
use crate::error::MetadataError;
use crate::field::{Field, FieldValue};
use crate::host::{HostResolver, SystemResolver};
use crate::provider::CloudProvider;
use crate::providers::ProviderAdapter;

/// Main interface for reading instance attributes from a provider.
///
/// # Example
///
/// ```ignore
/// use cloud_hostinfo::{CloudMetadata, MetadataError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), MetadataError> {
///     let metadata = CloudMetadata::detect().await?;
///     println!("{} in {}", metadata.instance_id().await?, metadata.zone().await?);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CloudMetadata {
    adapter: ProviderAdapter,
    resolver: Arc<dyn HostResolver>,
}

impl CloudMetadata {
    /// Auto-detect the cloud provider with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::NotDetected` if no cloud provider is detected.
    pub async fn detect() -> Result<Self, MetadataError> {
        Self::detect_with_config(&MetadataConfig::default()).await
    }

    /// Auto-detect the cloud provider using a custom configuration.
    pub async fn detect_with_config(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let provider = detect_provider(config).await?;
        Self::new(provider, config)
    }

    /// Create an instance for a known provider without probing.
    pub fn new(provider: CloudProvider, config: &MetadataConfig) -> Result<Self, MetadataError> {
        Ok(Self {
            adapter: ProviderAdapter::new(provider, config)?,
            resolver: Arc::new(SystemResolver),
        })
    }

    /// Create a CloudMetadata instance for AWS with a custom base URL.
    pub fn aws_with_base_url(base_url: &str) -> Result<Self, MetadataError> {
        Self::new(CloudProvider::Aws, &MetadataConfig::with_base_url(base_url))
    }

    /// Create a CloudMetadata instance for GCP with a custom base URL.
    pub fn gcp_with_base_url(base_url: &str) -> Result<Self, MetadataError> {
        Self::new(CloudProvider::Gcp, &MetadataConfig::with_base_url(base_url))
    }

    /// Create a CloudMetadata instance for Azure with a custom base URL.
    pub fn azure_with_base_url(base_url: &str) -> Result<Self, MetadataError> {
        Self::new(CloudProvider::Azure, &MetadataConfig::with_base_url(base_url))
    }

    /// Replace the resolver used for reverse lookups.
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Get the cloud provider.
    pub fn provider(&self) -> CloudProvider {
        self.adapter.provider()
    }

    /// Get the resolver used for reverse lookups.
    pub fn resolver(&self) -> &Arc<dyn HostResolver> {
        &self.resolver
    }

    /// Check that the provider's metadata service still answers.
    pub async fn probe(&self) -> bool {
        self.adapter.probe().await
    }

    /// Fields this provider can answer.
    pub fn fields(&self) -> &'static [Field] {
        self.adapter.fields()
    }

    /// Fetch a single field.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::NotSupported` for fields outside the
    /// provider's catalogue and `MetadataError::NotFound` when the value is
    /// absent.
    pub async fn field(&self, field: Field) -> Result<FieldValue, MetadataError> {
        self.adapter.field(field, &self.resolver).await
    }

    /// Fetch the provider's full JSON instance document.
    pub async fn instance_document(&self) -> Result<Value, MetadataError> {
        self.adapter.instance_document().await
    }

    pub async fn fqdn(&self) -> Result<String, MetadataError> {
        self.text(Field::Fqdn).await
    }

    /// Public DNS name; GCP and Azure derive it by reverse lookup.
    pub async fn public_hostname(&self) -> Result<String, MetadataError> {
        self.text(Field::PublicHostname).await
    }

    pub async fn hostname(&self) -> Result<String, MetadataError> {
        self.text(Field::Hostname).await
    }

    pub async fn local_ip_address(&self) -> Result<String, MetadataError> {
        self.text(Field::LocalIpAddress).await
    }

    pub async fn public_ip_address(&self) -> Result<String, MetadataError> {
        self.text(Field::PublicIpAddress).await
    }

    pub async fn instance_id(&self) -> Result<String, MetadataError> {
        self.text(Field::InstanceId).await
    }

    pub async fn zone(&self) -> Result<String, MetadataError> {
        self.text(Field::Zone).await
    }

    pub async fn machine_type(&self) -> Result<String, MetadataError> {
        self.text(Field::MachineType).await
    }

    /// AMI ID (AWS only).
    pub async fn image_id(&self) -> Result<String, MetadataError> {
        self.text(Field::ImageId).await
    }

    /// Preemptible scheduling (GCP only).
    pub async fn is_preemptible(&self) -> Result<bool, MetadataError> {
        match self.field(Field::IsPreemptible).await? {
            FieldValue::Bool(value) => Ok(value),
            _ => Err(MetadataError::NotSupported),
        }
    }

    /// Network tags (GCP only).
    pub async fn tags(&self) -> Result<Vec<String>, MetadataError> {
        match self.field(Field::Tags).await? {
            FieldValue::List(tags) => Ok(tags),
            _ => Err(MetadataError::NotSupported),
        }
    }

    async fn text(&self, field: Field) -> Result<String, MetadataError> {
        match self.field(field).await? {
            FieldValue::Text(text) => Ok(text),
            _ => Err(MetadataError::NotSupported),
        }
    }
}
