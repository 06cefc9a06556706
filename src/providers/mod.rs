//! Per-provider metadata adapters.

use std::net::IpAddr;
use std::sync::Arc;

use serde_json::Value;

use crate::config::MetadataConfig;
use crate::error::MetadataError;
use crate::field::{Field, FieldValue};
use crate::host::{self, HostResolver};
use crate::provider::CloudProvider;

pub mod aws;
pub mod azure;
pub mod gcp;

/// One provider's sentinel probe and field catalogue.
#[derive(Debug, Clone)]
pub enum ProviderAdapter {
    Aws(aws::Aws),
    Gcp(gcp::Gcp),
    Azure(azure::Azure),
}

impl ProviderAdapter {
    /// Build the adapter for `provider` from `config`.
    ///
    /// Returns `MetadataError::NotDetected` for [`CloudProvider::Unknown`].
    pub fn new(provider: CloudProvider, config: &MetadataConfig) -> Result<Self, MetadataError> {
        let timeout = config.timeout;
        match provider {
            CloudProvider::Aws => Ok(Self::Aws(aws::Aws::new(&config.aws_base_url, timeout)?)),
            CloudProvider::Gcp => Ok(Self::Gcp(gcp::Gcp::new(&config.gcp_base_url, timeout)?)),
            CloudProvider::Azure => Ok(Self::Azure(azure::Azure::new(
                &config.azure_base_url,
                timeout,
            )?)),
            CloudProvider::Unknown => Err(MetadataError::NotDetected),
        }
    }

    pub fn provider(&self) -> CloudProvider {
        match self {
            Self::Aws(_) => CloudProvider::Aws,
            Self::Gcp(_) => CloudProvider::Gcp,
            Self::Azure(_) => CloudProvider::Azure,
        }
    }

    /// Whether this provider's metadata service answers.
    pub async fn probe(&self) -> bool {
        match self {
            Self::Aws(aws) => aws.probe().await,
            Self::Gcp(gcp) => gcp.probe().await,
            Self::Azure(azure) => azure.probe().await,
        }
    }

    /// Fields this provider can answer, in report order.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Self::Aws(_) => aws::FIELDS,
            Self::Gcp(_) => gcp::FIELDS,
            Self::Azure(_) => azure::FIELDS,
        }
    }

    /// Fetch one field.
    ///
    /// GCP and Azure have no public hostname endpoint; it is derived by a
    /// reverse lookup of the public IP through `resolver`.
    pub async fn field(
        &self,
        field: Field,
        resolver: &Arc<dyn HostResolver>,
    ) -> Result<FieldValue, MetadataError> {
        match (self, field) {
            (Self::Aws(aws), field) => aws.field(field).await,
            (Self::Gcp(gcp), Field::PublicHostname) => {
                let address = gcp.field(Field::PublicIpAddress).await;
                reverse_hostname(address, resolver).await.map(FieldValue::Text)
            }
            (Self::Azure(azure), Field::PublicHostname) => {
                let address = azure.field(Field::PublicIpAddress).await;
                reverse_hostname(address, resolver).await.map(FieldValue::Text)
            }
            (Self::Gcp(gcp), field) => gcp.field(field).await,
            (Self::Azure(azure), field) => azure.field(field).await,
        }
    }

    /// Full JSON instance document.
    pub async fn instance_document(&self) -> Result<Value, MetadataError> {
        match self {
            Self::Aws(aws) => aws.instance_document().await,
            Self::Gcp(gcp) => gcp.instance_document().await,
            Self::Azure(azure) => azure.instance_document().await,
        }
    }
}

/// First PTR name for a fetched public IP.
///
/// A missing or empty address, or an address without a PTR record, is
/// [`MetadataError::NotFound`]; transport errors fetching the address pass
/// through.
async fn reverse_hostname(
    address: Result<FieldValue, MetadataError>,
    resolver: &Arc<dyn HostResolver>,
) -> Result<String, MetadataError> {
    let address = match address {
        Ok(FieldValue::Text(text)) if !text.is_empty() => text,
        Ok(_) => return Err(MetadataError::NotFound),
        Err(e) => return Err(e),
    };
    let address: IpAddr = address.parse().map_err(|_| MetadataError::NotFound)?;

    let names = host::blocking(resolver, move |r| r.reverse_lookup(address)).await?;
    names
        .into_iter()
        .next()
        .map(|name| name.trim_end_matches('.').to_string())
        .ok_or(MetadataError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_has_no_adapter() {
        let config = MetadataConfig::default();
        assert!(matches!(
            ProviderAdapter::new(CloudProvider::Unknown, &config),
            Err(MetadataError::NotDetected)
        ));
    }

    #[test]
    fn test_adapter_reports_its_provider() {
        let config = MetadataConfig::with_base_url("http://localhost:1234");
        for provider in [CloudProvider::Aws, CloudProvider::Gcp, CloudProvider::Azure] {
            let adapter = ProviderAdapter::new(provider, &config).unwrap();
            assert_eq!(adapter.provider(), provider);
            assert!(!adapter.fields().is_empty());
        }
    }
}
