//! Azure instance metadata service.

use std::time::Duration;

use serde_json::Value;

use crate::client::{MetadataClient, MetadataRequest};
use crate::error::MetadataError;
use crate::field::{Field, FieldValue};

/// Instance metadata root, also used as the sentinel path.
const INSTANCE_PATH: &str = "/metadata/instance";

/// API version query parameter.
const API_VERSION: &str = "2021-02-01";

/// Required header for Azure metadata requests.
const METADATA_HEADER: &str = "Metadata";

/// Required header value for Azure metadata requests.
const METADATA_VALUE: &str = "true";

/// Fields Azure can answer.
pub const FIELDS: &[Field] = &[
    Field::PublicHostname,
    Field::Hostname,
    Field::LocalIpAddress,
    Field::PublicIpAddress,
    Field::InstanceId,
    Field::Zone,
    Field::MachineType,
    Field::Offer,
    Field::Publisher,
    Field::Version,
    Field::Sku,
];

/// Azure metadata adapter.
#[derive(Debug, Clone)]
pub struct Azure {
    client: MetadataClient,
}

impl Azure {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MetadataError> {
        Ok(Self {
            client: MetadataClient::new(base_url, timeout, Some((METADATA_HEADER, METADATA_VALUE)))?,
        })
    }

    pub async fn probe(&self) -> bool {
        self.client.probe(&self.versioned(INSTANCE_PATH)).await
    }

    /// Fetch a field. [`Field::PublicHostname`] is derived by the caller
    /// from [`Field::PublicIpAddress`].
    pub async fn field(&self, field: Field) -> Result<FieldValue, MetadataError> {
        let name = match field {
            Field::Hostname => "compute/name",
            Field::LocalIpAddress => "network/interface/0/ipv4/ipAddress/0/privateIpAddress",
            Field::PublicIpAddress => "network/interface/0/ipv4/ipAddress/0/publicIpAddress",
            Field::InstanceId => "compute/vmId",
            Field::Zone => "compute/location",
            Field::MachineType => "compute/vmSize",
            Field::Offer => "compute/offer",
            Field::Publisher => "compute/publisher",
            Field::Version => "compute/version",
            Field::Sku => "compute/sku",
            _ => return Err(MetadataError::NotSupported),
        };
        let request = self
            .versioned(&format!("{}/{}", INSTANCE_PATH, name))
            .query("format", "text");
        self.client.get_text(&request).await.map(FieldValue::Text)
    }

    /// The whole instance document as JSON.
    pub async fn instance_document(&self) -> Result<Value, MetadataError> {
        self.client.get_json(&self.versioned(INSTANCE_PATH)).await
    }

    fn versioned(&self, path: &str) -> MetadataRequest {
        self.client.request(path).query("api-version", API_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_request() {
        let azure = Azure::new("http://localhost:8080", Duration::from_secs(5)).unwrap();
        let request = azure.versioned(INSTANCE_PATH);

        assert_eq!(request.url, "http://localhost:8080/metadata/instance");
        assert_eq!(request.query, vec![("api-version", "2021-02-01")]);
        assert_eq!(request.headers, vec![("Metadata", "true")]);
    }

    #[test]
    fn test_largest_catalogue() {
        assert_eq!(FIELDS.len(), 11);
        assert!(!FIELDS.contains(&Field::Fqdn));
    }
}
