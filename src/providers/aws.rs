//! AWS instance metadata service.
//!
//! IMDS answers plain-text paths under `/latest/meta-data/` and needs no
//! request header.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::client::MetadataClient;
use crate::error::MetadataError;
use crate::field::{Field, FieldValue};

/// Metadata root, also used as the sentinel path.
const METADATA_PATH: &str = "/latest/meta-data/";

/// Instance identity document path.
const IDENTITY_DOCUMENT_PATH: &str = "/latest/dynamic/instance-identity/document";

/// Fields AWS can answer.
pub const FIELDS: &[Field] = &[
    Field::Fqdn,
    Field::PublicHostname,
    Field::Hostname,
    Field::LocalIpAddress,
    Field::PublicIpAddress,
    Field::InstanceId,
    Field::Zone,
    Field::MachineType,
    Field::ImageId,
];

#[derive(Debug, Deserialize)]
struct IdentityDocument {
    #[serde(rename = "imageId", default)]
    image_id: Option<String>,
}

/// AWS metadata adapter.
#[derive(Debug, Clone)]
pub struct Aws {
    client: MetadataClient,
}

impl Aws {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MetadataError> {
        Ok(Self {
            client: MetadataClient::new(base_url, timeout, None)?,
        })
    }

    /// Probe the metadata root.
    pub async fn probe(&self) -> bool {
        self.client.probe(&self.client.request(METADATA_PATH)).await
    }

    pub async fn field(&self, field: Field) -> Result<FieldValue, MetadataError> {
        let name = match field {
            Field::Fqdn => "local-hostname",
            Field::PublicHostname => "public-hostname",
            Field::Hostname => "hostname",
            Field::LocalIpAddress => "local-ipv4",
            Field::PublicIpAddress => "public-ipv4",
            Field::InstanceId => "instance-id",
            Field::Zone => "placement/availability-zone",
            Field::MachineType => "instance-type",
            Field::ImageId => return self.image_id().await.map(FieldValue::Text),
            _ => return Err(MetadataError::NotSupported),
        };
        self.meta_data(name).await.map(FieldValue::Text)
    }

    /// AMI the instance was launched from.
    ///
    /// An identity document without `imageId` yields an empty string.
    pub async fn image_id(&self) -> Result<String, MetadataError> {
        let document: IdentityDocument = self
            .client
            .get_json(&self.client.request(IDENTITY_DOCUMENT_PATH))
            .await?;
        Ok(document.image_id.unwrap_or_default())
    }

    /// The instance identity document.
    pub async fn instance_document(&self) -> Result<Value, MetadataError> {
        self.client
            .get_json(&self.client.request(IDENTITY_DOCUMENT_PATH))
            .await
    }

    async fn meta_data(&self, name: &str) -> Result<String, MetadataError> {
        let path = format!("{}{}", METADATA_PATH, name);
        self.client.get_text(&self.client.request(&path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(METADATA_PATH, "/latest/meta-data/");
        assert!(IDENTITY_DOCUMENT_PATH.starts_with("/latest/dynamic/"));
    }

    #[test]
    fn test_identity_document_without_image_id() {
        let document: IdentityDocument =
            serde_json::from_str(r#"{"instanceId": "i-0abc"}"#).unwrap();
        assert_eq!(document.image_id, None);
    }

    #[test]
    fn test_catalogue_has_no_gcp_or_azure_fields() {
        assert!(FIELDS.contains(&Field::ImageId));
        assert!(!FIELDS.contains(&Field::Tags));
        assert!(!FIELDS.contains(&Field::Sku));
    }
}
