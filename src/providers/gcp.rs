//! GCP metadata server.

use std::time::Duration;

use serde_json::Value;

use crate::client::MetadataClient;
use crate::error::MetadataError;
use crate::field::{Field, FieldValue};

/// Instance metadata root, also used as the sentinel path.
const INSTANCE_PATH: &str = "/computeMetadata/v1/instance";

/// Required header for GCP metadata requests.
const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";

/// Required header value for GCP metadata requests.
const METADATA_FLAVOR_VALUE: &str = "Google";

/// Fields GCP can answer.
pub const FIELDS: &[Field] = &[
    Field::Fqdn,
    Field::PublicHostname,
    Field::Hostname,
    Field::LocalIpAddress,
    Field::PublicIpAddress,
    Field::InstanceId,
    Field::Zone,
    Field::MachineType,
    Field::IsPreemptible,
    Field::Tags,
];

/// GCP metadata adapter.
#[derive(Debug, Clone)]
pub struct Gcp {
    client: MetadataClient,
}

impl Gcp {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MetadataError> {
        Ok(Self {
            client: MetadataClient::new(
                base_url,
                timeout,
                Some((METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE)),
            )?,
        })
    }

    pub async fn probe(&self) -> bool {
        self.client.probe(&self.client.request(INSTANCE_PATH)).await
    }

    /// Fetch a field. [`Field::PublicHostname`] is derived by the caller
    /// from [`Field::PublicIpAddress`].
    pub async fn field(&self, field: Field) -> Result<FieldValue, MetadataError> {
        let name = match field {
            Field::Fqdn => "hostname",
            Field::Hostname => "name",
            Field::LocalIpAddress => "network-interfaces/0/ip",
            Field::PublicIpAddress => "network-interfaces/0/access-configs/0/external-ip",
            Field::InstanceId => "id",
            Field::Zone => "zone",
            Field::MachineType => "machine-type",
            Field::IsPreemptible => return self.is_preemptible().await.map(FieldValue::Bool),
            Field::Tags => return self.tags().await.map(FieldValue::List),
            _ => return Err(MetadataError::NotSupported),
        };
        self.instance(name).await.map(FieldValue::Text)
    }

    /// Only the exact value `TRUE` means preemptible.
    pub async fn is_preemptible(&self) -> Result<bool, MetadataError> {
        let text = self.instance("scheduling/preemptible").await?;
        Ok(parse_preemptible(&text))
    }

    /// Network tags, one per line.
    pub async fn tags(&self) -> Result<Vec<String>, MetadataError> {
        let request = self
            .client
            .request(&format!("{}/tags", INSTANCE_PATH))
            .query("alt", "text");
        let text = self.client.get_text(&request).await?;
        Ok(parse_tags(&text))
    }

    /// The whole instance tree as JSON.
    pub async fn instance_document(&self) -> Result<Value, MetadataError> {
        let request = self
            .client
            .request(&format!("{}/", INSTANCE_PATH))
            .query("recursive", "true");
        self.client.get_json(&request).await
    }

    async fn instance(&self, name: &str) -> Result<String, MetadataError> {
        let path = format!("{}/{}", INSTANCE_PATH, name);
        self.client.get_text(&self.client.request(&path)).await
    }
}

fn parse_preemptible(text: &str) -> bool {
    text == "TRUE"
}

fn parse_tags(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
