//! Aggregated host report.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::config::MetadataConfig;
use crate::detector::detect_provider;
use crate::error::MetadataError;
use crate::field::{Field, FieldValue};
use crate::host::{HostInfo, HostResolver, SystemResolver};
use crate::metadata::CloudMetadata;
use crate::provider::CloudProvider;

/// Outcome of fetching one field.
#[derive(Debug)]
pub struct FieldResult {
    pub field: Field,
    pub value: Result<FieldValue, MetadataError>,
}

impl FieldResult {
    /// Whether the field has no value on this instance.
    pub fn is_absent(&self) -> bool {
        matches!(&self.value, Err(e) if e.is_not_found())
    }

    /// The value, if it was fetched.
    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref().ok()
    }
}

/// Everything known about this host from one detection and collection cycle.
#[derive(Debug)]
pub struct HostReport {
    provider: CloudProvider,
    fields: Vec<FieldResult>,
    host: HostInfo,
}

impl HostReport {
    /// Detect the provider, then collect its fields and local host info.
    pub async fn collect(config: &MetadataConfig) -> Result<Self, MetadataError> {
        Self::collect_with_resolver(config, Arc::new(SystemResolver)).await
    }

    /// Like [`HostReport::collect`] with a custom resolver.
    pub async fn collect_with_resolver(
        config: &MetadataConfig,
        resolver: Arc<dyn HostResolver>,
    ) -> Result<Self, MetadataError> {
        let provider = detect_provider(config).await?;
        let metadata = match provider {
            CloudProvider::Unknown => None,
            provider => Some(CloudMetadata::new(provider, config)?.with_resolver(resolver.clone())),
        };
        let fields = match &metadata {
            Some(metadata) => collect_fields(metadata).await,
            None => Vec::new(),
        };
        let host = HostInfo::collect(&resolver).await;

        Ok(Self {
            provider,
            fields,
            host,
        })
    }

    /// Build a report for an already-resolved provider.
    pub async fn for_metadata(metadata: &CloudMetadata) -> Self {
        Self {
            provider: metadata.provider(),
            fields: collect_fields(metadata).await,
            host: HostInfo::collect(metadata.resolver()).await,
        }
    }

    pub fn provider(&self) -> CloudProvider {
        self.provider
    }

    pub fn fields(&self) -> &[FieldResult] {
        &self.fields
    }

    pub fn host(&self) -> &HostInfo {
        &self.host
    }

    /// Look up one field's result.
    pub fn get(&self, field: Field) -> Option<&FieldResult> {
        self.fields.iter().find(|result| result.field == field)
    }

    /// Field name to rendered value; absent and failed fields map to `None`.
    pub fn to_map(&self) -> BTreeMap<&'static str, Option<String>> {
        self.fields
            .iter()
            .map(|result| (result.field.name(), result.value().map(ToString::to_string)))
            .collect()
    }

    /// Render as JSON.
    pub fn to_json(&self) -> Value {
        let mut fields = Map::new();
        let mut errors = Map::new();
        for result in &self.fields {
            match &result.value {
                Ok(value) => {
                    fields.insert(result.field.name().to_string(), json!(value));
                }
                Err(e) => {
                    fields.insert(result.field.name().to_string(), Value::Null);
                    if !result.is_absent() {
                        errors.insert(result.field.name().to_string(), json!(e.to_string()));
                    }
                }
            }
        }

        json!({
            "provider": self.provider.is_known().then(|| self.provider.to_string()),
            "fields": fields,
            "errors": errors,
            "host": self.host.to_json(),
        })
    }
}

impl fmt::Display for HostReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.provider.is_known() {
            writeln!(f, "provider: {}", self.provider)?;
        } else {
            writeln!(f, "provider: {}", MetadataError::NotDetected)?;
        }
        for result in &self.fields {
            match &result.value {
                Ok(value) => writeln!(f, "{}: {}", result.field, value)?,
                Err(e) => writeln!(f, "{}: <{}>", result.field, e)?,
            }
        }
        let host = self.host.to_string();
        let mut lines = host.lines().peekable();
        while let Some(line) = lines.next() {
            write!(f, "host.{}", line)?;
            if lines.peek().is_some() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Fetch every field in the provider's catalogue, keeping each outcome.
async fn collect_fields(metadata: &CloudMetadata) -> Vec<FieldResult> {
    let mut results = Vec::with_capacity(metadata.fields().len());
    for &field in metadata.fields() {
        let value = metadata.field(field).await;
        if let Err(e) = &value {
            if !e.is_not_found() {
                warn!(%field, error = %e, "field unavailable");
            }
        }
        results.push(FieldResult { field, value });
    }
    results
}
