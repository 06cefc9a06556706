//! Cloud provider detection.

use tracing::info;

use crate::config::MetadataConfig;
use crate::error::MetadataError;
use crate::provider::CloudProvider;
use crate::providers::ProviderAdapter;

/// Probe every provider's sentinel path and return the one that answers.
///
/// Probes run concurrently and the first provider to answer wins; the
/// remaining probes are dropped. AWS and Azure share the link-local address, and Azure
/// IMDS answers the AWS sentinel with a 400, so those two are awaited
/// together and Azure wins when both answer. [`CloudProvider::Unknown`] is
/// returned only after every probe has failed or timed out. Nothing is
/// cached: each call probes again.
///
/// # Errors
///
/// Fails only if an HTTP client cannot be constructed.
pub async fn detect_provider(config: &MetadataConfig) -> Result<CloudProvider, MetadataError> {
    let aws = ProviderAdapter::new(CloudProvider::Aws, config)?;
    let gcp = ProviderAdapter::new(CloudProvider::Gcp, config)?;
    let azure = ProviderAdapter::new(CloudProvider::Azure, config)?;

    let link_local = async {
        match tokio::join!(aws.probe(), azure.probe()) {
            (_, true) => Some(CloudProvider::Azure),
            (true, false) => Some(CloudProvider::Aws),
            (false, false) => None,
        }
    };

    let provider = tokio::select! {
        true = gcp.probe() => CloudProvider::Gcp,
        Some(provider) = link_local => provider,
        else => CloudProvider::Unknown,
    };

    info!(%provider, "provider detection finished");
    Ok(provider)
}
