//! Detect which cloud provider hosts this machine and describe the instance.
//!
//! The crate probes the AWS, GCP, and Azure metadata services, picks the one
//! that answers, and reads a fixed catalogue of attributes from it: hostname,
//! IP addresses, instance ID, zone, machine type, and a few provider-specific
//! extras. Nothing is cached; every call goes back to the network.
//!
//! # Example
//!
//! ```ignore
//! use cloud_hostinfo::{detect_provider, CloudProvider, HostReport, MetadataConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cloud_hostinfo::MetadataError> {
//!     let config = MetadataConfig::default();
//!
//!     if detect_provider(&config).await? == CloudProvider::Unknown {
//!         println!("not a recognized cloud provider");
//!     }
//!
//!     // Provider fields plus local hostname and addresses
//!     let report = HostReport::collect(&config).await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! # Provider-Specific Behavior
//!
//! | Provider | Required header | Extra fields |
//! |----------|-----------------|--------------|
//! | AWS | none | image-id |
//! | GCP | `Metadata-Flavor: Google` | preemptible, tags |
//! | Azure | `Metadata: true` | offer, publisher, version, sku |

mod client;
mod config;
mod detector;
mod error;
mod field;
mod host;
mod metadata;
mod provider;
mod providers;
mod report;

pub use client::{MetadataClient, MetadataRequest, MetadataResponse};
pub use config::{MetadataConfig, AWS_BASE_URL, AZURE_BASE_URL, DEFAULT_TIMEOUT, GCP_BASE_URL};
pub use detector::detect_provider;
pub use error::MetadataError;
pub use field::{Field, FieldValue};
pub use host::{HostInfo, HostResolver, SystemResolver};
pub use metadata::CloudMetadata;
pub use provider::CloudProvider;
pub use providers::ProviderAdapter;
pub use report::{FieldResult, HostReport};
