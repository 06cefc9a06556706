//! Cloud provider enumeration.

use std::fmt;
use std::str::FromStr;

/// Cloud platform hosting the current machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudProvider {
    /// Amazon Web Services
    Aws,
    /// Google Cloud Platform
    Gcp,
    /// Microsoft Azure
    Azure,
    /// No metadata service answered.
    Unknown,
}

impl CloudProvider {
    /// Whether a metadata service was found.
    pub fn is_known(self) -> bool {
        self != CloudProvider::Unknown
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudProvider::Aws => write!(f, "AWS"),
            CloudProvider::Gcp => write!(f, "GCP"),
            CloudProvider::Azure => write!(f, "Azure"),
            CloudProvider::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for CloudProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" => Ok(CloudProvider::Aws),
            "gcp" => Ok(CloudProvider::Gcp),
            "azure" => Ok(CloudProvider::Azure),
            _ => Err(format!(
                "unknown provider: {} (expected aws, gcp, or azure)",
                s
            )),
        }
    }
}
