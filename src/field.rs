//! Named instance attributes and their values.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// An instance attribute exposed by at least one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Fqdn,
    PublicHostname,
    Hostname,
    LocalIpAddress,
    PublicIpAddress,
    InstanceId,
    Zone,
    MachineType,
    /// AWS only.
    ImageId,
    /// GCP only.
    IsPreemptible,
    /// GCP only.
    Tags,
    /// Azure only.
    Offer,
    /// Azure only.
    Publisher,
    /// Azure only.
    Version,
    /// Azure only.
    Sku,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::Fqdn,
        Field::PublicHostname,
        Field::Hostname,
        Field::LocalIpAddress,
        Field::PublicIpAddress,
        Field::InstanceId,
        Field::Zone,
        Field::MachineType,
        Field::ImageId,
        Field::IsPreemptible,
        Field::Tags,
        Field::Offer,
        Field::Publisher,
        Field::Version,
        Field::Sku,
    ];

    /// Stable name used in reports and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Field::Fqdn => "fqdn",
            Field::PublicHostname => "public-hostname",
            Field::Hostname => "hostname",
            Field::LocalIpAddress => "local-ip",
            Field::PublicIpAddress => "public-ip",
            Field::InstanceId => "instance-id",
            Field::Zone => "zone",
            Field::MachineType => "machine-type",
            Field::ImageId => "image-id",
            Field::IsPreemptible => "preemptible",
            Field::Tags => "tags",
            Field::Offer => "offer",
            Field::Publisher => "publisher",
            Field::Version => "version",
            Field::Sku => "sku",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown field: {}", s))
    }
}

/// Value of a fetched field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Bool(value) => write!(f, "{}", value),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trips_through_from_str() {
        for field in Field::ALL {
            assert_eq!(field.name().parse::<Field>(), Ok(*field));
        }
    }

    #[test]
    fn test_unknown_field() {
        assert!("colour".parse::<Field>().is_err());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FieldValue::Text("n1".into()).to_string(), "n1");
        assert_eq!(FieldValue::Bool(true).to_string(), "true");
        assert_eq!(
            FieldValue::List(vec!["http".into(), "https".into()]).to_string(),
            "http, https"
        );
        assert_eq!(FieldValue::List(Vec::new()).to_string(), "");
    }

    #[test]
    fn test_value_serializes_untagged() {
        assert_eq!(
            serde_json::to_string(&FieldValue::Text("a".into())).unwrap(),
            "\"a\""
        );
        assert_eq!(
            serde_json::to_string(&FieldValue::Bool(false)).unwrap(),
            "false"
        );
        assert_eq!(
            serde_json::to_string(&FieldValue::List(vec!["x".into()])).unwrap(),
            "[\"x\"]"
        );
    }
}
