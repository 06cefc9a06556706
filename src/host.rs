//! Operating-system view of the host: hostname, DNS, and interfaces.

use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use dns_lookup::{AddrInfoHints, LookupErrorKind};
use if_addrs::IfAddr;
use serde_json::{json, Value};

use crate::error::MetadataError;

/// Local name resolution and interface enumeration.
///
/// Calls may block; async callers should run them on a blocking thread.
pub trait HostResolver: fmt::Debug + Send + Sync {
    /// The kernel hostname.
    fn hostname(&self) -> io::Result<String>;

    /// Forward lookup of a name.
    fn lookup_host(&self, name: &str) -> io::Result<Vec<IpAddr>>;

    /// Canonical name reported by the resolver for `name`.
    fn canonical_name(&self, name: &str) -> io::Result<String>;

    /// Reverse (PTR) lookup. An empty list means no record.
    fn reverse_lookup(&self, address: IpAddr) -> io::Result<Vec<String>>;

    /// IPv4 addresses of non-loopback interfaces, down interfaces included.
    fn interface_ipv4(&self) -> io::Result<Vec<Ipv4Addr>>;
}

/// [`HostResolver`] backed by the system resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn hostname(&self) -> io::Result<String> {
        hostname::get()?
            .into_string()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "hostname is not utf-8"))
    }

    fn lookup_host(&self, name: &str) -> io::Result<Vec<IpAddr>> {
        dns_lookup::lookup_host(name)
    }

    fn canonical_name(&self, name: &str) -> io::Result<String> {
        let hints = AddrInfoHints {
            flags: libc::AI_CANONNAME,
            ..AddrInfoHints::default()
        };
        let addrs = dns_lookup::getaddrinfo(Some(name), None, Some(hints)).map_err(io::Error::from)?;
        for info in addrs {
            if let Some(canonical) = info?.canonname {
                return Ok(canonical);
            }
        }
        Ok(name.to_string())
    }

    fn reverse_lookup(&self, address: IpAddr) -> io::Result<Vec<String>> {
        let socket = SocketAddr::new(address, 0);
        match dns_lookup::getnameinfo(&socket, libc::NI_NUMERICSERV | libc::NI_NAMEREQD) {
            Ok((name, _)) => Ok(vec![name]),
            Err(e) if is_missing_record(e.kind()) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Interfaces that are down but still hold an address are not skipped.
    fn interface_ipv4(&self) -> io::Result<Vec<Ipv4Addr>> {
        let addrs = if_addrs::get_if_addrs()?
            .into_iter()
            .filter(|iface| !iface.is_loopback())
            .filter_map(|iface| match iface.addr {
                IfAddr::V4(v4) if !v4.ip.is_loopback() => Some(v4.ip),
                _ => None,
            })
            .collect();
        Ok(addrs)
    }
}

/// Whether a lookup failure only means the record does not exist.
///
/// Resolver outages (`EAI_AGAIN`, `EAI_FAIL`, ...) are real errors.
fn is_missing_record(kind: LookupErrorKind) -> bool {
    matches!(kind, LookupErrorKind::NoName | LookupErrorKind::NoData)
}

/// Run a resolver call on the blocking pool.
pub(crate) async fn blocking<T, F>(resolver: &Arc<dyn HostResolver>, f: F) -> Result<T, MetadataError>
where
    T: Send + 'static,
    F: FnOnce(&dyn HostResolver) -> io::Result<T> + Send + 'static,
{
    let resolver = Arc::clone(resolver);
    let result = tokio::task::spawn_blocking(move || f(resolver.as_ref()))
        .await
        .map_err(io::Error::other)?;
    Ok(result?)
}

/// Provider-agnostic host facts, gathered independently of cloud detection.
#[derive(Debug)]
pub struct HostInfo {
    pub hostname: Result<String, MetadataError>,
    pub canonical_name: Result<String, MetadataError>,
    pub addresses: Result<Vec<IpAddr>, MetadataError>,
    pub outbound_ipv4: Result<Ipv4Addr, MetadataError>,
}

impl HostInfo {
    /// Collect everything the resolver can tell about this host.
    ///
    /// Each entry fails on its own; a missing hostname only fails the
    /// lookups that depend on it.
    pub async fn collect(resolver: &Arc<dyn HostResolver>) -> Self {
        let hostname = blocking(resolver, |r| r.hostname()).await;

        let (canonical_name, addresses) = match &hostname {
            Ok(name) => {
                let cname_for = name.clone();
                let lookup_for = name.clone();
                (
                    blocking(resolver, move |r| r.canonical_name(&cname_for)).await,
                    blocking(resolver, move |r| r.lookup_host(&lookup_for)).await,
                )
            }
            Err(_) => (Err(MetadataError::NotFound), Err(MetadataError::NotFound)),
        };

        let outbound_ipv4 = blocking(resolver, |r| r.interface_ipv4())
            .await
            .and_then(|addrs| {
                addrs.into_iter().next().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        "are you connected to the network?",
                    )
                    .into()
                })
            });

        Self {
            hostname,
            canonical_name,
            addresses,
            outbound_ipv4,
        }
    }

    /// Render as JSON; failed entries become `null`.
    pub fn to_json(&self) -> Value {
        json!({
            "hostname": self.hostname.as_ref().ok(),
            "canonical-name": self.canonical_name.as_ref().ok(),
            "addresses": self
                .addresses
                .as_ref()
                .ok()
                .map(|addrs| addrs.iter().map(ToString::to_string).collect::<Vec<_>>()),
            "outbound-ipv4": self.outbound_ipv4.as_ref().ok().map(ToString::to_string),
        })
    }
}

impl fmt::Display for HostInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hostname: {}", show(&self.hostname))?;
        writeln!(f, "canonical-name: {}", show(&self.canonical_name))?;
        match &self.addresses {
            Ok(addrs) => {
                let addrs: Vec<String> = addrs.iter().map(ToString::to_string).collect();
                writeln!(f, "addresses: {}", addrs.join(", "))?;
            }
            Err(e) => writeln!(f, "addresses: <{}>", e)?,
        }
        write!(f, "outbound-ipv4: {}", show(&self.outbound_ipv4))
    }
}

fn show<T: fmt::Display>(value: &Result<T, MetadataError>) -> String {
    match value {
        Ok(value) => value.to_string(),
        Err(e) => format!("<{}>", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FixedResolver {
        interfaces: Vec<Ipv4Addr>,
    }

    impl HostResolver for FixedResolver {
        fn hostname(&self) -> io::Result<String> {
            Ok("web-1".to_string())
        }

        fn lookup_host(&self, _name: &str) -> io::Result<Vec<IpAddr>> {
            Ok(vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))])
        }

        fn canonical_name(&self, name: &str) -> io::Result<String> {
            Ok(format!("{}.example.internal", name))
        }

        fn reverse_lookup(&self, _address: IpAddr) -> io::Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn interface_ipv4(&self) -> io::Result<Vec<Ipv4Addr>> {
            Ok(self.interfaces.clone())
        }
    }

    #[test]
    fn test_missing_record_classification() {
        assert!(is_missing_record(LookupErrorKind::NoName));
        assert!(is_missing_record(LookupErrorKind::NoData));
        assert!(!is_missing_record(LookupErrorKind::Again));
        assert!(!is_missing_record(LookupErrorKind::Fail));
        assert!(!is_missing_record(LookupErrorKind::Memory));
        assert!(!is_missing_record(LookupErrorKind::System));
    }

    #[tokio::test]
    async fn test_collect_host_info() {
        let resolver: Arc<dyn HostResolver> = Arc::new(FixedResolver {
            interfaces: vec![Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(172, 17, 0, 1)],
        });
        let info = HostInfo::collect(&resolver).await;

        assert_eq!(info.hostname.as_deref().unwrap(), "web-1");
        assert_eq!(
            info.canonical_name.as_deref().unwrap(),
            "web-1.example.internal"
        );
        assert_eq!(
            info.addresses.as_ref().unwrap(),
            &vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))]
        );
        assert_eq!(*info.outbound_ipv4.as_ref().unwrap(), Ipv4Addr::new(10, 0, 0, 5));
    }

    #[tokio::test]
    async fn test_no_interfaces_is_an_error() {
        let resolver: Arc<dyn HostResolver> = Arc::new(FixedResolver {
            interfaces: Vec::new(),
        });
        let info = HostInfo::collect(&resolver).await;

        let err = info.outbound_ipv4.unwrap_err();
        assert!(err.to_string().contains("are you connected to the network?"));
        assert!(info.hostname.is_ok());
    }

    #[tokio::test]
    async fn test_to_json() {
        let resolver: Arc<dyn HostResolver> = Arc::new(FixedResolver {
            interfaces: Vec::new(),
        });
        let json = HostInfo::collect(&resolver).await.to_json();

        assert_eq!(json["hostname"], "web-1");
        assert_eq!(json["addresses"][0], "10.0.0.5");
        assert!(json["outbound-ipv4"].is_null());
    }
}
