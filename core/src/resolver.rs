//! Host name resolution.
//!
//! Resolution is a collaborator behind the `Resolve` trait. `SystemResolver`
//! asks the platform resolver and keeps the first IPv4 address;
//! `StaticResolver` answers from a fixed table and never touches the network.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs};

use crate::error::HttpError;

/// A resolved IPv4 connect target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    addr: SocketAddrV4,
}

impl Endpoint {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self {
            addr: SocketAddrV4::new(ip, port),
        }
    }

    pub fn ip(&self) -> Ipv4Addr {
        *self.addr.ip()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(self.addr)
    }
}

/// Turns a host name and port into an `Endpoint`.
pub trait Resolve: Send + Sync {
    fn resolve(&self, host: &str, port: u16) -> Result<Endpoint, HttpError>;
}

/// Platform name resolution via `ToSocketAddrs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn resolve(&self, host: &str, port: u16) -> Result<Endpoint, HttpError> {
        let addrs = (host, port).to_socket_addrs().map_err(|e| HttpError::Resolve {
            host: host.to_string(),
            reason: e.to_string(),
        })?;

        for addr in addrs {
            if let SocketAddr::V4(v4) = addr {
                tracing::debug!(host, addr = %v4, "resolved host");
                return Ok(Endpoint { addr: v4 });
            }
        }

        Err(HttpError::Resolve {
            host: host.to_string(),
            reason: "no IPv4 address".to_string(),
        })
    }
}

/// Fixed host table. Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Ipv4Addr>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: pin `host` to `ip`.
    pub fn with_host(mut self, host: &str, ip: Ipv4Addr) -> Self {
        self.hosts.insert(host.to_lowercase(), ip);
        self
    }
}

impl Resolve for StaticResolver {
    fn resolve(&self, host: &str, port: u16) -> Result<Endpoint, HttpError> {
        match self.hosts.get(&host.to_lowercase()) {
            Some(ip) => Ok(Endpoint::new(*ip, port)),
            None => Err(HttpError::Resolve {
                host: host.to_string(),
                reason: "host not in table".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn system_resolver_accepts_ipv4_literals() {
        let endpoint = SystemResolver.resolve("127.0.0.1", 8080).unwrap();
        assert_eq!(endpoint.ip(), Ipv4Addr::LOCALHOST);
        assert_eq!(endpoint.port(), 8080);
        assert_eq!(endpoint.socket_addr().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn system_resolver_skips_ipv6_only_results() {
        let err = SystemResolver.resolve("::1", 80).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }

    #[test]
    fn static_resolver_pins_hosts() {
        let resolver = StaticResolver::new().with_host("Example.com", Ipv4Addr::new(10, 0, 0, 7));
        let endpoint = resolver.resolve("example.COM", 80).unwrap();
        assert_eq!(endpoint, Endpoint::new(Ipv4Addr::new(10, 0, 0, 7), 80));
    }

    #[test]
    fn static_resolver_misses_are_resolution_errors() {
        let err = StaticResolver::new().resolve("nowhere", 80).unwrap_err();
        assert!(matches!(err, HttpError::Resolve { ref host, .. } if host == "nowhere"));
    }
}
