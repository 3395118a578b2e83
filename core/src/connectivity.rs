//! Network availability checks consulted before each fetch cycle.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::debug;
use url::Url;

pub trait ConnectivityCheck {
    fn is_connected(&self) -> bool;
}

/// Assumes the network is always there. Useful when the transport itself
/// is the only source of truth.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConnected;

impl ConnectivityCheck for AlwaysConnected {
    fn is_connected(&self) -> bool {
        true
    }
}

/// A flag the host flips from its own network callbacks.
#[derive(Debug)]
pub struct HostConnectivity {
    online: AtomicBool,
}

impl HostConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }
}

impl Default for HostConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityCheck for HostConnectivity {
    fn is_connected(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }
}

/// Reports connected when a TCP connection to `host:port` can be opened.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1500);

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Probe the host serving `url`. `None` for URLs without a host.
    pub fn for_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        Some(Self::new(host, port))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ConnectivityCheck for TcpProbe {
    fn is_connected(&self) -> bool {
        let addrs = match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!(host = %self.host, error = %e, "connectivity probe: resolve failed");
                return false;
            }
        };
        // The stream is dropped immediately; only reachability matters.
        let reachable = addrs
            .into_iter()
            .any(|addr| TcpStream::connect_timeout(&addr, self.timeout).is_ok());
        debug!(host = %self.host, port = self.port, reachable, "connectivity probe");
        reachable
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn host_flag_toggles() {
        let check = HostConnectivity::new(false);
        assert!(!check.is_connected());
        check.set(true);
        assert!(check.is_connected());
    }

    #[test]
    fn probe_sees_listening_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(TcpProbe::new("127.0.0.1", port).is_connected());
    }

    #[test]
    fn probe_fails_on_closed_port() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let probe = TcpProbe::new("127.0.0.1", port).with_timeout(Duration::from_millis(200));
        assert!(!probe.is_connected());
    }

    #[test]
    fn probe_from_url_uses_default_port() {
        let url = Url::parse("https://api.themoviedb.org/3/discover/movie").unwrap();
        let probe = TcpProbe::for_url(&url).unwrap();
        assert_eq!(probe.host, "api.themoviedb.org");
        assert_eq!(probe.port, 443);
    }
}
