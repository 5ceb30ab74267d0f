//! Router probes: how a connection test actually reaches a router

use crate::reconciler::{ConnectivityState, RouterApiStatus};
use async_trait::async_trait;
use chrono::Utc;
use routerdesk_db::entities::router_connection;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tracing::debug;

/// Default timeout for [`TcpProbe`]
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe errors (transport failures, not "router said no")
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Invalid probe target {0}")]
    InvalidTarget(String),

    #[error("Probe transport error: {0}")]
    Transport(String),
}

/// Addressing and credentials of the router under test
#[derive(Clone)]
pub struct ProbeTarget {
    pub router_ip: String,
    pub api_port: u16,
    pub username: String,
    pub password: String,
    pub use_ssl: bool,
}

// Password stays out of logs
impl fmt::Debug for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeTarget")
            .field("router_ip", &self.router_ip)
            .field("api_port", &self.api_port)
            .field("username", &self.username)
            .field("use_ssl", &self.use_ssl)
            .finish_non_exhaustive()
    }
}

impl From<&router_connection::Model> for ProbeTarget {
    fn from(record: &router_connection::Model) -> Self {
        Self {
            router_ip: record.router_ip.clone(),
            api_port: u16::try_from(record.api_port).unwrap_or_default(),
            username: record.api_username.clone(),
            password: record.api_password.clone(),
            use_ssl: record.api_ssl,
        }
    }
}

impl ProbeTarget {
    fn report(&self, reachable: bool, permissions_valid: bool) -> RouterApiStatus {
        RouterApiStatus {
            status: if reachable {
                ConnectivityState::Connected
            } else {
                ConnectivityState::Disconnected
            },
            router_ip: self.router_ip.clone(),
            api_port: self.api_port,
            username: self.username.clone(),
            api_enabled: reachable,
            api_ssl_enabled: self.use_ssl,
            ping_status: reachable,
            permissions_valid,
            last_checked: Utc::now(),
        }
    }
}

/// Something that can check whether a router's API answers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouterProbe: Send + Sync {
    async fn probe(&self, target: &ProbeTarget) -> Result<RouterApiStatus, ProbeError>;
}

/// Always reports the router as reachable and healthy
///
/// Addressing fields are echoed from the target, so persisting the report
/// leaves them unchanged.
#[derive(Debug, Default, Clone)]
pub struct StubProbe;

#[async_trait]
impl RouterProbe for StubProbe {
    async fn probe(&self, target: &ProbeTarget) -> Result<RouterApiStatus, ProbeError> {
        debug!(?target, "Stub probe reporting connected");
        Ok(target.report(true, true))
    }
}

/// TCP reachability check of `router_ip:api_port`
///
/// Does not speak the RouterOS API, so `permissions_valid` is always false.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl RouterProbe for TcpProbe {
    async fn probe(&self, target: &ProbeTarget) -> Result<RouterApiStatus, ProbeError> {
        if target.router_ip.trim().is_empty() || target.api_port == 0 {
            return Err(ProbeError::InvalidTarget(format!(
                "{}:{}",
                target.router_ip, target.api_port
            )));
        }

        let address = (target.router_ip.as_str(), target.api_port);
        let reachable = match tokio::time::timeout(self.timeout, TcpStream::connect(address)).await
        {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                debug!(?target, error = %e, "Router refused connection");
                false
            }
            Err(_) => {
                debug!(?target, timeout = ?self.timeout, "Router probe timed out");
                false
            }
        };

        Ok(target.report(reachable, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn target(router_ip: &str, api_port: u16) -> ProbeTarget {
        ProbeTarget {
            router_ip: router_ip.to_string(),
            api_port,
            username: "admin".to_string(),
            password: "hunter22".to_string(),
            use_ssl: false,
        }
    }

    #[tokio::test]
    async fn test_stub_probe_echoes_target() {
        let report = StubProbe.probe(&target("10.0.0.1", 8728)).await.unwrap();

        assert!(report.is_connected());
        assert_eq!(report.router_ip, "10.0.0.1");
        assert_eq!(report.api_port, 8728);
        assert_eq!(report.username, "admin");
        assert!(report.ping_status && report.api_enabled && report.permissions_valid);
    }

    #[test]
    fn test_target_debug_hides_password() {
        let rendered = format!("{:?}", target("10.0.0.1", 8728));
        assert!(!rendered.contains("hunter22"));
    }

    #[tokio::test]
    async fn test_tcp_probe_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let report = TcpProbe::default()
            .probe(&target("127.0.0.1", port))
            .await
            .unwrap();

        assert!(report.is_connected());
        assert!(!report.permissions_valid);
    }

    #[tokio::test]
    async fn test_tcp_probe_unreachable() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let report = TcpProbe::new(Duration::from_secs(1))
            .probe(&target("127.0.0.1", port))
            .await
            .unwrap();

        assert_eq!(report.status, ConnectivityState::Disconnected);
        assert!(!report.ping_status);
    }

    #[tokio::test]
    async fn test_tcp_probe_rejects_empty_address() {
        let result = TcpProbe::default().probe(&target("  ", 8728)).await;
        assert!(matches!(result, Err(ProbeError::InvalidTarget(_))));
    }
}
