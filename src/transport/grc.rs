//! TCP client bridge to a DSP flowgraph exposing a raw-bytes PDU socket.
use std::net::SocketAddr;
use std::time::Duration;

use super::net::TcpTun;
use super::Interface;
use crate::error::TransportResult;

/// AX100 TCP bridge default port.
pub const DEFAULT_PORT: u16 = 52001;
const DEFAULT_MTU: usize = 1024;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// A TCP client to a GNU Radio AX100 flowgraph's raw-bytes PDU socket.
/// Thin wrapper over [`TcpTun`] carrying this transport's documented
/// defaults: port 52001, 1024-byte MTU, 1-second receive timeout.
pub struct GrcAX100 {
    inner: TcpTun,
    default_timeout: Duration,
}

impl GrcAX100 {
    pub fn connect(host: &str) -> TransportResult<Self> {
        let addr: SocketAddr = format!("{host}:{DEFAULT_PORT}").parse().map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid host")
        })?;
        Self::connect_addr(addr)
    }

    pub fn connect_addr(addr: SocketAddr) -> TransportResult<Self> {
        let inner = TcpTun::client("grc-ax100", addr)?.with_mtu(DEFAULT_MTU);
        Ok(Self {
            inner,
            default_timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Receive using this transport's documented default 1-second timeout.
    pub fn recv_default(&mut self) -> TransportResult<Option<Vec<u8>>> {
        self.inner.recv(self.default_timeout)
    }
}

impl Interface for GrcAX100 {
    fn send(&mut self, data: &[u8]) -> TransportResult<()> {
        self.inner.send(data)
    }

    fn recv(&mut self, timeout: Duration) -> TransportResult<Option<Vec<u8>>> {
        self.inner.recv(timeout)
    }

    fn mtu(&self) -> usize {
        self.inner.mtu()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
