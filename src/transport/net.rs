//! TCP and UDP tunnel transports: plain byte-in/byte-out bridges to a radio
//! front-end or its simulator.
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::time::Duration;

use super::Interface;
use crate::error::{TransportError, TransportResult};

const DEFAULT_MTU: usize = 1024;

enum TcpTunMode {
    Client,
    ListenOne { listener: TcpListener },
}

/// A TCP tunnel, either dialing a fixed remote (`client`) or accepting a
/// single inbound connection and then behaving like a connected stream
/// (`listen_one`).
pub struct TcpTun {
    name: String,
    mtu: usize,
    mode: TcpTunMode,
    stream: Option<TcpStream>,
}

impl TcpTun {
    /// Connect to `addr` immediately.
    pub fn client(name: impl Into<String>, addr: SocketAddr) -> TransportResult<Self> {
        let stream = TcpStream::connect(addr)?;
        Ok(Self {
            name: name.into(),
            mtu: DEFAULT_MTU,
            mode: TcpTunMode::Client,
            stream: Some(stream),
        })
    }

    /// Bind `addr` and wait to accept exactly one peer, lazily on first use.
    pub fn listen_one(name: impl Into<String>, addr: SocketAddr) -> TransportResult<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self {
            name: name.into(),
            mtu: DEFAULT_MTU,
            mode: TcpTunMode::ListenOne { listener },
            stream: None,
        })
    }

    pub fn with_mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu;
        self
    }

    fn ensure_connected(&mut self) -> TransportResult<&mut TcpStream> {
        if self.stream.is_none() {
            if let TcpTunMode::ListenOne { listener } = &self.mode {
                let (stream, _) = listener.accept()?;
                self.stream = Some(stream);
            }
        }
        self.stream.as_mut().ok_or(TransportError::Closed)
    }
}

impl Interface for TcpTun {
    fn send(&mut self, data: &[u8]) -> TransportResult<()> {
        let stream = self.ensure_connected()?;
        stream.write_all(data)?;
        Ok(())
    }

    fn recv(&mut self, timeout: Duration) -> TransportResult<Option<Vec<u8>>> {
        let mtu = self.mtu;
        let stream = self.ensure_connected()?;
        stream.set_read_timeout(Some(timeout))?;
        let mut buf = vec![0u8; mtu];
        match stream.read(&mut buf) {
            Ok(0) => Err(TransportError::Closed),
            Ok(n) => {
                buf.truncate(n);
                Ok(Some(buf))
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn mtu(&self) -> usize {
        self.mtu
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A bidirectional UDP tunnel with a configurable default remote peer.
pub struct UdpTun {
    name: String,
    mtu: usize,
    socket: UdpSocket,
    remote: SocketAddr,
}

impl UdpTun {
    /// AX100 uplink/downlink default UDP tunnel port.
    pub const DEFAULT_PORT: u16 = 2612;

    pub fn new(name: impl Into<String>, local: SocketAddr, remote: SocketAddr) -> TransportResult<Self> {
        let socket = UdpSocket::bind(local)?;
        Ok(Self {
            name: name.into(),
            mtu: DEFAULT_MTU,
            socket,
            remote,
        })
    }

    pub fn with_mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu;
        self
    }
}

impl Interface for UdpTun {
    fn send(&mut self, data: &[u8]) -> TransportResult<()> {
        self.socket.send_to(data, self.remote)?;
        Ok(())
    }

    fn recv(&mut self, timeout: Duration) -> TransportResult<Option<Vec<u8>>> {
        self.socket.set_read_timeout(Some(timeout))?;
        let mut buf = vec![0u8; self.mtu];
        match self.socket.recv_from(&mut buf) {
            Ok((n, _from)) => {
                buf.truncate(n);
                Ok(Some(buf))
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn mtu(&self) -> usize {
        self.mtu
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn udp_tun_round_trip_over_loopback() {
        let a_addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let b_addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let a_socket = UdpSocket::bind(a_addr).unwrap();
        let b_socket = UdpSocket::bind(b_addr).unwrap();
        let a_local = a_socket.local_addr().unwrap();
        let b_local = b_socket.local_addr().unwrap();
        drop(a_socket);
        drop(b_socket);

        let mut a = UdpTun::new("a", a_local, b_local).unwrap();
        let mut b = UdpTun::new("b", b_local, a_local).unwrap();

        a.send(b"ping").unwrap();
        let received = b.recv(Duration::from_secs(1)).unwrap();
        assert_eq!(received, Some(b"ping".to_vec()));
    }
}
