//! Transport interfaces (component J): the uniform capability set through
//! which the AX100 link codec exchanges bytes with the world.
use std::time::Duration;

use crate::csp::CspHeaderV1;
use crate::error::TransportResult;

mod grc;
mod kiss;
mod loopback;
mod net;

pub use grc::GrcAX100;
pub use loopback::Loopback;
pub use net::{TcpTun, UdpTun};

#[cfg(feature = "serial")]
pub use kiss::SerialKISS;

/// A small capability set implemented by every transport variant. Avoids a
/// class hierarchy: each variant is a plain struct implementing this trait.
pub trait Interface {
    /// Send one frame. Blocks until the underlying channel accepts it.
    fn send(&mut self, data: &[u8]) -> TransportResult<()>;

    /// Receive one frame, waiting up to `timeout`. Returns `Ok(None)` if no
    /// frame arrives before the timeout elapses without treating that as an
    /// error; callers needing a hard failure should check elapsed time
    /// themselves or rely on [`crate::error::TransportError::Timeout`] from
    /// the underlying transport where applicable.
    fn recv(&mut self, timeout: Duration) -> TransportResult<Option<Vec<u8>>>;

    /// Maximum transmission unit in bytes for this interface.
    fn mtu(&self) -> usize;

    /// A human-readable name for logging and diagnostics.
    fn name(&self) -> &str;
}

/// Ground-station echo filter: a frame whose parsed header
/// reports `src == ground_addr` originated from the ground station itself
/// and must be discarded as a self-echo before any further processing.
pub fn is_self_echo(header: &CspHeaderV1, ground_addr: u8) -> bool {
    header.src == ground_addr
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::csp::header::{CspFlags, Priority};
    use crate::Endian;

    #[test]
    fn self_echo_is_detected() {
        let header = CspHeaderV1 {
            priority: Priority::Norm,
            src: 10,
            dst: 1,
            dport: 0,
            sport: 0,
            reserved: 0,
            flags: CspFlags::default(),
            endian: Endian::Big,
        };
        assert!(is_self_echo(&header, 10));
        assert!(!is_self_echo(&header, 1));
    }
}
