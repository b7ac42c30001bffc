#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
//! CSP packet codec and AX100 link-layer codec for a GomSpace-style
//! smallsat radio link.
//!
//! Two pipelines compose leaf-to-root:
//! `raw bytes <-> [ax100] <-> CSP frame bytes <-> [csp] <-> (header, payload)`.

pub mod ax100;
#[cfg(any(feature = "async-codec", feature = "tokio-codec"))]
#[cfg_attr(
    docsrs,
    doc(cfg(any(feature = "async-codec", feature = "tokio-codec")))
)]
/// Stream/Sink framing for AX100 frames, for `asynchronous-codec` and
/// `tokio-util::codec` consumers.
pub mod codec;
pub mod crc32c;
pub mod csp;
pub mod error;
pub mod golay;
pub mod hmac32;
pub mod randomizer;
pub mod rs_adapter;
pub mod transport;
pub mod xtea;

pub use ax100::{Ax100Codec, Ax100Config};
pub use csp::{CspHeaderV1, CspPacket, CspPacketConfig, Priority};
pub use error::{Ax100Error, Ax100Result, CspError, CspResult, TransportError, TransportResult};

/// Serialization byte order for a header or checksum. CSP and AX100 both
/// default to big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

/// How a codec layer reacts to a verification failure (CRC/HMAC mismatch,
/// uncorrectable FEC, syncword mismatch).
///
/// In [`DecodeMode::Strict`], any failure is raised to the caller as a
/// typed error and the partially-decoded buffer is discarded. In
/// [`DecodeMode::Lenient`], the failure is logged and the best-effort
/// decoded bytes are surfaced for inspection rather than raised — useful
/// for receive pipelines that want to log and move on rather than abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    Strict,
    Lenient,
}
