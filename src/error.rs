//! Error taxonomy shared by the CSP packet codec, the AX100 link codec, and
//! the transport layer.
use std::io::Error as IoError;
use thiserror::Error;

/// A CSP packet codec [`Result`], conveniently wrapping [`CspError`].
pub type CspResult<T> = std::result::Result<T, CspError>;

/// A AX100 link codec [`Result`], conveniently wrapping [`Ax100Error`].
pub type Ax100Result<T> = std::result::Result<T, Ax100Error>;

/// A transport [`Result`], conveniently wrapping [`TransportError`].
pub type TransportResult<T> = std::result::Result<T, TransportError>;

#[derive(Error, Debug)]
/// Errors which can occur while encoding or decoding a [`crate::csp::packet::CspPacket`].
pub enum CspError {
    #[error("I/O error during CSP packet decoding")]
    Io(#[from] IoError),
    #[error("frame too short: need at least {needed} bytes, have {have}")]
    ShortFrame { needed: usize, have: usize },
    #[error("CSP CRC mismatch: expected {expected:#010X}, computed {computed:#010X}")]
    CrcMismatch { expected: u32, computed: u32 },
    #[error("CSP HMAC mismatch")]
    HmacMismatch,
    #[error("header field {field} value {value} exceeds its {bits}-bit width")]
    FieldOutOfRange {
        field: &'static str,
        value: u32,
        bits: u32,
    },
}

#[derive(Error, Debug)]
/// Errors which can occur while encoding or decoding an [`crate::ax100::frame::Ax100Frame`].
pub enum Ax100Error {
    #[error("I/O error during AX100 frame decoding")]
    Io(#[from] IoError),
    #[error("frame too short: need at least {needed} bytes, have {have}")]
    ShortFrame { needed: usize, have: usize },
    #[error("attached sync marker mismatch")]
    SyncwordMismatch,
    #[error("Golay(24,12) length field uncorrectable")]
    GolayUncorrectable,
    #[error("Reed-Solomon(255,223) codeword uncorrectable")]
    ReedSolomonUncorrectable,
    #[error("AX100 CRC mismatch: expected {expected:#010X}, computed {computed:#010X}")]
    CrcMismatch { expected: u32, computed: u32 },
    #[error("AX100 HMAC mismatch")]
    HmacMismatch,
    #[error(transparent)]
    Csp(#[from] CspError),
}

#[derive(Error, Debug)]
/// Errors which can occur on a [`crate::transport::Interface`].
pub enum TransportError {
    #[error("I/O error on transport")]
    Io(#[from] IoError),
    #[error("transport receive timed out")]
    Timeout,
    #[error("transport is closed")]
    Closed,
    #[error(transparent)]
    Ax100(#[from] Ax100Error),
}
