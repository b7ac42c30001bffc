//! AX100 link-layer codec: idle fill, Attached Sync Marker, Golay length
//! field, CCSDS scrambler, Reed-Solomon FEC, and optional link-layer HMAC
//! and CRC trailers (component I).
pub mod frame;

pub use frame::{Ax100Codec, Ax100Config};
