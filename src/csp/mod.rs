//! CSP packet codec: protocol header v1 plus optional XTEA, HMAC and CRC
//! trailers (components G and H).
pub mod header;
pub mod packet;

pub use header::{CspFlags, CspHeaderV1, Priority};
pub use packet::{CspPacket, CspPacketConfig, DecodedCspPacket};
