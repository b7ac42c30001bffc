//! CRC-32C (Castagnoli) engine (component A).
//!
//! Polynomial `0x1EDC6F41`, init `0xFFFFFFFF`, reflected input/output, final
//! XOR `0xFFFFFFFF` — the same parameters the `crc` crate ships as
//! [`crc::CRC_32_ISCSI`].
use crc::{Crc, CRC_32_ISCSI};

use crate::Endian;

/// A pure CRC-32C checksum engine with a configurable serialization
/// [`Endian`]. Holds no state between calls; cheap to construct and to share
/// across threads.
#[derive(Clone, Copy)]
pub struct Crc32cEngine {
    endian: Endian,
}

impl Default for Crc32cEngine {
    fn default() -> Self {
        Self::new(Endian::Big)
    }
}

impl Crc32cEngine {
    /// Create an engine that serializes its checksum in `endian` byte order.
    /// CSP and AX100 both default to big-endian.
    pub fn new(endian: Endian) -> Self {
        Self { endian }
    }

    /// Compute the raw 32-bit CRC-32C value over `bytes`.
    pub fn checksum_u32(&self, bytes: &[u8]) -> u32 {
        const CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);
        CASTAGNOLI.checksum(bytes)
    }

    /// Compute the CRC-32C checksum over `bytes`, serialized as 4 bytes in
    /// this engine's configured [`Endian`].
    pub fn checksum(&self, bytes: &[u8]) -> [u8; 4] {
        let value = self.checksum_u32(bytes);
        match self.endian {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        }
    }
}
