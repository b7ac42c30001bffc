//! AX100 link codec (component I): composes the syncword, Golay length
//! field, scrambler, Reed-Solomon FEC, and link-layer HMAC/CRC trailers
//! around a payload buffer.
use log::{debug, warn};

use crate::crc32c::Crc32cEngine;
use crate::error::{Ax100Error, Ax100Result};
use crate::golay;
use crate::hmac32::HmacSha1_32;
use crate::randomizer::Ax100Scrambler;
use crate::rs_adapter::RsCodec;

/// The Attached Sync Marker prefixed to every syncword-enabled frame.
pub const ASM: [u8; 4] = [0x93, 0x0B, 0x51, 0xDE];

const RS_MAX_MESSAGE: usize = 223;
const RS_PARITY: usize = 32;

/// Every independently toggleable layer of the AX100 pipeline, plus the
/// key material backing the optional link HMAC trailer.
pub struct Ax100Config {
    pub hmac_key: Option<Vec<u8>>,
    pub crc: bool,
    pub reed_solomon: bool,
    pub scrambler: bool,
    pub length_field: bool,
    pub syncword: bool,
    pub prefill: usize,
    pub tailfill: usize,
    pub strict: bool,
    pub verbose: bool,
}

impl Default for Ax100Config {
    fn default() -> Self {
        Self {
            hmac_key: None,
            crc: false,
            reed_solomon: false,
            scrambler: false,
            length_field: false,
            syncword: false,
            prefill: 0,
            tailfill: 0,
            strict: true,
            verbose: false,
        }
    }
}

/// A stateless AX100 codec built from an [`Ax100Config`]. Both encode and
/// decode of a given frame MUST use a codec built from the same toggles;
/// the codec itself does not retain any state across calls.
pub struct Ax100Codec {
    hmac_engine: Option<HmacSha1_32>,
    crc_engine: Crc32cEngine,
    scrambler: Ax100Scrambler,
    rs: RsCodec,
    config: Ax100Config,
}

impl Ax100Codec {
    pub fn new(config: Ax100Config) -> Self {
        let hmac_engine = config.hmac_key.as_deref().map(HmacSha1_32::new);
        Self {
            hmac_engine,
            crc_engine: Crc32cEngine::default(),
            scrambler: Ax100Scrambler::default(),
            rs: RsCodec::new(),
            config,
        }
    }

    /// Encode `payload` (a serialized CSP packet or opaque bytes) into a
    /// complete AX100 frame, per the ordering in [`Ax100Config`]'s fields.
    pub fn encode(&self, payload: &[u8]) -> Ax100Result<Vec<u8>> {
        let mut x = payload.to_vec();

        if let Some(engine) = &self.hmac_engine {
            let tag = engine.mac(&x);
            x.extend_from_slice(&tag);
        }

        if self.config.crc {
            let tag = self.crc_engine.checksum(&x);
            x.extend_from_slice(&tag);
        }

        if self.config.reed_solomon {
            if x.len() > RS_MAX_MESSAGE {
                warn!(
                    "AX100 encode: payload {} bytes exceeds RS shortening limit, truncating to {}",
                    x.len(),
                    RS_MAX_MESSAGE
                );
                x.truncate(RS_MAX_MESSAGE);
            }
            let message_len = x.len();
            let codeword = self.rs.encode(&x)?;
            let pad = RS_MAX_MESSAGE - message_len;
            x = codeword[pad..].to_vec();
        }

        if self.config.scrambler {
            x = self.scrambler.apply(&x);
        }

        if self.config.length_field {
            if x.len() > 0x0FFF {
                return Err(Ax100Error::ShortFrame {
                    needed: 0,
                    have: x.len(),
                });
            }
            let codeword = golay::encode(x.len() as u16);
            let mut framed = vec![
                ((codeword >> 16) & 0xFF) as u8,
                ((codeword >> 8) & 0xFF) as u8,
                (codeword & 0xFF) as u8,
            ];
            framed.extend_from_slice(&x);
            x = framed;
        }

        if self.config.syncword {
            let mut framed = ASM.to_vec();
            framed.extend_from_slice(&x);
            x = framed;
        }

        let mut out = vec![0xAAu8; self.config.prefill];
        out.extend_from_slice(&x);
        out.extend(std::iter::repeat(0xAA).take(self.config.tailfill));
        Ok(out)
    }

    /// Decode a complete AX100 frame (after the caller has already stripped
    /// any idle preamble/postamble) back to the enclosed payload buffer.
    ///
    /// In strict mode, any layer failure returns `Err`. In lenient mode,
    /// layer failures are logged and `Ok(None)` is returned; the caller
    /// treats the frame as lost.
    pub fn decode(&self, frame: &[u8]) -> Ax100Result<Option<Vec<u8>>> {
        match self.decode_strict(frame) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if self.config.strict => Err(err),
            Err(err) => {
                warn!("AX100 decode: dropping frame: {err}");
                Ok(None)
            }
        }
    }

    fn decode_strict(&self, frame: &[u8]) -> Ax100Result<Vec<u8>> {
        let mut x = frame;

        if self.config.syncword {
            if x.len() < ASM.len() || x[..ASM.len()] != ASM {
                return Err(Ax100Error::SyncwordMismatch);
            }
            x = &x[ASM.len()..];
        }

        let mut x = x.to_vec();

        if self.config.length_field {
            if x.len() < 3 {
                return Err(Ax100Error::ShortFrame {
                    needed: 3,
                    have: x.len(),
                });
            }
            let codeword = ((x[0] as u32) << 16) | ((x[1] as u32) << 8) | (x[2] as u32);
            let (_corrected, errcnt) = golay::decode(codeword);
            if errcnt == golay::UNCORRECTABLE {
                return Err(Ax100Error::GolayUncorrectable);
            }
            if self.config.verbose && errcnt > 0 {
                debug!("AX100 decode: Golay length field corrected {errcnt} bit error(s)");
            }
            let declared_len = (codeword & 0xFFF) as usize;
            x = x[3..].to_vec();
            if x.len() < declared_len {
                return Err(Ax100Error::ShortFrame {
                    needed: declared_len,
                    have: x.len(),
                });
            }
            x.truncate(declared_len);
        }

        if self.config.scrambler {
            x = self.scrambler.apply(&x);
        }

        if self.config.reed_solomon {
            if x.len() < RS_PARITY {
                return Err(Ax100Error::ShortFrame {
                    needed: RS_PARITY,
                    have: x.len(),
                });
            }
            let message_len = x.len() - RS_PARITY;
            let pad = RS_MAX_MESSAGE - message_len;
            let mut padded = vec![0u8; pad];
            padded.extend_from_slice(&x);
            let decoded = self.rs.decode(&padded, message_len)?;
            if self.config.verbose && decoded.corrected_symbols > 0 {
                debug!(
                    "AX100 decode: Reed-Solomon corrected {} symbol error(s)",
                    decoded.corrected_symbols
                );
            }
            x = decoded.data;
        }

        if self.config.crc {
            if x.len() < 4 {
                return Err(Ax100Error::ShortFrame {
                    needed: 4,
                    have: x.len(),
                });
            }
            let split = x.len() - 4;
            let (rest, tag) = x.split_at(split);
            let expected = u32::from_be_bytes(tag.try_into().unwrap());
            let computed = self.crc_engine.checksum_u32(rest);
            if computed != expected {
                warn!("AX100 CRC mismatch: expected {expected:#010X}, computed {computed:#010X}");
                return Err(Ax100Error::CrcMismatch { expected, computed });
            }
            x = rest.to_vec();
        }

        if let Some(engine) = &self.hmac_engine {
            if x.len() < 4 {
                return Err(Ax100Error::ShortFrame {
                    needed: 4,
                    have: x.len(),
                });
            }
            let split = x.len() - 4;
            let (rest, tag) = x.split_at(split);
            let tag: [u8; 4] = tag.try_into().unwrap();
            if !engine.verify(rest, &tag) {
                warn!("AX100 HMAC mismatch");
                return Err(Ax100Error::HmacMismatch);
            }
            x = rest.to_vec();
        }

        Ok(x)
    }
}
