//! CSP packet codec (component H): compose/parse header, payload, MAC and
//! CRC trailers.
use log::{debug, warn};

use crate::crc32c::Crc32cEngine;
use crate::csp::header::{CspFlags, CspHeaderV1, Priority};
use crate::error::{CspError, CspResult};
use crate::hmac32::HmacSha1_32;
use crate::xtea::XteaCtrEngine;
use crate::{DecodeMode, Endian};

/// Everything needed to construct a [`CspPacket`] for sending: addressing,
/// the application payload, which optional trailers are active, and the key
/// material (if any) backing HMAC/XTEA.
pub struct CspPacketConfig {
    pub src: u8,
    pub dst: u8,
    pub dport: u8,
    pub sport: u8,
    pub priority: Priority,
    pub payload: Vec<u8>,
    pub hmac_key: Option<Vec<u8>>,
    pub xtea_key: Option<Vec<u8>>,
    pub crc: bool,
    pub rdp: bool,
    pub header_endian: Endian,
    pub crc_include_header: bool,
    pub crc_endian: Endian,
    pub strict: bool,
}

impl Default for CspPacketConfig {
    fn default() -> Self {
        Self {
            src: 0,
            dst: 0,
            dport: 0,
            sport: 0,
            priority: Priority::Norm,
            payload: Vec::new(),
            hmac_key: None,
            xtea_key: None,
            crc: false,
            rdp: false,
            header_endian: Endian::Big,
            crc_include_header: false,
            crc_endian: Endian::Big,
            strict: true,
        }
    }
}

/// The result of decoding a wire buffer: the parsed header, the recovered
/// payload, and whether each configured trailer verified. In lenient mode a
/// `Some(false)` means the trailer was present but did not match, and the
/// payload is still the best-effort recovered bytes rather than cleared.
pub struct DecodedCspPacket {
    pub header: CspHeaderV1,
    pub payload: Vec<u8>,
    pub hmac_ok: Option<bool>,
    pub crc_ok: Option<bool>,
}

/// A CSP packet with its bound codec engines. Flags on the header are
/// authoritative: they determine which trailers are present on the wire,
/// regardless of which engines happen to be bound on this instance. If a
/// flag is set but the matching engine is absent, the trailer is passed
/// through unverified.
pub struct CspPacket {
    pub header: CspHeaderV1,
    pub payload: Vec<u8>,
    hmac_engine: Option<HmacSha1_32>,
    xtea_engine: Option<XteaCtrEngine>,
    crc_engine: Option<Crc32cEngine>,
    crc_include_header: bool,
    mode: DecodeMode,
}

impl CspPacket {
    /// Build a packet ready to [`CspPacket::encode`] from `config`.
    pub fn from_config(config: CspPacketConfig) -> Self {
        let hmac_engine = config.hmac_key.as_deref().map(HmacSha1_32::new);
        let xtea_engine = config.xtea_key.as_deref().map(XteaCtrEngine::new);
        let flags = CspFlags {
            hmac: hmac_engine.is_some(),
            xtea: xtea_engine.is_some(),
            rdp: config.rdp,
            crc: config.crc,
        };
        let header = CspHeaderV1 {
            priority: config.priority,
            src: config.src,
            dst: config.dst,
            dport: config.dport,
            sport: config.sport,
            reserved: 0,
            flags,
            endian: config.header_endian,
        };
        let mode = if config.strict {
            DecodeMode::Strict
        } else {
            DecodeMode::Lenient
        };
        Self {
            header,
            payload: config.payload,
            hmac_engine,
            xtea_engine,
            crc_engine: config.crc.then(|| Crc32cEngine::new(config.crc_endian)),
            crc_include_header: config.crc_include_header,
            mode,
        }
    }

    /// Bind decode-side engines onto an otherwise-bare packet shell, for use
    /// with [`CspPacket::decode`].
    pub fn with_engines(
        hmac_engine: Option<HmacSha1_32>,
        xtea_engine: Option<XteaCtrEngine>,
        crc_engine: Option<Crc32cEngine>,
        crc_include_header: bool,
        mode: DecodeMode,
    ) -> Self {
        Self {
            header: CspHeaderV1 {
                priority: Priority::Norm,
                src: 0,
                dst: 0,
                dport: 0,
                sport: 0,
                reserved: 0,
                flags: CspFlags::default(),
                endian: Endian::Big,
            },
            payload: Vec::new(),
            hmac_engine,
            xtea_engine,
            crc_engine,
            crc_include_header,
            mode,
        }
    }

    /// Serialize this packet to its wire form: `header || payload' || [hmac4] || [crc4]`,
    /// where `payload'` is ciphertext if the XTEA flag is set.
    pub fn encode(&self) -> CspResult<Vec<u8>> {
        let header_bytes = self.header.serialize()?;

        let mut body = if self.header.flags.xtea {
            match &self.xtea_engine {
                Some(engine) => engine.encrypt(&self.payload),
                None => self.payload.clone(),
            }
        } else {
            self.payload.clone()
        };

        if self.header.flags.hmac {
            if let Some(engine) = &self.hmac_engine {
                let tag = engine.mac(&body);
                body.extend_from_slice(&tag);
            }
        }

        if self.header.flags.crc {
            if let Some(engine) = &self.crc_engine {
                let crc_input: Vec<u8> = if self.crc_include_header {
                    header_bytes.iter().chain(body.iter()).copied().collect()
                } else {
                    body.clone()
                };
                let tag = engine.checksum(&crc_input);
                body.extend_from_slice(&tag);
            }
        }

        let mut out = Vec::with_capacity(header_bytes.len() + body.len());
        out.extend_from_slice(&header_bytes);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Parse a wire buffer, stripping trailers right-to-left: CRC, then
    /// HMAC, then unconditional XTEA decryption.
    pub fn decode(&self, bytes: &[u8], header_endian: Endian) -> CspResult<DecodedCspPacket> {
        let header = CspHeaderV1::parse(bytes, header_endian)?;
        let mut body = bytes[CspHeaderV1::WIRE_LEN..].to_vec();
        let header_bytes = header.serialize()?;

        let mut crc_ok = None;
        if header.flags.crc {
            if body.len() < 4 {
                return Err(CspError::ShortFrame {
                    needed: 4,
                    have: body.len(),
                });
            }
            let split = body.len() - 4;
            let (rest, tag) = body.split_at(split);
            let expected = u32::from_be_bytes(tag.try_into().unwrap());
            if let Some(engine) = &self.crc_engine {
                let crc_input: Vec<u8> = if self.crc_include_header {
                    header_bytes.iter().chain(rest.iter()).copied().collect()
                } else {
                    rest.to_vec()
                };
                let computed = engine.checksum_u32(&crc_input);
                let ok = computed == expected;
                crc_ok = Some(ok);
                if !ok {
                    warn!("CSP CRC mismatch: expected {expected:#010X}, computed {computed:#010X}");
                    if self.mode == DecodeMode::Strict {
                        return Err(CspError::CrcMismatch { expected, computed });
                    }
                }
                body = rest.to_vec();
            }
            // else: no engine bound, trailer stays in `body` unverified.
        }

        let mut hmac_ok = None;
        if header.flags.hmac {
            if body.len() < 4 {
                return Err(CspError::ShortFrame {
                    needed: 4,
                    have: body.len(),
                });
            }
            let split = body.len() - 4;
            let (rest, tag) = body.split_at(split);
            if let Some(engine) = &self.hmac_engine {
                let tag: [u8; 4] = tag.try_into().unwrap();
                let ok = engine.verify(rest, &tag);
                hmac_ok = Some(ok);
                if !ok {
                    warn!("CSP HMAC mismatch");
                    if self.mode == DecodeMode::Strict {
                        return Err(CspError::HmacMismatch);
                    }
                }
                body = rest.to_vec();
            }
            // else: no engine bound, trailer stays in `body` unverified.
        }

        if header.flags.xtea {
            if let Some(engine) = &self.xtea_engine {
                body = engine.decrypt(&body);
            }
        }

        debug!(
            "decoded CSP packet src={} dst={} dport={} sport={}",
            header.src, header.dst, header.dport, header.sport
        );

        Ok(DecodedCspPacket {
            header,
            payload: body,
            hmac_ok,
            crc_ok,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(payload: &[u8]) -> CspPacketConfig {
        CspPacketConfig {
            src: 1,
            dst: 10,
            dport: 7,
            sport: 16,
            priority: Priority::Norm,
            payload: payload.to_vec(),
            ..CspPacketConfig::default()
        }
    }

    #[test]
    fn round_trip_no_trailers() {
        let packet = CspPacket::from_config(config(b"hello csp"));
        let wire = packet.encode().unwrap();
        let decoded = packet.decode(&wire, Endian::Big).unwrap();
        assert_eq!(decoded.payload, b"hello csp");
        assert_eq!(decoded.crc_ok, None);
        assert_eq!(decoded.hmac_ok, None);
    }

    #[test]
    fn round_trip_with_crc() {
        let mut cfg = config(b"with crc");
        cfg.crc = true;
        let packet = CspPacket::from_config(cfg);
        let wire = packet.encode().unwrap();
        let decoded = packet.decode(&wire, Endian::Big).unwrap();
        assert_eq!(decoded.payload, b"with crc");
        assert_eq!(decoded.crc_ok, Some(true));
    }

    #[test]
    fn round_trip_with_hmac_and_xtea() {
        let mut cfg = config(b"secret payload");
        cfg.hmac_key = Some(b"hmac-key".to_vec());
        cfg.xtea_key = Some(b"xtea-key".to_vec());
        let packet = CspPacket::from_config(cfg);
        let wire = packet.encode().unwrap();
        let decoded = packet.decode(&wire, Endian::Big).unwrap();
        assert_eq!(decoded.payload, b"secret payload");
        assert_eq!(decoded.hmac_ok, Some(true));
    }

    #[test]
    fn strict_mode_raises_on_crc_mismatch() {
        let mut cfg = config(b"payload");
        cfg.crc = true;
        cfg.strict = true;
        let packet = CspPacket::from_config(cfg);
        let mut wire = packet.encode().unwrap();
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;
        assert!(matches!(
            packet.decode(&wire, Endian::Big),
            Err(CspError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn lenient_mode_preserves_payload_on_crc_mismatch() {
        let mut cfg = config(b"payload");
        cfg.crc = true;
        cfg.strict = false;
        let packet = CspPacket::from_config(cfg);
        let mut wire = packet.encode().unwrap();
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;
        let decoded = packet.decode(&wire, Endian::Big).unwrap();
        assert_eq!(decoded.crc_ok, Some(false));
        assert_eq!(decoded.payload, b"payload");
    }

    #[test]
    fn unbound_engine_passes_trailer_through_unverified() {
        let mut cfg = config(b"payload");
        cfg.hmac_key = Some(b"sender-key".to_vec());
        let sender = CspPacket::from_config(cfg);
        let wire = sender.encode().unwrap();

        let receiver = CspPacket::with_engines(None, None, None, false, DecodeMode::Lenient);
        let decoded = receiver.decode(&wire, Endian::Big).unwrap();
        assert_eq!(decoded.hmac_ok, None);
        assert_eq!(decoded.payload.len(), b"payload".len() + 4);
    }
}
