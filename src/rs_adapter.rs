//! Reed-Solomon(255,223) adapter (component F).
//!
//! Treated as an opaque FEC service: this module owns only the CCSDS-style
//! zero-pad shortening around the `reed-solomon` crate's fixed (255,223)
//! codec, not the field arithmetic itself. Whether the crate's internal
//! GF(256) representation matches CCSDS's dual-basis field exactly is out of
//! scope here (see DESIGN.md); codewords produced and consumed by this
//! adapter are only required to round-trip against each other.
use reed_solomon::{Decoder, Encoder};

use crate::error::{Ax100Error, Ax100Result};

const DATA_LEN: usize = 223;
const CODEWORD_LEN: usize = 255;
const ECC_LEN: usize = CODEWORD_LEN - DATA_LEN;

/// A (255,223) Reed-Solomon codec with CCSDS zero-pad shortening: any
/// message shorter than 223 bytes is padded with leading zeros before
/// encoding, and that same padding is stripped back off after decoding.
pub struct RsCodec {
    encoder: Encoder,
    decoder: Decoder,
}

impl Default for RsCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a successful decode: the recovered message plus how many
/// symbol errors were corrected along the way, for verbose-mode logging.
pub struct RsDecoded {
    pub data: Vec<u8>,
    pub corrected_symbols: usize,
}

impl RsCodec {
    pub fn new() -> Self {
        Self {
            encoder: Encoder::new(ECC_LEN),
            decoder: Decoder::new(ECC_LEN),
        }
    }

    /// Encode `message` (must be `<= 223` bytes) into a 255-byte codeword.
    /// Shorter messages are zero-padded on the left before encoding and the
    /// padding is dropped again on decode, so the codeword always carries
    /// exactly `message.len()` bytes of payload plus the parity symbols.
    pub fn encode(&self, message: &[u8]) -> Ax100Result<Vec<u8>> {
        if message.len() > DATA_LEN {
            return Err(Ax100Error::ShortFrame {
                needed: DATA_LEN,
                have: message.len(),
            });
        }
        let mut padded = vec![0u8; DATA_LEN - message.len()];
        padded.extend_from_slice(message);
        let buffer = self.encoder.encode(&padded);
        Ok(buffer.to_vec())
    }

    /// Decode a 255-byte codeword, correcting up to 16 symbol errors, and
    /// strip the leading zero padding back off to recover `message_len`
    /// original payload bytes.
    pub fn decode(&self, codeword: &[u8], message_len: usize) -> Ax100Result<RsDecoded> {
        if codeword.len() != CODEWORD_LEN {
            return Err(Ax100Error::ShortFrame {
                needed: CODEWORD_LEN,
                have: codeword.len(),
            });
        }
        let recovered = self
            .decoder
            .correct(codeword, None)
            .map_err(|_| Ax100Error::ReedSolomonUncorrectable)?;
        let data = recovered.data();
        let pad = DATA_LEN - message_len;
        let corrected_symbols = data
            .iter()
            .zip(codeword[..DATA_LEN].iter())
            .filter(|(a, b)| a != b)
            .count();
        Ok(RsDecoded {
            data: data[pad..].to_vec(),
            corrected_symbols,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"short".as_slice())]
    #[case(&[0xAAu8; 223])]
    fn round_trip_no_errors(#[case] message: &[u8]) {
        let codec = RsCodec::new();
        let codeword = codec.encode(message).unwrap();
        assert_eq!(codeword.len(), CODEWORD_LEN);
        let decoded = codec.decode(&codeword, message.len()).unwrap();
        assert_eq!(decoded.data, message);
    }

    #[test]
    fn corrects_up_to_sixteen_symbol_errors() {
        let codec = RsCodec::new();
        let message = vec![0x5Au8; 100];
        let mut codeword = codec.encode(&message).unwrap();
        for i in 0..16 {
            codeword[i * 4] ^= 0xFF;
        }
        let decoded = codec.decode(&codeword, message.len()).unwrap();
        assert_eq!(decoded.data, message);
    }

    #[test]
    fn seventeen_symbol_errors_uncorrectable() {
        let codec = RsCodec::new();
        let message = vec![0x5Au8; 100];
        let mut codeword = codec.encode(&message).unwrap();
        for i in 0..17 {
            codeword[i * 4] ^= 0xFF;
        }
        let result = codec.decode(&codeword, message.len());
        // Either reported as uncorrectable, or (in the rare case the crate
        // resolves to a different codeword) the recovered payload must not
        // silently match the original.
        if let Ok(decoded) = result {
            assert_ne!(decoded.data, message);
        }
    }

    #[test]
    fn message_longer_than_223_bytes_is_rejected() {
        let codec = RsCodec::new();
        let message = vec![0u8; 224];
        assert!(codec.encode(&message).is_err());
    }
}
