//! XTEA-CTR engine (component C): a stream cipher built from the XTEA block
//! cipher run in counter mode.
//!
//! No RustCrypto crate implements XTEA, so the block primitive is
//! hand-rolled here.

use crate::hmac32::kdf;

const DELTA: u32 = 0x9E37_79B9;
const ROUNDS: u32 = 32;

/// Treat the 128-bit key as four big-endian 32-bit subkeys.
fn subkeys(key: &[u8; 16]) -> [u32; 4] {
    let mut sub = [0u32; 4];
    for (i, chunk) in key.chunks_exact(4).enumerate() {
        sub[i] = u32::from_be_bytes(chunk.try_into().unwrap());
    }
    sub
}

/// Encrypt a single 64-bit XTEA block (32 cycles / 64 Feistel rounds).
fn encrypt_block(mut v0: u32, mut v1: u32, key: &[u32; 4]) -> (u32, u32) {
    let mut sum: u32 = 0;
    for _ in 0..ROUNDS {
        v0 = v0.wrapping_add(
            (((v1 << 4) ^ (v1 >> 5)).wrapping_add(v1)) ^ (sum.wrapping_add(key[(sum & 3) as usize])),
        );
        sum = sum.wrapping_add(DELTA);
        v1 = v1.wrapping_add(
            (((v0 << 4) ^ (v0 >> 5)).wrapping_add(v0))
                ^ (sum.wrapping_add(key[((sum >> 11) & 3) as usize])),
        );
    }
    (v0, v1)
}

/// A stream cipher engine derived from XTEA run in CTR mode.
///
/// Construction derives `k = SHA1(key)[0:16]`, split into four big-endian
/// 32-bit subkeys. No on-wire authentication is provided — callers rely on
/// an outer HMAC.
///
/// **Nonce placement.** Ciphertext length must equal plaintext length,
/// which leaves no room to prepend a nonce into the wire payload. This
/// implementation therefore keeps the 4-byte counter-block nonce as
/// out-of-band engine state, fixed
/// at `0` unless the caller has an out-of-band channel to agree on a
/// different session nonce (see [`XteaCtrEngine::with_nonce`]). With a fixed,
/// agreed nonce, CTR keystream generation is deterministic on both ends, so
/// `encrypt` and `decrypt` are the same XOR-with-keystream operation.
#[derive(Clone)]
pub struct XteaCtrEngine {
    subkeys: [u32; 4],
    nonce: u32,
}

impl XteaCtrEngine {
    /// Derive an engine from raw operator-supplied key bytes, using the
    /// default nonce (`0`).
    pub fn new(key: &[u8]) -> Self {
        Self::with_nonce(key, 0)
    }

    /// Derive an engine from raw key bytes with an explicit counter-block
    /// nonce, for deployments that have confirmed an out-of-band nonce
    /// agreement with the spacecraft firmware.
    pub fn with_nonce(key: &[u8], nonce: u32) -> Self {
        let k = kdf(key);
        Self {
            subkeys: subkeys(&k),
            nonce,
        }
    }

    fn keystream_block(&self, counter: u32) -> [u8; 8] {
        let (hi, lo) = encrypt_block(self.nonce, counter, &self.subkeys);
        let mut block = [0u8; 8];
        block[0..4].copy_from_slice(&hi.to_be_bytes());
        block[4..8].copy_from_slice(&lo.to_be_bytes());
        block
    }

    /// XOR `data` with the CTR keystream. Ciphertext length always equals
    /// `data.len()`. This is used for both directions: CTR mode's keystream
    /// depends only on the (shared, fixed) nonce and block counter, not on
    /// whether the caller is encrypting or decrypting.
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len());
        for (counter, chunk) in data.chunks(8).enumerate() {
            let block = self.keystream_block(counter as u32);
            for (byte, ks) in chunk.iter().zip(block.iter()) {
                out.push(byte ^ ks);
            }
        }
        out
    }

    /// Encrypt `plaintext`. Alias for [`XteaCtrEngine::apply`].
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        self.apply(plaintext)
    }

    /// Decrypt `ciphertext`. Alias for [`XteaCtrEngine::apply`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> Vec<u8> {
        self.apply(ciphertext)
    }
}
