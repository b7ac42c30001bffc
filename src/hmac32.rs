//! HMAC-SHA1/32 engine (component B): HMAC-SHA1 truncated to 4 bytes.
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

/// `SHA1(key)[0:16]` — the key-derivation function shared by [`crate::hmac32`]
/// and [`crate::xtea`].
pub(crate) fn kdf(key: &[u8]) -> [u8; 16] {
    let digest = Sha1::digest(key);
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    out
}

/// A truncated (4-byte) keyed MAC over a buffer.
///
/// Construction: `k = SHA1(key)[0:16]`. Because `k` is shorter than the
/// SHA-1 block size (64 bytes), the `hmac` crate's own key handling
/// zero-extends it to block size before forming the inner/outer pads — the
/// exact padding a hand-rolled construction would produce. `mac(data)`
/// returns the first 4 bytes of `SHA1(opad || SHA1(ipad || data))`.
#[derive(Clone)]
pub struct HmacSha1_32 {
    key: [u8; 16],
}

impl HmacSha1_32 {
    /// Derive an engine from raw operator-supplied key bytes.
    pub fn new(key: &[u8]) -> Self {
        Self { key: kdf(key) }
    }

    /// Compute the truncated 4-byte MAC tag over `data`.
    pub fn mac(&self, data: &[u8]) -> [u8; 4] {
        let mut mac = Hmac::<Sha1>::new_from_slice(&self.key)
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        let full = mac.finalize().into_bytes();
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&full[..4]);
        tag
    }

    /// Constant-time comparison of a received tag against the expected tag
    /// for `data`. Used instead of `==` to avoid leaking timing information
    /// about where a forged tag first diverges.
    pub fn verify(&self, data: &[u8], tag: &[u8; 4]) -> bool {
        let expected = self.mac(data);
        let mut diff = 0u8;
        for (a, b) in expected.iter().zip(tag.iter()) {
            diff |= a ^ b;
        }
        diff == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_key_empty_data() {
        // HMAC of empty data under key "" equals the first 4
        // bytes of SHA1(opad || SHA1(ipad)) with k = SHA1("")[0:16] zero
        // extended to 64 bytes. We verify this indirectly: the hand-rolled
        // ipad/opad construction and the hmac-crate-backed one must agree.
        let engine = HmacSha1_32::new(b"");
        let k = kdf(b"");
        let mut rkey = k.to_vec();
        rkey.resize(64, 0);
        let ipad: Vec<u8> = rkey.iter().map(|b| b ^ 0x36).collect();
        let opad: Vec<u8> = rkey.iter().map(|b| b ^ 0x5C).collect();

        let mut inner = Sha1::new();
        inner.update(&ipad);
        let inner_digest = inner.finalize();

        let mut outer = Sha1::new();
        outer.update(&opad);
        outer.update(inner_digest);
        let outer_digest = outer.finalize();

        let mut expected = [0u8; 4];
        expected.copy_from_slice(&outer_digest[..4]);

        assert_eq!(engine.mac(b""), expected);
    }

    #[test]
    fn tag_stability_same_key() {
        let engine = HmacSha1_32::new(b"shared-secret");
        assert_eq!(engine.mac(b"hello"), engine.mac(b"hello"));
    }

    #[test]
    fn different_keys_differ() {
        let a = HmacSha1_32::new(b"key-one");
        let b = HmacSha1_32::new(b"key-two");
        assert_ne!(a.mac(b"payload"), b.mac(b"payload"));
    }

    #[test]
    fn verify_rejects_corrupted_tag() {
        let engine = HmacSha1_32::new(b"key");
        let mut tag = engine.mac(b"data");
        assert!(engine.verify(b"data", &tag));
        tag[0] ^= 0xFF;
        assert!(!engine.verify(b"data", &tag));
    }
}
