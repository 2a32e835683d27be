//! Where the `Cipher` lives.
//!

use core::fmt;

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::kdf;
use crate::profile::Profile;
use crate::uint::BlockUint;
use crate::Error;

/// Width of the authentication tag at the end of every ciphertext.
pub const TAG_BYTES: usize = 32;

/// Something capable of turning byte strings into ciphertexts that sort the
/// same way, and back again.
///
/// A `Cipher` is a key: the secret multiplier plus two keyed BLAKE3 states,
/// one generating the per-block noise and one authenticating ciphertexts.
/// It holds no per-message state, so a single instance can be shared freely
/// (including across threads); every call clones the keyed states it needs
/// and discards them afterwards.
///
/// The profile parameter fixes the wire format.  Don't use this type
/// directly; use the aliases exported by the profile modules,
/// [`blake3v0::narrow::Cipher`](crate::blake3v0::narrow) and
/// [`blake3v0::wide::Cipher`](crate::blake3v0::wide), which pin `P` for you.
///
/// # Examples
///
/// ```rust
/// use lexcrypt::blake3v0::wide;
///
/// # fn main() -> Result<(), lexcrypt::Error> {
/// let cipher = wide::Cipher::generate(&mut rand::thread_rng())?;
///
/// let a = cipher.encrypt(b"2024/04/01/alpha.log");
/// let b = cipher.encrypt(b"2024/04/02/alpha.log");
/// assert!(a < b);
///
/// assert_eq!(cipher.decrypt(&a)?, b"2024/04/01/alpha.log");
/// # Ok(())
/// # }
/// ```
///
pub struct Cipher<P: Profile> {
    /// The multiplier `K`; every block is `K·m` plus bounded noise
    multiplier: P::Uint,

    /// Keyed template for per-block noise, cloned per encryption
    prf: blake3::Hasher,

    /// Keyed template for the trailing tag, cloned per call
    mac: blake3::Hasher,
}

impl<P: Profile> Cipher<P> {
    /// Create a cipher from existing key material.
    ///
    /// `material` can be any length, including empty; it is expanded through
    /// BLAKE3's derive-key mode, so low-entropy material yields a weak key
    /// but never a malformed one.  The same material always produces the
    /// same cipher.
    pub fn new(material: &[u8]) -> Self {
        let keys = kdf::expand(material);

        Cipher {
            multiplier: P::multiplier(&keys.multiplier),
            prf: blake3::Hasher::new_keyed(&keys.prf),
            mac: blake3::Hasher::new_keyed(&keys.mac),
        }
    }

    /// Create a cipher from fresh random key material.
    ///
    /// Reads 56 bytes from `rng` and derives from those, wiping them
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyGeneration`] if the RNG fails to produce bytes.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, Error> {
        let mut material = [0u8; 56];
        rng.try_fill_bytes(&mut material)
            .map_err(|e| Error::KeyGeneration(format!("RNG failed to fill key material ({e})")))?;

        let cipher = Self::new(&material);
        material.zeroize();

        Ok(cipher)
    }

    /// Encrypt `plaintext`, returning the ciphertext as a fresh buffer.
    #[must_use]
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ciphertext_len(plaintext.len()));
        self.encrypt_append(plaintext, &mut out);
        out
    }

    /// Encrypt `plaintext`, appending the ciphertext to `out`.
    ///
    /// Exactly [`ciphertext_len`](Self::ciphertext_len)`(plaintext.len())`
    /// bytes are appended; anything already in `out` is left untouched and
    /// is not covered by the tag.
    pub fn encrypt_append(&self, plaintext: &[u8], out: &mut Vec<u8>) {
        let start = out.len();
        let mut prf = self.prf.clone();
        let mut counter = 0u64;
        let mut rest = plaintext;

        while rest.len() > P::CHUNK_BYTES {
            let (chunk, tail) = rest.split_at(P::CHUNK_BYTES);
            self.push_block(&mut prf, &mut counter, P::pack(chunk), out);
            rest = tail;
        }
        self.push_block(&mut prf, &mut counter, P::pack(rest), out);

        // A final chunk that came out exactly full is indistinguishable from
        // a truncation without a terminator, so full-multiple messages get
        // one extra empty block.  This also keeps strict prefixes sorting
        // before their continuations.
        if rest.len() == P::CHUNK_BYTES {
            self.push_block(&mut prf, &mut counter, P::pack(&[]), out);
        }

        let mut mac = self.mac.clone();
        mac.update(&out[start..]);
        out.extend_from_slice(mac.finalize().as_bytes());
    }

    /// Decrypt `ciphertext`, returning the plaintext as a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] if the ciphertext is too short, fails tag
    /// verification, or is structurally malformed.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        let blocks = ciphertext.len().saturating_sub(TAG_BYTES) / P::BLOCK_BYTES;
        let mut out = Vec::with_capacity(blocks * P::CHUNK_BYTES);
        self.decrypt_append(ciphertext, &mut out)?;
        Ok(out)
    }

    /// Decrypt `ciphertext`, appending the plaintext to `out`.
    ///
    /// The tag is verified (in constant time) before any block is decoded.
    /// On error, `out` may still have gained bytes from blocks decoded
    /// before the failure was detected; treat its contents as undefined
    /// whenever this returns `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] if the ciphertext is too short, fails tag
    /// verification, or is structurally malformed.
    pub fn decrypt_append(&self, ciphertext: &[u8], out: &mut Vec<u8>) -> Result<(), Error> {
        if ciphertext.len() < TAG_BYTES {
            return Err(Error::Rejected);
        }
        let (body, tag) = ciphertext.split_at(ciphertext.len() - TAG_BYTES);
        let tag: [u8; TAG_BYTES] = tag.try_into().map_err(|_| Error::Rejected)?;

        let mut mac = self.mac.clone();
        mac.update(body);
        // blake3::Hash equality is constant-time.
        if mac.finalize() != blake3::Hash::from(tag) {
            return Err(Error::Rejected);
        }

        // Unreachable for authentic ciphertexts; checked so a forged body
        // can never make the block loop misalign.
        if body.is_empty() || body.len() % P::BLOCK_BYTES != 0 {
            return Err(Error::Rejected);
        }

        let mut rest = body;
        while rest.len() > P::BLOCK_BYTES {
            let (block, tail) = rest.split_at(P::BLOCK_BYTES);
            let m = self.open_block(block);
            if !P::body_ok(m) {
                return Err(Error::Rejected);
            }
            out.extend_from_slice(&P::payload(m)[8 - P::CHUNK_BYTES..]);
            rest = tail;
        }

        let m = self.open_block(rest);
        let n = P::tail_len(m).ok_or(Error::Rejected)?;
        let window = 8 - P::CHUNK_BYTES;
        out.extend_from_slice(&P::payload(m)[window..window + n]);

        Ok(())
    }

    /// The exact ciphertext size for a plaintext of `len` bytes.
    #[must_use]
    pub fn ciphertext_len(len: usize) -> usize {
        // One block per full chunk, one for the remainder (or the empty
        // terminator when the length is an exact multiple).
        (len / P::CHUNK_BYTES + 1) * P::BLOCK_BYTES + TAG_BYTES
    }

    fn push_block(&self, prf: &mut blake3::Hasher, counter: &mut u64, m: u64, out: &mut Vec<u8>) {
        let r = P::noise(prf, m, *counter);
        *counter += 1;

        let c = self.multiplier.scale(m).wrapping_add(r);
        out.extend_from_slice(P::encode_block(c).as_ref());
    }

    fn open_block(&self, block: &[u8]) -> u64 {
        P::decode_block(block).quotient(self.multiplier)
    }
}

impl<P: Profile> fmt::Debug for Cipher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("key", &"**REDACTED**")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blake3v0::wide;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn cipher() -> wide::Cipher {
        let mut rng = ChaCha20Rng::seed_from_u64(0xc1a5);
        wide::Cipher::generate(&mut rng).unwrap()
    }

    #[test]
    fn append_leaves_existing_bytes_alone() {
        let cipher = cipher();

        let mut buf = b"prefix".to_vec();
        cipher.encrypt_append(b"payload", &mut buf);

        assert_eq!(&buf[..6], b"prefix");
        assert_eq!(buf.len(), 6 + wide::Cipher::ciphertext_len(7));
    }

    #[test]
    fn appended_region_is_a_standalone_ciphertext() {
        let cipher = cipher();

        let mut buf = b"junk already here".to_vec();
        cipher.encrypt_append(b"payload", &mut buf);

        let plain = cipher.decrypt(&buf[17..]).unwrap();
        assert_eq!(plain, b"payload");
    }

    #[test]
    fn ciphertext_len_matches_output() {
        let cipher = cipher();

        for len in 0..=32 {
            let plaintext = vec![0xa5u8; len];
            assert_eq!(
                cipher.encrypt(&plaintext).len(),
                wide::Cipher::ciphertext_len(len),
                "length {len}"
            );
        }
    }

    #[test]
    fn wrong_key_rejects() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let a = wide::Cipher::generate(&mut rng).unwrap();
        let b = wide::Cipher::generate(&mut rng).unwrap();

        let ciphertext = a.encrypt(b"under key a");
        assert!(matches!(b.decrypt(&ciphertext), Err(Error::Rejected)));
    }

    #[test]
    fn derived_ciphers_agree() {
        let a = wide::Cipher::new(b"shared secret material");
        let b = wide::Cipher::new(b"shared secret material");

        let ciphertext = a.encrypt(b"cross-instance");
        assert_eq!(b.decrypt(&ciphertext).unwrap(), b"cross-instance");
        assert_eq!(ciphertext, b.encrypt(b"cross-instance"));
    }

    #[test]
    fn generate_draws_distinct_keys() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let a = wide::Cipher::generate(&mut rng).unwrap();
        let b = wide::Cipher::generate(&mut rng).unwrap();

        assert_ne!(a.encrypt(b"same input"), b.encrypt(b"same input"));
    }

    #[test]
    fn too_short_ciphertexts_reject() {
        let cipher = cipher();

        for len in 0..TAG_BYTES {
            assert!(cipher.decrypt(&vec![0u8; len]).is_err(), "length {len}");
        }
    }

    #[test]
    fn debug_redacts_the_key() {
        let cipher = cipher();

        assert_eq!(format!("{cipher:?}"), "Cipher { key: \"**REDACTED**\" }");
    }
}
