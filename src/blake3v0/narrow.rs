//! The narrow profile: 6 plaintext bytes per 24-byte ciphertext block.
//!
//! Kept for compatibility with data written by the first revision of the
//! scheme.  The per-block noise here is derived from the key alone -- it
//! does not vary with the block value or position -- so prefer
//! [`wide`](crate::blake3v0::wide) for anything new.
//!
//! # Examples
//!
//! ```rust
//! use lexcrypt::blake3v0::narrow;
//!
//! # fn main() -> Result<(), lexcrypt::Error> {
//! let cipher = narrow::Cipher::new(b"existing key material");
//!
//! let ciphertext = cipher.encrypt(b"inbox/0001");
//! assert_eq!(cipher.decrypt(&ciphertext)?, b"inbox/0001");
//! # Ok(())
//! # }
//! ```

use crate::cipher::Cipher as C;
use crate::profile::Profile;
use crate::uint::{le64, BlockUint, U192};

/// [`Cipher`](crate::Cipher) specialisation for the narrow profile.
///
/// See the documentation for [`Cipher`](crate::Cipher) for usage
/// information.
///
pub type Cipher = C<Narrow>;

/// The narrow profile: `U192` container, `K` in `[2^136, 2^137)`, noise in
/// `2^103 + [0, 2^135)`.
#[derive(Debug)]
pub struct Narrow;

/// Lower bound added to the raw noise so it clears `K^(3/4)`.
const NOISE_FLOOR: U192 = U192 {
    l0: 0,
    l1: 1 << 39,
    l2: 0,
};

impl Profile for Narrow {
    type Uint = U192;
    type Block = [u8; 24];

    const CHUNK_BYTES: usize = 6;
    const BLOCK_BYTES: usize = 24;

    fn multiplier(bytes: &[u8; 24]) -> U192 {
        // Top limb keeps 8 random bits under a forced bit 8, putting K in
        // [2^136, 2^137) with a fixed bit length.
        U192 {
            l0: le64(&bytes[0..8]),
            l1: le64(&bytes[8..16]),
            l2: le64(&bytes[16..24]) >> 56 | 1 << 8,
        }
    }

    fn pack(chunk: &[u8]) -> u64 {
        debug_assert!(chunk.len() <= Self::CHUNK_BYTES);

        let mut word = [0u8; 8];
        word[2..2 + chunk.len()].copy_from_slice(chunk);
        u64::from_be_bytes(word) << 3 | chunk.len() as u64
    }

    fn body_ok(m: u64) -> bool {
        m & 7 == 6
    }

    fn tail_len(m: u64) -> Option<usize> {
        // A full final chunk is always followed by an empty terminator
        // block, so a trailing block claiming 6 (or more) bytes is forged.
        let n = (m & 7) as usize;
        (n < Self::CHUNK_BYTES).then_some(n)
    }

    fn payload(m: u64) -> [u8; 8] {
        (m >> 3).to_be_bytes()
    }

    fn noise(prf: &mut blake3::Hasher, _m: u64, _counter: u64) -> U192 {
        // The hashed buffer is never populated, so the noise depends only on
        // the key: every block under one key draws the same value.  Kept
        // bit-for-bit for compatibility with already-written ciphertexts.
        prf.reset();
        prf.update(&[0u8; 8]);
        let digest = prf.finalize();
        let bytes = digest.as_bytes();

        let raw = U192 {
            l0: le64(&bytes[0..8]),
            l1: le64(&bytes[8..16]),
            l2: le64(&bytes[16..24]) >> 57,
        };
        raw.wrapping_add(NOISE_FLOOR)
    }

    fn encode_block(c: U192) -> [u8; 24] {
        c.to_be_bytes()
    }

    fn decode_block(block: &[u8]) -> U192 {
        let mut bytes = [0u8; 24];
        bytes.copy_from_slice(block);
        U192::from_be_bytes(bytes)
    }
}
