//! The wide profile: 7 plaintext bytes per 29-byte ciphertext block.
//!
//! The profile to use for new deployments.  Each block's noise is bound to
//! the block value and to a counter that advances per block, and each block
//! limb carries a four-bit marker that decryption re-checks after the tag
//! has already passed.
//!
//! # Examples
//!
//! ```rust
//! use lexcrypt::blake3v0::wide;
//!
//! # fn main() -> Result<(), lexcrypt::Error> {
//! let cipher = wide::Cipher::generate(&mut rand::thread_rng())?;
//!
//! let january = cipher.encrypt(b"photos/2022/January/dog.jpg");
//! let sample = cipher.encrypt(b"sample.jpg");
//! assert!(january < sample);
//! # Ok(())
//! # }
//! ```

use crate::cipher::Cipher as C;
use crate::profile::Profile;
use crate::uint::{le64, BlockUint, U256};

/// [`Cipher`](crate::Cipher) specialisation for the wide profile.
///
/// See the documentation for [`Cipher`](crate::Cipher) for usage
/// information.
///
pub type Cipher = C<Wide>;

/// The wide profile: `U256` container, `K` in `[2^168, 2^169)`, noise in
/// `2^127 + [0, 2^167)`.
#[derive(Debug)]
pub struct Wide;

/// Marker occupying the four bits above the packed payload.  Redundant with
/// the tag; re-checked anyway after a block is opened.
const MARKER: u64 = 0b1111 << 59;

/// Everything below the marker and above the length tag.
const PAYLOAD_MASK: u64 = (1 << 56) - 1;

/// Lower bound added to the raw noise so it clears `K^(3/4)`.
const NOISE_FLOOR: U256 = U256 {
    l0: 0,
    l1: 1 << 63,
    l2: 0,
    l3: 0,
};

impl Profile for Wide {
    type Uint = U256;
    type Block = [u8; 29];

    const CHUNK_BYTES: usize = 7;
    const BLOCK_BYTES: usize = 29;

    fn multiplier(bytes: &[u8; 24]) -> U256 {
        // Top limb keeps 40 random bits under a forced bit 40, putting K in
        // [2^168, 2^169); the fourth limb is headroom for m·K + r.
        U256 {
            l0: le64(&bytes[0..8]),
            l1: le64(&bytes[8..16]),
            l2: le64(&bytes[16..24]) >> 24 | 1 << 40,
            l3: 0,
        }
    }

    fn pack(chunk: &[u8]) -> u64 {
        debug_assert!(chunk.len() <= Self::CHUNK_BYTES);

        let mut word = [0u8; 8];
        word[1..1 + chunk.len()].copy_from_slice(chunk);
        MARKER | u64::from_be_bytes(word) << 3 | chunk.len() as u64
    }

    fn body_ok(m: u64) -> bool {
        m >> 59 == 0b1111 && m & 7 == 7
    }

    fn tail_len(m: u64) -> Option<usize> {
        // The length tag is three bits, so any value it can hold is a legal
        // tail length here; only the marker can give a forgery away.
        (m >> 59 == 0b1111).then_some((m & 7) as usize)
    }

    fn payload(m: u64) -> [u8; 8] {
        (m >> 3 & PAYLOAD_MASK).to_be_bytes()
    }

    fn noise(prf: &mut blake3::Hasher, m: u64, counter: u64) -> U256 {
        let mut input = [0u8; 16];
        input[0..8].copy_from_slice(&m.to_be_bytes());
        input[8..16].copy_from_slice(&counter.to_be_bytes());

        prf.reset();
        prf.update(&input);
        let digest = prf.finalize();
        let bytes = digest.as_bytes();

        let raw = U256 {
            l0: le64(&bytes[0..8]),
            l1: le64(&bytes[8..16]),
            l2: le64(&bytes[16..24]) >> 25,
            l3: 0,
        };
        raw.wrapping_add(NOISE_FLOOR)
    }

    fn encode_block(c: U256) -> [u8; 29] {
        c.to_be_bytes()
    }

    fn decode_block(block: &[u8]) -> U256 {
        let mut bytes = [0u8; 29];
        bytes.copy_from_slice(block);
        U256::from_be_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf;

    fn cipher() -> Cipher {
        Cipher::generate(&mut rand::thread_rng()).unwrap()
    }

    #[test]
    fn pack_sets_marker_and_length() {
        assert_eq!(Wide::pack(&[]), MARKER);
        assert_eq!(Wide::pack(b"a"), MARKER | 0x61u64 << 51 | 1);
        assert_eq!(Wide::pack(b"abcdefg") & 7, 7);
        assert_eq!(Wide::pack(b"abcdefg") >> 59, 0b1111);
    }

    #[test]
    fn body_and_tail_validation() {
        assert!(Wide::body_ok(Wide::pack(b"abcdefg")));
        assert!(!Wide::body_ok(Wide::pack(b"abc")));
        assert!(!Wide::body_ok(Wide::pack(b"abcdefg") & !MARKER));

        assert_eq!(Wide::tail_len(Wide::pack(&[])), Some(0));
        assert_eq!(Wide::tail_len(Wide::pack(b"abc")), Some(3));
        assert_eq!(Wide::tail_len(Wide::pack(b"abcdefg")), Some(7));
        assert_eq!(Wide::tail_len(Wide::pack(b"abc") & !MARKER), None);
    }

    #[test]
    fn payload_recovers_packed_bytes() {
        let m = Wide::pack(b"abcdefg");
        assert_eq!(&Wide::payload(m)[1..], b"abcdefg");

        let m = Wide::pack(b"xy");
        assert_eq!(&Wide::payload(m)[1..3], b"xy");
    }

    #[test]
    fn multiplier_lands_in_its_range() {
        for seed in 0..50u8 {
            let keys = kdf::expand(&[seed]);
            let k = Wide::multiplier(&keys.multiplier);

            assert!(k.l2 >= 1 << 40 && k.l2 < 1 << 41);
            assert_eq!(k.l3, 0);
        }
    }

    #[test]
    fn noise_stays_in_its_window() {
        for seed in 0..50u8 {
            let mut prf = blake3::Hasher::new_keyed(&[seed; 32]);
            let r = Wide::noise(&mut prf, Wide::pack(b"abcdefg"), seed as u64);

            assert!(r.l2 <= 1 << 39);
            assert_eq!(r.l3, 0);
            assert!(r.to_be_bytes() >= NOISE_FLOOR.to_be_bytes());
        }
    }

    #[test]
    fn noise_is_bound_to_block_and_position() {
        let mut prf = blake3::Hasher::new_keyed(&[9u8; 32]);

        let a = Wide::noise(&mut prf, Wide::pack(b"a"), 0);
        let b = Wide::noise(&mut prf, Wide::pack(b"b"), 0);
        let c = Wide::noise(&mut prf, Wide::pack(b"a"), 1);
        let again = Wide::noise(&mut prf, Wide::pack(b"a"), 0);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, again);
    }

    #[test]
    fn empty_plaintext_is_one_block_plus_tag() {
        let cipher = cipher();
        let ciphertext = cipher.encrypt(b"");

        assert_eq!(ciphertext.len(), 29 + 32);
        assert_eq!(cipher.decrypt(&ciphertext).unwrap(), b"");
    }

    #[test]
    fn exact_multiples_carry_a_terminator_block() {
        let cipher = cipher();

        assert_eq!(cipher.encrypt(&[0u8; 6]).len(), 29 + 32);
        assert_eq!(cipher.encrypt(&[0u8; 7]).len(), 2 * 29 + 32);
        assert_eq!(cipher.encrypt(&[0u8; 13]).len(), 2 * 29 + 32);
        assert_eq!(cipher.encrypt(&[0u8; 14]).len(), 3 * 29 + 32);
    }

    #[test]
    fn boundary_lengths_round_trip_in_order() {
        let cipher = cipher();
        let mut previous: Option<Vec<u8>> = None;

        for len in 0..=15 {
            let plaintext = vec![0x42u8; len];
            let ciphertext = cipher.encrypt(&plaintext);

            assert_eq!(cipher.decrypt(&ciphertext).unwrap(), plaintext);
            if let Some(shorter) = previous {
                assert!(shorter < ciphertext, "length {len}");
            }
            previous = Some(ciphertext);
        }
    }

    #[test]
    fn chunk_boundary_prefixes_sort_first() {
        let cipher = cipher();

        for len in 0..=15 {
            let base = vec![0x7fu8; len];
            let mut longer = base.clone();
            longer.push(0x00);

            assert!(cipher.encrypt(&base) < cipher.encrypt(&longer), "length {len}");
        }
    }

    #[test]
    fn special_cases_sort_identically_for_any_key() {
        // Already sorted; the zero runs and the 0x01-padding ladder exercise
        // every way a block can be partially filled.
        const SPECIALS: &[&[u8]] = &[
            b"",
            b"\x00",
            b"\x00\x00",
            b"\x00\x00\x00",
            b"\x00\x00\x00\x00",
            b"\x00\x00\x00\x00\x00",
            b"\x00\x00\x00\x00\x00\x00",
            b"\x00\x00\x00\x00\x00\x00\x00",
            b"\x00\x00\x00\x00\x00\x00\x00\x00",
            b"\x01",
            b"\x01\x00",
            b"\x01\x00\x00",
            b"\x01\x00\x00\x00",
            b"\x01\x00\x00\x00\x00",
            b"\x01\x00\x00\x00\x00\x00",
            b"\x01\x00\x00\x00\x00\x00\x00",
            b"\x01\x00\x00\x00\x00\x00\x00\x00",
            b"\x01\x00\x00\x00\x00\x00\x00\x01",
            b"\xff\xff\xff\xff\xff\xff\xff",
        ];

        for _ in 0..50 {
            let cipher = cipher();

            for pair in SPECIALS.windows(2) {
                assert!(pair[0] < pair[1]);
                assert!(cipher.encrypt(pair[0]) < cipher.encrypt(pair[1]));
            }
        }
    }

    #[test]
    fn path_corpus_orders_correctly() {
        for _ in 0..50 {
            let cipher = cipher();

            assert!(
                cipher.encrypt(b"photos/2022/January/dog.jpg") < cipher.encrypt(b"sample.jpg")
            );
            assert!(
                cipher.encrypt(b"photos/2022/February/dog2.jpg")
                    < cipher.encrypt(b"photos/2022/January/dog.jpg")
            );
            assert!(
                cipher.encrypt(b"photos/2022/February/dog2.jpg")
                    < cipher.encrypt(b"photos/2022/February/dog3.jpg")
            );
            assert!(
                cipher.encrypt(b"photos/2022/February/dog3.jpg")
                    < cipher.encrypt(b"photos/2022/February/dog4.jpg")
            );
        }
    }

    #[test]
    fn any_byte_mutation_rejects() {
        let cipher = cipher();
        let ciphertext = cipher.encrypt(b"photos/2022/January/dog.jpg");

        for i in 0..ciphertext.len() {
            let mut mangled = ciphertext.clone();
            mangled[i] ^= 0xff;

            assert!(cipher.decrypt(&mangled).is_err(), "byte {i}");
        }
    }

    #[test]
    fn any_tag_bit_flip_rejects() {
        let cipher = cipher();
        let ciphertext = cipher.encrypt(b"sample.jpg");

        for i in ciphertext.len() - 32..ciphertext.len() {
            for bit in 0..8 {
                let mut mangled = ciphertext.clone();
                mangled[i] ^= 1 << bit;

                assert!(cipher.decrypt(&mangled).is_err(), "byte {i} bit {bit}");
            }
        }
    }

    quickcheck! {
        fn round_trips(plaintext: Vec<u8>) -> bool {
            let cipher = cipher();

            match cipher.decrypt(&cipher.encrypt(&plaintext)) {
                Ok(decrypted) => decrypted == plaintext,
                Err(_) => false,
            }
        }

        fn order_is_preserved(p1: Vec<u8>, p2: Vec<u8>) -> bool {
            let cipher = cipher();

            let c1 = cipher.encrypt(&p1);
            let c2 = cipher.encrypt(&p2);

            p1.cmp(&p2) == c1.cmp(&c2)
        }
    }
}
