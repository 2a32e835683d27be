//! The home of the `Profile` trait.
//!

use crate::uint::BlockUint;

/// The complete parameterization of one wire-compatible variant of the codec.
///
/// A profile fixes everything two parties must agree on for their
/// ciphertexts to interoperate and sort correctly against each other: the
/// width of the big-integer container, how many plaintext bytes ride in each
/// block, how the secret multiplier is carved out of derived key material,
/// how a chunk is packed into a limb, and how the per-block noise is drawn.
///
/// The profile is chosen when the cipher is constructed (see
/// [`blake3v0::narrow`](crate::blake3v0::narrow) and
/// [`blake3v0::wide`](crate::blake3v0::wide)) and travels with the key from
/// then on.  It is never inferred from a ciphertext: ciphertexts of
/// different profiles must never be compared or decrypted under one key.
///
pub trait Profile {
    /// Container for `m·K + r`; wide enough that the product cannot wrap.
    type Uint: BlockUint;

    /// One serialized ciphertext block, `[u8; Self::BLOCK_BYTES]`.
    type Block: AsRef<[u8]>;

    /// Plaintext bytes packed into every block.
    const CHUNK_BYTES: usize;

    /// Serialized width of one ciphertext block.
    const BLOCK_BYTES: usize;

    /// Build the multiplier `K` from derived key bytes.
    ///
    /// The result lands in a half-open range whose lower bound has its top
    /// bit set, so `K` has a fixed bit length and every block serializes to
    /// exactly [`BLOCK_BYTES`](Self::BLOCK_BYTES) bytes.
    fn multiplier(bytes: &[u8; 24]) -> Self::Uint;

    /// Pack up to [`CHUNK_BYTES`](Self::CHUNK_BYTES) plaintext bytes and
    /// their count into a block limb.
    fn pack(chunk: &[u8]) -> u64;

    /// Whether `m` is valid for a non-final block (full length, marker bits
    /// intact where the profile has them).
    fn body_ok(m: u64) -> bool;

    /// The number of plaintext bytes carried by a valid final block, or
    /// `None` if `m` is malformed.
    fn tail_len(m: u64) -> Option<usize>;

    /// The packed plaintext bytes of `m`, big-endian with leading zeros.
    /// The live window is the trailing [`CHUNK_BYTES`](Self::CHUNK_BYTES)
    /// bytes.
    fn payload(m: u64) -> [u8; 8];

    /// Draw the block's noise term from the cloned keyed hasher.
    ///
    /// The result always lies strictly inside `(K^(3/4), K − K^(3/4))`,
    /// which is what keeps `m·K + r` inside `(m·K, (m+1)·K)` and makes the
    /// map order-preserving.
    fn noise(prf: &mut blake3::Hasher, m: u64, counter: u64) -> Self::Uint;

    /// Serialize a block value big-endian at fixed width.
    fn encode_block(c: Self::Uint) -> Self::Block;

    /// Deserialize a block.  `block` must be exactly
    /// [`BLOCK_BYTES`](Self::BLOCK_BYTES) long.
    fn decode_block(block: &[u8]) -> Self::Uint;
}
