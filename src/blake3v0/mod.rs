//! Order-preserving encryption profiles built on BLAKE3.
//!
//! BLAKE3 is the family's only cryptographic primitive.  Its derive-key
//! mode expands input key material into subkeys, and its keyed mode covers
//! both the deterministic per-block noise and the 32-byte tag at the end of
//! every ciphertext.
//!
//! Two profiles are defined.  They share the construction but differ in
//! block geometry, and their ciphertexts are **not** interchangeable -- pick
//! one per key and stay with it:
//!
//! * [`narrow`] -- 6 plaintext bytes per 24-byte block, 192-bit arithmetic.
//!   Its per-block noise is keyed but independent of the block value, a
//!   quirk preserved for compatibility with existing data.
//! * [`wide`] -- 7 plaintext bytes per 29-byte block, 256-bit arithmetic.
//!   Binds the noise to the block value and a running counter; the right
//!   choice for new deployments.

pub mod narrow;
pub mod wide;
