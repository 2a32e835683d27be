//! Root key derivation.
//!
//! All key material in the scheme comes from one 88-byte expansion of the
//! caller's input through BLAKE3's derive-key mode.  The input can be any
//! length (including empty); the context string is fixed and is part of the
//! wire format, so two parties deriving from the same material always agree
//! on the same subkeys.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Domain-separation context for the root expansion. Changing this breaks
/// compatibility with every previously written ciphertext.
const ROOT_CONTEXT: &str = "ordenc v0 root key derivation";

/// The three subkeys every cipher is built from.
///
/// `multiplier` seeds the order-preserving map, `prf` keys the per-block
/// noise generator, and `mac` keys the outer authentication tag.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct Subkeys {
    pub(crate) multiplier: [u8; 24],
    pub(crate) prf: [u8; 32],
    pub(crate) mac: [u8; 32],
}

/// Expand `material` into the full set of subkeys.
pub(crate) fn expand(material: &[u8]) -> Subkeys {
    let mut buf = [0u8; 88];
    let mut hasher = blake3::Hasher::new_derive_key(ROOT_CONTEXT);
    hasher.update(material);
    hasher.finalize_xof().fill(&mut buf);

    let mut keys = Subkeys {
        multiplier: [0u8; 24],
        prf: [0u8; 32],
        mac: [0u8; 32],
    };
    keys.multiplier.copy_from_slice(&buf[0..24]);
    keys.prf.copy_from_slice(&buf[24..56]);
    keys.mac.copy_from_slice(&buf[56..88]);
    buf.zeroize();

    keys
}

impl fmt::Debug for Subkeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subkeys")
            .field("multiplier", &"**REDACTED**")
            .field("prf", &"**REDACTED**")
            .field("mac", &"**REDACTED**")
            .finish()
    }
}
