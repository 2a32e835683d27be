#![doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;

mod cipher;
mod error;
mod kdf;
mod profile;
mod uint;

#[doc(inline)]
pub use {
    cipher::Cipher, cipher::TAG_BYTES, error::Error, profile::Profile, uint::BlockUint,
    uint::U192, uint::U256,
};

pub mod blake3v0;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

// Keeps unused_crate_dependencies quiet about the bench-only dependency
#[cfg(test)]
use criterion as _;
