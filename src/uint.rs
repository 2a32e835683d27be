//! Fixed-width multi-limb unsigned integers.
//!
//! Ciphertext blocks are values of the form `m·K + r`, which need 192 or 256
//! bits depending on the profile.  Both widths are plain `Copy` value types
//! made of little-endian 64-bit limbs, with just the four operations the
//! codec needs: wrapping add/sub, multiplication by a 64-bit scalar, and a
//! specialized division that recovers the (small) scalar again.
//!
//! Add, sub, and scale are constant-time.  [`BlockUint::quotient`] is not;
//! it only ever runs on ciphertext, which is public to anyone holding it.

use core::fmt::Debug;

/// The arithmetic a profile's block container must provide.
pub trait BlockUint: Copy + Clone + Debug + Default + PartialEq + Eq {
    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;

    /// `self · s` modulo the container width.
    fn scale(self, s: u64) -> Self;

    /// Recover `o` from `self = o·q + r`.
    ///
    /// Only valid for the operand shapes the codec produces: `q`'s top
    /// meaningful limb non-zero and dominant, `o` bounded well below 64 bits,
    /// and `r` much smaller than `q`.  Under those preconditions the loop
    /// converges in a handful of iterations; outside them the result is
    /// unspecified.
    fn quotient(self, q: Self) -> u64;
}

#[inline(always)]
fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let wide = u128::from(a) + u128::from(b) + u128::from(carry);
    (wide as u64, (wide >> 64) as u64)
}

#[inline(always)]
fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let wide = u128::from(a)
        .wrapping_sub(u128::from(b))
        .wrapping_sub(u128::from(borrow));
    (wide as u64, (wide >> 64) as u64 & 1)
}

#[inline(always)]
fn mul_wide(a: u64, b: u64) -> (u64, u64) {
    let wide = u128::from(a) * u128::from(b);
    (wide as u64, (wide >> 64) as u64)
}

#[inline(always)]
pub(crate) fn le64(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    u64::from_le_bytes(word)
}

#[inline(always)]
pub(crate) fn be64(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    u64::from_be_bytes(word)
}

/// 192-bit unsigned integer, three little-endian limbs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct U192 {
    pub(crate) l0: u64,
    pub(crate) l1: u64,
    pub(crate) l2: u64,
}

impl U192 {
    /// Big-endian serialization; this is the block wire format, so byte-wise
    /// lexicographic order equals numeric order.
    pub fn to_be_bytes(self) -> [u8; 24] {
        let mut out = [0u8; 24];
        out[0..8].copy_from_slice(&self.l2.to_be_bytes());
        out[8..16].copy_from_slice(&self.l1.to_be_bytes());
        out[16..24].copy_from_slice(&self.l0.to_be_bytes());
        out
    }

    pub fn from_be_bytes(bytes: [u8; 24]) -> Self {
        U192 {
            l2: be64(&bytes[0..8]),
            l1: be64(&bytes[8..16]),
            l0: be64(&bytes[16..24]),
        }
    }
}

impl BlockUint for U192 {
    fn wrapping_add(self, rhs: Self) -> Self {
        let (l0, c) = adc(self.l0, rhs.l0, 0);
        let (l1, c) = adc(self.l1, rhs.l1, c);
        let (l2, _) = adc(self.l2, rhs.l2, c);
        U192 { l0, l1, l2 }
    }

    fn wrapping_sub(self, rhs: Self) -> Self {
        let (l0, b) = sbb(self.l0, rhs.l0, 0);
        let (l1, b) = sbb(self.l1, rhs.l1, b);
        let (l2, _) = sbb(self.l2, rhs.l2, b);
        U192 { l0, l1, l2 }
    }

    fn scale(self, s: u64) -> Self {
        let (lo0, hi0) = mul_wide(self.l0, s);
        let (lo1, hi1) = mul_wide(self.l1, s);
        let (lo2, _) = mul_wide(self.l2, s);

        // The high words form a second column shifted one limb up.
        let low = U192 {
            l0: lo0,
            l1: lo1,
            l2: lo2,
        };
        let high = U192 {
            l0: 0,
            l1: hi0,
            l2: hi1,
        };
        low.wrapping_add(high)
    }

    fn quotient(self, q: Self) -> u64 {
        let mut p = self;
        let mut o = 0u64;

        // Underapproximate: pretend the low limbs of both operands are zero
        // and round the divisor's top limb up.  The partial quotient then
        // never overshoots, so p stays non-negative, and each pass strips
        // most of the remaining multiple of q.
        while p.l2 > q.l2 {
            let ql = p.l2 / (q.l2 + 1);
            p = p.wrapping_sub(q.scale(ql));
            o += ql;
        }

        // Rounding the divisor up leaves the quotient one short exactly when
        // the top limbs meet; the remainder's top limb is always strictly
        // below q's.
        if p.l2 == q.l2 {
            o += 1;
        }

        o
    }
}

/// 256-bit unsigned integer, four little-endian limbs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct U256 {
    pub(crate) l0: u64,
    pub(crate) l1: u64,
    pub(crate) l2: u64,
    pub(crate) l3: u64,
}

impl U256 {
    /// Serialize the low 232 bits big-endian.  Blocks in the wide profile
    /// are 29 bytes; the top limb never exceeds 40 bits for in-range values.
    pub fn to_be_bytes(self) -> [u8; 29] {
        debug_assert!(self.l3 < 1 << 40);

        let mut out = [0u8; 29];
        out[0..5].copy_from_slice(&self.l3.to_be_bytes()[3..8]);
        out[5..13].copy_from_slice(&self.l2.to_be_bytes());
        out[13..21].copy_from_slice(&self.l1.to_be_bytes());
        out[21..29].copy_from_slice(&self.l0.to_be_bytes());
        out
    }

    pub fn from_be_bytes(bytes: [u8; 29]) -> Self {
        let mut top = [0u8; 8];
        top[3..8].copy_from_slice(&bytes[0..5]);

        U256 {
            l3: u64::from_be_bytes(top),
            l2: be64(&bytes[5..13]),
            l1: be64(&bytes[13..21]),
            l0: be64(&bytes[21..29]),
        }
    }
}

impl BlockUint for U256 {
    fn wrapping_add(self, rhs: Self) -> Self {
        let (l0, c) = adc(self.l0, rhs.l0, 0);
        let (l1, c) = adc(self.l1, rhs.l1, c);
        let (l2, c) = adc(self.l2, rhs.l2, c);
        let (l3, _) = adc(self.l3, rhs.l3, c);
        U256 { l0, l1, l2, l3 }
    }

    fn wrapping_sub(self, rhs: Self) -> Self {
        let (l0, b) = sbb(self.l0, rhs.l0, 0);
        let (l1, b) = sbb(self.l1, rhs.l1, b);
        let (l2, b) = sbb(self.l2, rhs.l2, b);
        let (l3, _) = sbb(self.l3, rhs.l3, b);
        U256 { l0, l1, l2, l3 }
    }

    fn scale(self, s: u64) -> Self {
        let (lo0, hi0) = mul_wide(self.l0, s);
        let (lo1, hi1) = mul_wide(self.l1, s);
        let (lo2, hi2) = mul_wide(self.l2, s);
        let (lo3, _) = mul_wide(self.l3, s);

        let low = U256 {
            l0: lo0,
            l1: lo1,
            l2: lo2,
            l3: lo3,
        };
        let high = U256 {
            l0: 0,
            l1: hi0,
            l2: hi1,
            l3: hi2,
        };
        low.wrapping_add(high)
    }

    fn quotient(self, q: Self) -> u64 {
        let mut p = self;
        let mut o = 0u64;

        // The divisor's top limb is zero, so first drive p's top limb to
        // zero.  With the low limbs treated as zero and the divisor's l2
        // rounded up, p.l3 · 2^64 / (q.l2 + 1) underapproximates how many
        // multiples of q fit; computing it as p.l3 · ((2^64 − 1) / (q.l2 + 1))
        // keeps everything in one limb and stays an underapproximation.
        while p.l3 > 0 {
            let ql = p.l3 * (u64::MAX / (q.l2 + 1));
            p = p.wrapping_sub(q.scale(ql));
            o += ql;
        }

        // Same scheme as the 192-bit case now that both top limbs are zero.
        while p.l2 > q.l2 {
            let ql = p.l2 / (q.l2 + 1);
            p = p.wrapping_sub(q.scale(ql));
            o += ql;
        }

        if p.l2 == q.l2 {
            o += 1;
        }

        o
    }
}
