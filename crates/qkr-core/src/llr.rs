//! Sign/magnitude log-likelihood values for iterative decoding.
//!
//! The min-sum decoder family manipulates the sign and the magnitude of a
//! belief independently: signs combine over GF(2) in the check-node update
//! while magnitudes go through min/Φ operations. [`Llr`] stores a belief in
//! that decomposed form — a GF(2) sign and a non-negative magnitude — and
//! converts to and from the plain signed value on demand.
//!
//! Addition of two [`Llr`] values is defined as *real* addition of the
//! signed values they represent, re-decomposed into sign and magnitude.
//! Several decoder variants alternate between the compact form and direct
//! signed arithmetic, so the two views must agree exactly.
//!
//! # Example
//!
//! ```rust
//! use qkr_core::gf2::Gf2;
//! use qkr_core::llr::Llr;
//!
//! let a = Llr::from(2.5);   // sign 0, magnitude 2.5
//! let b = Llr::from(-4.0);  // sign 1, magnitude 4.0
//!
//! assert_eq!(a.alpha(), Gf2::ZERO);
//! assert_eq!(b.alpha(), Gf2::ONE);
//!
//! // Addition matches addition of the represented reals.
//! assert_eq!(a + b, Llr::from(-1.5));
//! assert!((a + b).to_f64() == -1.5);
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::gf2::Gf2;

/// Confidence magnitude assigned to padded (known-value) tail bits.
const PADDED_BIT_MAGNITUDE: f64 = 1000.0;

/// A belief about one bit, stored as a GF(2) sign and a magnitude.
///
/// Represents the real value `sign == 1 ? -magnitude : magnitude`. A
/// positive value (sign 0) means bit 0 is more likely, a negative value
/// (sign 1) means bit 1 is more likely; the magnitude is the confidence.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Llr {
    sign: Gf2,
    mag: f64,
}

impl Llr {
    /// A zero belief (sign 0, magnitude 0).
    pub const ZERO: Llr = Llr {
        sign: Gf2::ZERO,
        mag: 0.0,
    };

    /// Builds a value directly from a sign and a magnitude.
    ///
    /// The check-node updates construct their outgoing messages this way:
    /// the sign from a GF(2) sum, the magnitude from a min or Φ kernel.
    #[inline]
    pub fn new(sign: Gf2, mag: f64) -> Self {
        Llr { sign, mag }
    }

    /// The sign component (1 means the represented value is negative).
    #[inline]
    pub fn alpha(self) -> Gf2 {
        self.sign
    }

    /// The magnitude component.
    #[inline]
    pub fn beta(self) -> f64 {
        self.mag
    }

    /// The represented signed value.
    #[inline]
    pub fn to_f64(self) -> f64 {
        if self.sign.is_one() {
            -self.mag
        } else {
            self.mag
        }
    }
}

impl From<f64> for Llr {
    #[inline]
    fn from(value: f64) -> Self {
        Llr {
            sign: Gf2::from(value < 0.0),
            mag: value.abs(),
        }
    }
}

impl Add for Llr {
    type Output = Llr;

    #[inline]
    fn add(self, rhs: Llr) -> Llr {
        Llr::from(self.to_f64() + rhs.to_f64())
    }
}

impl AddAssign for Llr {
    #[inline]
    fn add_assign(&mut self, rhs: Llr) {
        *self = *self + rhs;
    }
}

impl Sub for Llr {
    type Output = Llr;

    #[inline]
    fn sub(self, rhs: Llr) -> Llr {
        Llr::from(self.to_f64() - rhs.to_f64())
    }
}

impl SubAssign for Llr {
    #[inline]
    fn sub_assign(&mut self, rhs: Llr) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Llr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

/// Builds channel beliefs for a received bit string over a binary symmetric
/// channel with crossover probability `qber`.
///
/// Each payload bit gets the belief `±ln((1-qber)/qber)`: positive for a
/// received 0, negative for a received 1. The trailing `padded_len` bits are
/// padding with a known value and get a fixed large-confidence belief
/// instead, so the decoder effectively freezes them.
///
/// # Panics
///
/// Panics if `qber` is not in `(0, 0.5)` or if `padded_len > bits.len()`.
pub fn llrs_from_bits(bits: &[Gf2], qber: f64, padded_len: usize) -> Vec<Llr> {
    assert!(
        qber > 0.0 && qber < 0.5,
        "qber must be in (0, 0.5), got {qber}"
    );
    assert!(
        padded_len <= bits.len(),
        "padded_len {} exceeds bit count {}",
        padded_len,
        bits.len()
    );

    let base = ((1.0 - qber) / qber).ln();
    let payload_len = bits.len() - padded_len;

    let mut llrs = Vec::with_capacity(bits.len());
    for &bit in &bits[..payload_len] {
        llrs.push(Llr::from(if bit.is_one() { -base } else { base }));
    }
    for &bit in &bits[payload_len..] {
        llrs.push(Llr::from(if bit.is_one() {
            -PADDED_BIT_MAGNITUDE
        } else {
            PADDED_BIT_MAGNITUDE
        }));
    }

    llrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f64_decomposition() {
        let pos = Llr::from(3.5);
        assert_eq!(pos.alpha(), Gf2::ZERO);
        assert!((pos.beta() - 3.5).abs() < 1e-12);

        let neg = Llr::from(-2.25);
        assert_eq!(neg.alpha(), Gf2::ONE);
        assert!((neg.beta() - 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_to_f64() {
        for &v in &[0.0, 1.0, -1.0, 17.5, -0.003] {
            assert_eq!(Llr::from(v).to_f64(), v);
        }
    }

    #[test]
    fn test_addition_matches_real_addition() {
        let cases = [
            (1.0, 2.0),
            (-1.0, 2.0),
            (1.0, -2.0),
            (-3.5, -4.5),
            (5.0, -5.0),
        ];
        for &(a, b) in &cases {
            let sum = Llr::from(a) + Llr::from(b);
            assert_eq!(sum, Llr::from(a + b), "for operands {a} and {b}");
        }
    }

    #[test]
    fn test_add_assign_and_sub_assign() {
        let mut x = Llr::from(2.0);
        x += Llr::from(-5.0);
        assert_eq!(x, Llr::from(-3.0));
        x -= Llr::from(-3.0);
        assert_eq!(x, Llr::from(0.0));
    }

    #[test]
    fn test_equality_compares_both_fields() {
        // Same represented value, different decomposition.
        let from_real = Llr::from(-1.0);
        let explicit = Llr::new(Gf2::ONE, 1.0);
        assert_eq!(from_real, explicit);

        // Same magnitude, different sign.
        assert_ne!(Llr::new(Gf2::ZERO, 1.0), Llr::new(Gf2::ONE, 1.0));
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(Llr::default(), Llr::ZERO);
        assert_eq!(Llr::ZERO.to_f64(), 0.0);
    }

    #[test]
    fn test_llrs_from_bits_signs() {
        let bits = [Gf2::ZERO, Gf2::ONE, Gf2::ZERO];
        let llrs = llrs_from_bits(&bits, 0.02, 0);
        assert_eq!(llrs.len(), 3);
        assert!(llrs[0].to_f64() > 0.0);
        assert!(llrs[1].to_f64() < 0.0);
        assert!(llrs[2].to_f64() > 0.0);

        let expected = (0.98f64 / 0.02).ln();
        assert!((llrs[0].beta() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_llrs_from_bits_padded_tail() {
        let bits = [Gf2::ONE, Gf2::ZERO, Gf2::ONE, Gf2::ZERO];
        let llrs = llrs_from_bits(&bits, 0.1, 2);

        // Payload bits carry the channel belief.
        let base = (0.9f64 / 0.1).ln();
        assert!((llrs[0].to_f64() + base).abs() < 1e-12);
        assert!((llrs[1].to_f64() - base).abs() < 1e-12);

        // Padded bits carry the fixed large confidence.
        assert_eq!(llrs[2].to_f64(), -PADDED_BIT_MAGNITUDE);
        assert_eq!(llrs[3].to_f64(), PADDED_BIT_MAGNITUDE);
    }

    #[test]
    #[should_panic(expected = "qber must be in (0, 0.5)")]
    fn test_llrs_from_bits_rejects_bad_qber() {
        llrs_from_bits(&[Gf2::ZERO], 0.5, 0);
    }
}
