//! Field Module: Coefficient Fields for Matrix Reduction
//!
//! Column entries live in a finite field. A field is an explicit context
//! object implementing [`FieldOperators`]; its elements are small `Copy`
//! values and every arithmetic operation goes through the context. Several
//! contexts (for instance two multi-fields over different prime intervals)
//! can therefore coexist in one process.
//!
//! ## Available Fields
//!
//! - [`Z2Field`]: characteristic 2, elements are `bool`. Column additions
//!   degenerate to symmetric differences.
//! - [`ZpField`]: Z/pZ for a prime `p` fitting in 32 bits.
//! - [`MultiField`]: the product of all primes in an interval, packed into a
//!   single modulus. Reducing once over the multi-field amounts to reducing
//!   over every prime of the interval at once (CRT decomposition), with
//!   [`MultiField::partial_inverse`] handling elements that vanish modulo
//!   some of the primes.
//!
//! All results are canonical: they lie in `[0, characteristic)`.

mod multi_field;
mod z2;
mod zp;

pub use multi_field::MultiField;
pub use z2::Z2Field;
pub use zp::ZpField;

use std::fmt;
use std::hash::Hash;

/// Arithmetic context of a coefficient field.
pub trait FieldOperators: Clone + fmt::Debug {
    /// Field element. Values are always kept in canonical form.
    type Element: Copy + Eq + Hash + fmt::Debug + fmt::Display;

    /// `true` when the field is Z2, in which case cells carry no value.
    const HANDLES_ONLY_Z2: bool = false;

    /// Characteristic of the field (product of the primes for a multi-field).
    fn characteristic(&self) -> u64;

    /// Reduces an unsigned integer into the field.
    fn from_u64(&self, value: u64) -> Self::Element;

    /// Unsigned representative of an element.
    fn to_u64(&self, element: Self::Element) -> u64;

    fn additive_identity(&self) -> Self::Element;

    fn multiplicative_identity(&self) -> Self::Element;

    fn add(&self, a: Self::Element, b: Self::Element) -> Self::Element;

    fn subtract(&self, a: Self::Element, b: Self::Element) -> Self::Element;

    fn multiply(&self, a: Self::Element, b: Self::Element) -> Self::Element;

    fn additive_inverse(&self, a: Self::Element) -> Self::Element;

    /// Multiplicative inverse. The inverse of zero is zero; asking for it is
    /// a caller error that goes undetected.
    fn multiplicative_inverse(&self, a: Self::Element) -> Self::Element;

    /// Reduces a signed integer into the field.
    fn from_i64(&self, value: i64) -> Self::Element {
        let magnitude = self.from_u64(value.unsigned_abs());
        if value < 0 {
            self.additive_inverse(magnitude)
        } else {
            magnitude
        }
    }

    /// `a * m + b`
    fn multiply_and_add(
        &self,
        a: Self::Element,
        m: Self::Element,
        b: Self::Element,
    ) -> Self::Element {
        self.add(self.multiply(a, m), b)
    }

    /// `(a + b) * m`
    fn add_and_multiply(
        &self,
        a: Self::Element,
        b: Self::Element,
        m: Self::Element,
    ) -> Self::Element {
        self.multiply(self.add(a, b), m)
    }

    fn is_zero(&self, a: Self::Element) -> bool {
        a == self.additive_identity()
    }

    fn handles_only_z2(&self) -> bool {
        Self::HANDLES_ONLY_Z2
    }

    /// `true` when `a` has a multiplicative inverse.
    fn is_invertible(&self, a: Self::Element) -> bool {
        !self.is_zero(a)
    }

    /// Characteristics of the prime fields in which `a` is zero. Empty for
    /// an invertible element.
    fn vanishing_characteristics(&self, a: Self::Element) -> Vec<u64> {
        if self.is_zero(a) {
            vec![self.characteristic()]
        } else {
            Vec::new()
        }
    }

    /// Prime fields making up the coefficients, each with the idempotent
    /// projecting onto it. A field is its own single component.
    fn components(&self) -> Vec<(u64, Self::Element)> {
        vec![(self.characteristic(), self.multiplicative_identity())]
    }
}

/// Deterministic primality test by trial division over `6k ± 1`.
pub(crate) fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u64;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Inverse of `a` modulo `modulus` by the extended Euclidean algorithm.
///
/// Returns 0 when `a` is not invertible.
pub(crate) fn mod_inverse(a: u64, modulus: u64) -> u64 {
    if modulus <= 1 {
        return 0;
    }
    let (mut old_r, mut r) = (i128::from(a % modulus), i128::from(modulus));
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }
    if old_r != 1 {
        return 0;
    }
    let m = i128::from(modulus);
    // The reduced coefficient lies in [0, modulus), which fits in u64.
    u64::try_from(((old_s % m) + m) % m).unwrap_or(0)
}
