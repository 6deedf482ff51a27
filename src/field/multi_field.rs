//! Multi-field: several prime fields packed into one modulus.
//!
//! ## Representation
//!
//! For the primes `p_1, ..., p_k` of an interval `[min, max]`, elements are
//! residues modulo `N = p_1 * ... * p_k`. By the Chinese remainder theorem a
//! residue is exactly a tuple of residues modulo every `p_i`, so one
//! reduction over Z/NZ performs the reduction over every Z/p_iZ at once.
//!
//! The CRT idempotents `e_i = (N / p_i)^(p_i - 1) mod N` satisfy
//! `e_i = 1 (mod p_i)` and `e_i = 0 (mod p_j)` for `j != i`. They are used by
//! [`MultiField::partial_inverse`], which inverts an element on the primes
//! where it is a unit and zeroes it on the others.

use super::{is_prime, mod_inverse, FieldOperators};
use crate::error::FieldError;
use tracing::debug;

/// Product of the prime fields whose characteristic lies in `[min, max]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiField {
    primes: Vec<u32>,
    product: u64,
    partials: Vec<u64>,
}

impl MultiField {
    /// Builds the multi-field of all primes in `[minimum, maximum]`.
    ///
    /// # Errors
    /// Checked in this order: `maximum < 2`, `minimum > maximum`, a
    /// degenerate interval whose single value is not prime, an interval with
    /// no prime at all, and a product of primes that does not fit in `u64`.
    pub fn new(minimum: u32, maximum: u32) -> Result<Self, FieldError> {
        if maximum < 2 {
            return Err(FieldError::CharacteristicTooSmall { max: maximum });
        }
        if minimum > maximum {
            return Err(FieldError::InvalidInterval {
                min: minimum,
                max: maximum,
            });
        }
        if minimum == maximum && !is_prime(u64::from(minimum)) {
            return Err(FieldError::NoPrimeInInterval {
                min: minimum,
                max: maximum,
            });
        }

        // stops at the first prime that overflows the product
        let mut primes = Vec::new();
        let mut product = 1u64;
        for n in (minimum..=maximum).filter(|&n| is_prime(u64::from(n))) {
            product = product
                .checked_mul(u64::from(n))
                .ok_or(FieldError::ProductOverflow {
                    min: minimum,
                    max: maximum,
                })?;
            primes.push(n);
        }
        if primes.is_empty() {
            return Err(FieldError::NoPrimeInInterval {
                min: minimum,
                max: maximum,
            });
        }

        let partials = primes
            .iter()
            .map(|&p| pow_mod(product / u64::from(p), u64::from(p) - 1, product))
            .collect();

        debug!(
            min = minimum,
            max = maximum,
            primes = primes.len(),
            product,
            "multi-field initialized"
        );

        Ok(Self {
            primes,
            product,
            partials,
        })
    }

    /// Primes packed into this field, in increasing order.
    pub fn primes(&self) -> &[u32] {
        &self.primes
    }

    /// Partial inverse of `a` with respect to `product_of_characteristics`.
    ///
    /// With `g = gcd(a, N)`: if `g` equals `product_of_characteristics` the
    /// element vanishes on every requested prime and `(0, 1)` is returned.
    /// Otherwise `q = product_of_characteristics / g` is the product of the
    /// primes where `a` is a unit, and the returned element is the inverse of
    /// `a` modulo `q` projected onto those primes (zero on the others).
    pub fn partial_inverse(&self, a: u64, product_of_characteristics: u64) -> (u64, u64) {
        let a = a % self.product;
        let gcd = gcd(a, self.product);
        if gcd == product_of_characteristics {
            return (0, 1);
        }
        let qt = product_of_characteristics / gcd;
        let identity = self.partial_multiplicative_identity(qt);
        let inverse = mod_inverse(a, qt);
        (self.multiply(identity, self.from_u64(inverse)), qt)
    }

    /// Sum of the CRT idempotents of the primes dividing `a`.
    ///
    /// This is the element equal to 1 modulo every prime dividing `a` and to
    /// 0 modulo the others. The zero element maps to the multiplicative
    /// identity.
    pub fn partial_multiplicative_identity(&self, a: u64) -> u64 {
        if a == 0 {
            return self.multiplicative_identity();
        }
        self.primes
            .iter()
            .zip(&self.partials)
            .filter(|(p, _)| a % u64::from(**p) == 0)
            .fold(0, |acc, (_, &e)| self.add(acc, e))
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    // Both factors are below the modulus, so the product fits in u128 and
    // the remainder fits back in u64.
    ((u128::from(a) * u128::from(b)) % u128::from(modulus)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    let mut result = 1 % modulus;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        exp >>= 1;
        base = mul_mod(base, base, modulus);
    }
    result
}

impl FieldOperators for MultiField {
    type Element = u64;

    fn characteristic(&self) -> u64 {
        self.product
    }

    fn from_u64(&self, value: u64) -> u64 {
        value % self.product
    }

    fn to_u64(&self, element: u64) -> u64 {
        element
    }

    fn additive_identity(&self) -> u64 {
        0
    }

    fn multiplicative_identity(&self) -> u64 {
        1 % self.product
    }

    fn add(&self, a: u64, b: u64) -> u64 {
        ((u128::from(a) + u128::from(b)) % u128::from(self.product)) as u64
    }

    fn subtract(&self, a: u64, b: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            self.product - (b - a)
        }
    }

    fn multiply(&self, a: u64, b: u64) -> u64 {
        mul_mod(a, b, self.product)
    }

    fn additive_inverse(&self, a: u64) -> u64 {
        if a == 0 {
            0
        } else {
            self.product - a
        }
    }

    fn multiplicative_inverse(&self, a: u64) -> u64 {
        self.partial_inverse(a, self.product).0
    }

    fn is_invertible(&self, a: u64) -> bool {
        gcd(a, self.product) == 1
    }

    fn vanishing_characteristics(&self, a: u64) -> Vec<u64> {
        self.primes
            .iter()
            .map(|&p| u64::from(p))
            .filter(|&p| a % p == 0)
            .collect()
    }

    fn components(&self) -> Vec<(u64, u64)> {
        self.primes
            .iter()
            .map(|&p| u64::from(p))
            .zip(self.partials.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors() {
        assert_eq!(
            MultiField::new(0, 1),
            Err(FieldError::CharacteristicTooSmall { max: 1 })
        );
        assert_eq!(
            MultiField::new(7, 5),
            Err(FieldError::InvalidInterval { min: 7, max: 5 })
        );
        assert_eq!(
            MultiField::new(9, 9),
            Err(FieldError::NoPrimeInInterval { min: 9, max: 9 })
        );
        assert_eq!(
            MultiField::new(24, 28),
            Err(FieldError::NoPrimeInInterval { min: 24, max: 28 })
        );
        assert_eq!(
            MultiField::new(2, 100),
            Err(FieldError::ProductOverflow { min: 2, max: 100 })
        );
    }

    #[test]
    fn test_overflow_is_reported_without_scanning_the_interval() {
        // the product overflows at 53, long before the end of the range
        assert_eq!(
            MultiField::new(0, u32::MAX),
            Err(FieldError::ProductOverflow { min: 0, max: u32::MAX })
        );
        assert_eq!(
            MultiField::new(4_000_000_000, u32::MAX),
            Err(FieldError::ProductOverflow { min: 4_000_000_000, max: u32::MAX })
        );
    }

    #[test]
    fn test_units_and_components() {
        let f = MultiField::new(2, 7).unwrap();
        assert!(f.is_invertible(11));
        assert!(!f.is_invertible(6));
        assert!(!f.is_invertible(0));
        assert_eq!(f.vanishing_characteristics(6), vec![2, 3]);
        assert_eq!(f.vanishing_characteristics(0), vec![2, 3, 5, 7]);
        assert!(f.vanishing_characteristics(1).is_empty());

        let components = f.components();
        let characteristics: Vec<u64> = components.iter().map(|&(p, _)| p).collect();
        assert_eq!(characteristics, vec![2, 3, 5, 7]);
        // inverting inside a component gives back its idempotent
        for &(p, e) in &components {
            let x = f.multiply(e, 4);
            if p == 2 {
                assert_eq!(x, 0);
            } else {
                assert_eq!(f.multiply(x, f.multiplicative_inverse(x)), e);
            }
        }
    }

    #[test]
    fn test_product_and_primes() {
        let f = MultiField::new(2, 7).unwrap();
        assert_eq!(f.primes(), &[2, 3, 5, 7]);
        assert_eq!(f.characteristic(), 210);

        let single = MultiField::new(5, 5).unwrap();
        assert_eq!(single.characteristic(), 5);
    }

    #[test]
    fn test_idempotents() {
        let f = MultiField::new(2, 7).unwrap();
        for (i, &e) in f.partials.iter().enumerate() {
            for (j, &p) in f.primes().iter().enumerate() {
                let expected = u64::from(i == j);
                assert_eq!(e % u64::from(p), expected);
            }
        }
        let total = f.partials.iter().fold(0, |acc, &e| f.add(acc, e));
        assert_eq!(total, 1);
    }

    #[test]
    fn test_full_inverse_of_unit() {
        let f = MultiField::new(2, 7).unwrap();
        for a in [1u64, 11, 13, 209] {
            let inv = f.multiplicative_inverse(a);
            assert_eq!(f.multiply(a, inv), 1, "a = {}", a);
        }
    }

    #[test]
    fn test_partial_inverse_of_zero_divisor() {
        let f = MultiField::new(2, 7).unwrap();
        // 6 vanishes mod 2 and 3, is a unit mod 5 and 7.
        let (inv, q) = f.partial_inverse(6, f.characteristic());
        assert_eq!(q, 35);
        let prod = f.multiply(6, inv);
        assert_eq!(prod % 5, 1);
        assert_eq!(prod % 7, 1);
        assert_eq!(inv % 2, 0);
        assert_eq!(inv % 3, 0);
    }

    #[test]
    fn test_partial_inverse_of_vanishing_element() {
        let f = MultiField::new(2, 7).unwrap();
        assert_eq!(f.partial_inverse(0, 210), (0, 1));
    }

    #[test]
    fn test_partial_multiplicative_identity() {
        let f = MultiField::new(2, 7).unwrap();
        assert_eq!(f.partial_multiplicative_identity(0), 1);
        let e = f.partial_multiplicative_identity(35);
        assert_eq!(e % 5, 1);
        assert_eq!(e % 7, 1);
        assert_eq!(e % 2, 0);
        assert_eq!(e % 3, 0);
    }

    #[test]
    fn test_wide_modulus_arithmetic() {
        // Product of the primes in [40, 70] is above 2^32.
        let f = MultiField::new(40, 70).unwrap();
        assert!(f.characteristic() > u64::from(u32::MAX));
        let a = f.characteristic() - 1;
        assert_eq!(f.multiply(a, a), 1);
        assert_eq!(f.add(a, a), f.characteristic() - 2);
        assert_eq!(f.subtract(0, 1), a);
        assert_eq!(f.multiply(a, f.multiplicative_inverse(a)), 1);
    }
}
