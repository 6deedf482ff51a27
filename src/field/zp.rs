//! Prime fields Z/pZ.

use super::{is_prime, mod_inverse, FieldOperators};
use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Z/pZ for a prime `p < 2^32`.
///
/// Products are computed in `u64`, so no intermediate value can overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZpField {
    characteristic: u32,
}

impl ZpField {
    /// Builds the field of characteristic `p`.
    ///
    /// # Errors
    /// [`FieldError::NotPrime`] if `p` is not prime (0 and 1 included).
    pub fn new(p: u32) -> Result<Self, FieldError> {
        if !is_prime(u64::from(p)) {
            return Err(FieldError::NotPrime(p));
        }
        debug!(characteristic = p, "prime field initialized");
        Ok(Self { characteristic: p })
    }

    fn reduce(&self, value: u64) -> u32 {
        // value % p < p <= u32::MAX
        (value % u64::from(self.characteristic)) as u32
    }
}

impl FieldOperators for ZpField {
    type Element = u32;

    fn characteristic(&self) -> u64 {
        u64::from(self.characteristic)
    }

    fn from_u64(&self, value: u64) -> u32 {
        self.reduce(value)
    }

    fn to_u64(&self, element: u32) -> u64 {
        u64::from(element)
    }

    fn additive_identity(&self) -> u32 {
        0
    }

    fn multiplicative_identity(&self) -> u32 {
        1
    }

    fn add(&self, a: u32, b: u32) -> u32 {
        self.reduce(u64::from(a) + u64::from(b))
    }

    fn subtract(&self, a: u32, b: u32) -> u32 {
        if a >= b {
            a - b
        } else {
            self.reduce(u64::from(a) + u64::from(self.characteristic) - u64::from(b))
        }
    }

    fn multiply(&self, a: u32, b: u32) -> u32 {
        self.reduce(u64::from(a) * u64::from(b))
    }

    fn additive_inverse(&self, a: u32) -> u32 {
        if a == 0 {
            0
        } else {
            self.characteristic - a
        }
    }

    fn multiplicative_inverse(&self, a: u32) -> u32 {
        self.reduce(mod_inverse(u64::from(a), u64::from(self.characteristic)))
    }

    fn multiply_and_add(&self, a: u32, m: u32, b: u32) -> u32 {
        self.reduce(u64::from(a) * u64::from(m) + u64::from(b))
    }
}
