//! The two-element field.

use super::FieldOperators;
use serde::{Deserialize, Serialize};

/// Z/2Z. Addition is xor, multiplication is and.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Z2Field;

impl FieldOperators for Z2Field {
    type Element = bool;

    const HANDLES_ONLY_Z2: bool = true;

    fn characteristic(&self) -> u64 {
        2
    }

    fn from_u64(&self, value: u64) -> bool {
        value & 1 == 1
    }

    fn to_u64(&self, element: bool) -> u64 {
        u64::from(element)
    }

    fn additive_identity(&self) -> bool {
        false
    }

    fn multiplicative_identity(&self) -> bool {
        true
    }

    fn add(&self, a: bool, b: bool) -> bool {
        a ^ b
    }

    fn subtract(&self, a: bool, b: bool) -> bool {
        a ^ b
    }

    fn multiply(&self, a: bool, b: bool) -> bool {
        a & b
    }

    fn additive_inverse(&self, a: bool) -> bool {
        a
    }

    fn multiplicative_inverse(&self, a: bool) -> bool {
        a
    }

    fn is_zero(&self, a: bool) -> bool {
        !a
    }
}
