//! Error types for field configuration and matrix construction.
//!
//! Only configuration and input validation can fail. Column additions,
//! zeroing and swaps never return errors: keeping them meaningful for the
//! barcode is the caller's responsibility.

/// Invalid field configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The largest allowed characteristic is below 2.
    #[error("characteristic must be at least 2, got maximum {max}")]
    CharacteristicTooSmall {
        /// Requested upper bound.
        max: u32,
    },

    /// The characteristic interval is empty.
    #[error("invalid characteristic interval [{min}, {max}]")]
    InvalidInterval {
        /// Requested lower bound.
        min: u32,
        /// Requested upper bound.
        max: u32,
    },

    /// No prime lies in the characteristic interval.
    #[error("interval [{min}, {max}] does not contain a prime number")]
    NoPrimeInInterval {
        /// Requested lower bound.
        min: u32,
        /// Requested upper bound.
        max: u32,
    },

    /// A single-characteristic field was asked for a non-prime modulus.
    #[error("{0} is not a prime number")]
    NotPrime(u32),

    /// The product of all primes of the interval overflows the element type.
    #[error("product of the primes in [{min}, {max}] does not fit in 64 bits")]
    ProductOverflow {
        /// Requested lower bound.
        min: u32,
        /// Requested upper bound.
        max: u32,
    },
}

/// Invalid input handed to a matrix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    /// A boundary references a face that was never inserted (or was removed).
    #[error("face {id} is not part of the matrix")]
    UnknownFace {
        /// Face identifier.
        id: usize,
    },

    /// A face identifier was inserted twice.
    #[error("face {id} was already inserted")]
    DuplicateFace {
        /// Face identifier.
        id: usize,
    },

    /// The identifier leaves no successor for the next automatic one.
    #[error("face identifier {id} is out of range")]
    IdentifierOutOfRange {
        /// Face identifier.
        id: usize,
    },

    /// Over a multi-field, the face pairs differently in some of the packed
    /// prime fields, which a single chain basis cannot represent.
    #[error("face {id} meets a pivot vanishing modulo {characteristics:?}")]
    ZeroDivisorPivot {
        /// Face identifier.
        id: usize,
        /// Characteristics in which the pivot is zero.
        characteristics: Vec<u64>,
    },
}

/// Any error raised by the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Field configuration error.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Matrix input error.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Result alias for fallible crate operations.
pub type Result<T> = std::result::Result<T, Error>;
