use std::fmt;
use thiserror::Error;

/// Unified error type for all vex operations.
///
/// Every failure mode of the engine maps onto one of these variants. The
/// first three correspond to query errors a caller can act on; the rest
/// indicate bugs or lower-level failures.
///
/// # Error Handling Strategy
///
/// Errors propagate upward with the `?` operator. `TypeMismatch` and
/// `PatternError` are always surfaced to the caller: they mean the query
/// cannot be evaluated as written. `CastError` is surfaced for `CAST` but
/// converted to a per-element null by `TRY_CAST`; that conversion happens
/// inside the cast executor and never escapes it.
///
/// `Error` is `Send + Sync`, so batches may be evaluated on independent
/// worker threads and their failures joined safely.
#[derive(Error, Debug)]
pub enum Error {
    /// No coercion or cast path exists between the operand kinds for the
    /// requested operator.
    ///
    /// Raised during static kind resolution, before any data is touched:
    /// - implicit `Double`/`Decimal` pairing in arithmetic or comparison
    /// - interval-plus-interval arithmetic permutations
    /// - cast targets with no edge from the source kind
    ///
    /// This always indicates a query that cannot be evaluated as written;
    /// it is never converted to a null result.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An explicit `CAST` conversion failed on a concrete value.
    ///
    /// Typical causes are malformed parses (`CAST('apple' AS INTEGER)`) or
    /// values outside the target's representable range. `TRY_CAST` maps
    /// this variant — and only this variant — to a null element.
    #[error("cast error: {0}")]
    CastError(String),

    /// A malformed regular expression was supplied to `RLIKE`.
    ///
    /// Always surfaced; a pattern that does not compile cannot produce a
    /// meaningful three-valued result.
    #[error("pattern error: {0}")]
    PatternError(String),

    /// Arrow library error during columnar data operations.
    ///
    /// Wraps failures from Arrow builders and array downcasts. These
    /// typically indicate data format incompatibilities rather than query
    /// errors.
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Internal error indicating a bug or unexpected state.
    ///
    /// Examples: an expression references a field that is absent from the
    /// batch, a decimal array carries an out-of-range payload, or checked
    /// integer arithmetic overflowed. These should not occur during normal
    /// operation.
    #[error("an internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create a cast error from any displayable error.
    ///
    /// # Examples
    ///
    /// ```
    /// use vex_result::Error;
    ///
    /// fn parse_number(input: &str) -> Result<i64, Error> {
    ///     input.parse::<i64>().map_err(Error::cast)
    /// }
    ///
    /// assert_eq!(parse_number("42").unwrap(), 42);
    /// assert!(matches!(parse_number("apple"), Err(Error::CastError(_))));
    /// ```
    #[inline]
    pub fn cast<E: fmt::Display>(err: E) -> Self {
        Error::CastError(err.to_string())
    }

    /// Create a pattern error from any displayable error.
    #[inline]
    pub fn pattern<E: fmt::Display>(err: E) -> Self {
        Error::PatternError(err.to_string())
    }

    /// Create a type-mismatch error for an operator applied to two kinds.
    #[inline]
    pub fn type_mismatch(context: impl fmt::Display) -> Self {
        Error::TypeMismatch(context.to_string())
    }
}
