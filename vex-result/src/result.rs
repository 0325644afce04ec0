use crate::error::Error;

/// Result type alias used throughout vex.
///
/// Shorthand for `std::result::Result<T, Error>`; every fallible vex
/// operation returns this type.
pub type Result<T> = std::result::Result<T, Error>;
