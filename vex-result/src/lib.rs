//! Error types and result definitions for the vex expression engine.
//!
//! vex uses a single error enum ([`Error`]) and result alias ([`Result<T>`])
//! across all crates. All fallible operations return `Result<T>` and
//! propagate with the `?` operator; the variant carries enough context for
//! callers to distinguish query errors (bad casts, incompatible operand
//! kinds, malformed regexes) from engine bugs.
//!
//! Null propagation is deliberately *not* an error: a missing operand flows
//! through the three-valued-logic value channels, never through `Error`.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
