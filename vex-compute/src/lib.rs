//! Vectorized evaluation of scalar expressions over Arrow columns.
//!
//! [`Evaluator`] walks a resolved [`vex_expr::ScalarExpr`], derives the
//! result kind of every node from operand kinds alone, and then runs the
//! matching kernel over whole columns. Kind errors surface before any data
//! is touched; data errors abort the batch without producing a partial
//! result.

pub mod arith;
pub mod cast;
pub mod coerce;
pub mod column;
pub mod compare;
pub mod decimal;
pub mod eval;
pub mod pattern;
pub mod temporal;

pub use column::Column;
pub use eval::Evaluator;
