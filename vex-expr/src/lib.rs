//! Typed expression tree consumed by the vex evaluation engine.
//!
//! The parser/planner collaborators hand the engine a fully resolved
//! [`ScalarExpr`] whose column references have already been disambiguated;
//! this crate defines that tree and the literal values it carries. It
//! deliberately does not depend on Arrow: literals defer columnar concerns
//! to the compute crate.

pub mod expr;
pub mod literal;

pub use expr::{BinaryOp, CompareOp, PatternOp, ScalarExpr};
pub use literal::Literal;
