//! Scalar expression tree over typed operands.
#![forbid(unsafe_code)]

use vex_types::Kind;

use crate::literal::Literal;

/// Arithmetic and logical binary operators.
///
/// `And`/`Or` use Kleene three-valued logic; the arithmetic operators
/// follow the numeric promotion lattice, with `Divide` promoting integer
/// operands to `Double` (true division).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    And,
    Or,
}

/// Comparison operators with three-valued results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Pattern-matching operators over text/binary operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOp {
    /// `%` matches any sequence (including empty), `_` exactly one
    /// codepoint; case-sensitive; anchored to the full subject.
    Like,
    /// Negation of [`PatternOp::Like`] for non-null operands.
    NotLike,
    /// [`PatternOp::Like`] with simple (not locale-sensitive) case folding
    /// applied to subject and pattern.
    ILike,
    /// Subject matched against the operand compiled as a regular
    /// expression, with search semantics: the pattern may match anywhere
    /// in the subject unless it carries its own anchors.
    RLike,
}

/// Scalar expression over columns identified by `F`.
///
/// The tree arrives fully resolved: column references are disambiguated
/// and every leaf carries either a field id or a literal. Result kinds
/// are statically derivable by walking the tree through the coercion
/// rules, without touching data.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarExpr<F> {
    Column(F),
    Literal(Literal),
    Binary {
        left: Box<ScalarExpr<F>>,
        op: BinaryOp,
        right: Box<ScalarExpr<F>>,
    },
    Compare {
        left: Box<ScalarExpr<F>>,
        op: CompareOp,
        right: Box<ScalarExpr<F>>,
    },
    Pattern {
        expr: Box<ScalarExpr<F>>,
        op: PatternOp,
        pattern: Box<ScalarExpr<F>>,
    },
    Not(Box<ScalarExpr<F>>),
    IsNull {
        expr: Box<ScalarExpr<F>>,
        negated: bool,
    },
    /// Byte count for `Binary` operands, codepoint count for `Text`.
    Length(Box<ScalarExpr<F>>),
    Cast {
        expr: Box<ScalarExpr<F>>,
        target: Kind,
        /// `true` for `TRY_CAST`: per-value conversion failures become
        /// null elements instead of surfacing as errors.
        safe: bool,
    },
}

impl<F> ScalarExpr<F> {
    #[inline]
    pub fn column(fid: F) -> Self {
        ScalarExpr::Column(fid)
    }

    #[inline]
    pub fn literal(value: impl Into<Literal>) -> Self {
        ScalarExpr::Literal(value.into())
    }

    #[inline]
    pub fn null() -> Self {
        ScalarExpr::Literal(Literal::Null)
    }

    #[inline]
    pub fn binary(left: ScalarExpr<F>, op: BinaryOp, right: ScalarExpr<F>) -> Self {
        ScalarExpr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    #[inline]
    pub fn compare(left: ScalarExpr<F>, op: CompareOp, right: ScalarExpr<F>) -> Self {
        ScalarExpr::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    #[inline]
    pub fn pattern(expr: ScalarExpr<F>, op: PatternOp, pattern: ScalarExpr<F>) -> Self {
        ScalarExpr::Pattern {
            expr: Box::new(expr),
            op,
            pattern: Box::new(pattern),
        }
    }

    /// Wrap an expression in a logical NOT.
    #[allow(clippy::should_implement_trait)]
    #[inline]
    pub fn not(expr: ScalarExpr<F>) -> Self {
        ScalarExpr::Not(Box::new(expr))
    }

    #[inline]
    pub fn is_null(expr: ScalarExpr<F>) -> Self {
        ScalarExpr::IsNull {
            expr: Box::new(expr),
            negated: false,
        }
    }

    #[inline]
    pub fn is_not_null(expr: ScalarExpr<F>) -> Self {
        ScalarExpr::IsNull {
            expr: Box::new(expr),
            negated: true,
        }
    }

    #[inline]
    pub fn length(expr: ScalarExpr<F>) -> Self {
        ScalarExpr::Length(Box::new(expr))
    }

    #[inline]
    pub fn cast(expr: ScalarExpr<F>, target: Kind) -> Self {
        ScalarExpr::Cast {
            expr: Box::new(expr),
            target,
            safe: false,
        }
    }

    #[inline]
    pub fn try_cast(expr: ScalarExpr<F>, target: Kind) -> Self {
        ScalarExpr::Cast {
            expr: Box::new(expr),
            target,
            safe: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type E = ScalarExpr<u32>;

    #[test]
    fn builders_preserve_structure() {
        let cmp = E::compare(E::column(1), CompareOp::Eq, E::literal(5i64));
        match cmp {
            ScalarExpr::Compare { left, op, right } => {
                assert_eq!(*left, ScalarExpr::Column(1));
                assert_eq!(op, CompareOp::Eq);
                assert_eq!(*right, ScalarExpr::Literal(Literal::Integer(5)));
            }
            other => panic!("expected Compare, got {other:?}"),
        }
    }

    #[test]
    fn cast_builders_set_safety_flag() {
        match E::cast(E::column(1), Kind::Integer) {
            ScalarExpr::Cast { safe, target, .. } => {
                assert!(!safe);
                assert_eq!(target, Kind::Integer);
            }
            other => panic!("expected Cast, got {other:?}"),
        }
        match E::try_cast(E::column(1), Kind::Integer) {
            ScalarExpr::Cast { safe, .. } => assert!(safe),
            other => panic!("expected Cast, got {other:?}"),
        }
    }

    #[test]
    fn generic_field_id_works_with_strings() {
        let expr = ScalarExpr::<&'static str>::compare(
            ScalarExpr::column("name"),
            CompareOp::Eq,
            ScalarExpr::literal("Calypso"),
        );
        match expr {
            ScalarExpr::Compare { left, .. } => {
                assert_eq!(*left, ScalarExpr::Column("name"));
            }
            other => panic!("expected Compare, got {other:?}"),
        }
    }

    #[test]
    fn deep_not_chain_nests_once_per_wrap() {
        let mut expr = E::column(42);
        for _ in 0..64 {
            expr = E::not(expr);
        }
        let mut count = 0usize;
        let mut cur = &expr;
        loop {
            match cur {
                ScalarExpr::Not(inner) => {
                    count += 1;
                    cur = inner;
                }
                ScalarExpr::Column(fid) => {
                    assert_eq!(*fid, 42);
                    break;
                }
                other => panic!("unexpected node {other:?}"),
            }
        }
        assert_eq!(count, 64);
    }
}
