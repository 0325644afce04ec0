//! Expression dispatcher: static kind derivation plus columnar
//! evaluation.
//!
//! Evaluation is two-phase. [`Evaluator::infer_kind`] walks the tree with
//! operand kinds only and raises every structural `TypeMismatch` before a
//! single element is read. The evaluation walk then produces one
//! [`Column`] per node, broadcasting literal subtrees as scalars so a
//! constant never costs a materialized column. Any error aborts the whole
//! batch; there is no partial output.

use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};
use vex_expr::{BinaryOp, Literal, ScalarExpr};
use vex_result::{Error, Result};
use vex_types::{Kind, Value};

use crate::column::Column;
use crate::{arith, cast, coerce, compare, pattern};

/// Either a per-row column or a scalar broadcast over the batch.
enum Evaluated {
    Scalar { kind: Kind, value: Option<Value> },
    Column(Column),
}

impl Evaluated {
    fn kind(&self) -> Kind {
        match self {
            Evaluated::Scalar { kind, .. } => *kind,
            Evaluated::Column(column) => column.kind(),
        }
    }

    fn is_scalar(&self) -> bool {
        matches!(self, Evaluated::Scalar { .. })
    }

    fn value_at(&self, idx: usize) -> Result<Option<Value>> {
        match self {
            Evaluated::Scalar { value, .. } => Ok(value.clone()),
            Evaluated::Column(column) => column.value(idx),
        }
    }
}

/// Column bindings for one evaluation: a batch of Arrow-backed columns
/// or a single row of scalars.
enum Input<'a, F> {
    Batch {
        columns: &'a FxHashMap<F, Column>,
        rows: usize,
    },
    Row {
        bindings: &'a FxHashMap<F, Option<Value>>,
    },
}

impl<F> Input<'_, F> {
    fn rows(&self) -> usize {
        match self {
            Input::Batch { rows, .. } => *rows,
            Input::Row { .. } => 1,
        }
    }
}

pub struct Evaluator;

impl Evaluator {
    /// Collect every column referenced by the expression into `acc`.
    pub fn collect_fields<F: Hash + Eq + Copy>(expr: &ScalarExpr<F>, acc: &mut FxHashSet<F>) {
        match expr {
            ScalarExpr::Column(fid) => {
                acc.insert(*fid);
            }
            ScalarExpr::Literal(_) => {}
            ScalarExpr::Binary { left, right, .. } => {
                Self::collect_fields(left, acc);
                Self::collect_fields(right, acc);
            }
            ScalarExpr::Compare { left, right, .. } => {
                Self::collect_fields(left, acc);
                Self::collect_fields(right, acc);
            }
            ScalarExpr::Pattern { expr, pattern, .. } => {
                Self::collect_fields(expr, acc);
                Self::collect_fields(pattern, acc);
            }
            ScalarExpr::Not(inner) => Self::collect_fields(inner, acc),
            ScalarExpr::IsNull { expr, .. } => Self::collect_fields(expr, acc),
            ScalarExpr::Length(inner) => Self::collect_fields(inner, acc),
            ScalarExpr::Cast { expr, .. } => Self::collect_fields(expr, acc),
        }
    }

    /// Derive the result kind of an expression from column kinds alone.
    ///
    /// This is the only place structural errors can originate; once it
    /// passes, evaluation may still fail on data (`CastError`,
    /// `PatternError`, overflow) but never on kinds.
    pub fn infer_kind<F, R>(expr: &ScalarExpr<F>, resolve: &mut R) -> Result<Kind>
    where
        F: Copy,
        R: FnMut(F) -> Option<Kind>,
    {
        match expr {
            ScalarExpr::Column(fid) => resolve(*fid).ok_or_else(|| {
                Error::Internal("expression references a column absent from the batch".into())
            }),
            ScalarExpr::Literal(lit) => Ok(lit.kind()),
            ScalarExpr::Binary { left, op, right } => {
                let lhs = Self::infer_kind(left, resolve)?;
                let rhs = Self::infer_kind(right, resolve)?;
                coerce::arithmetic_kind(*op, lhs, rhs)
            }
            ScalarExpr::Compare { left, right, .. } => {
                let lhs = Self::infer_kind(left, resolve)?;
                let rhs = Self::infer_kind(right, resolve)?;
                coerce::comparison_kind(lhs, rhs)?;
                Ok(Kind::Boolean)
            }
            ScalarExpr::Pattern { expr, op, pattern } => {
                let subject = Self::infer_kind(expr, resolve)?;
                if !subject.is_sequence() && subject != Kind::Null {
                    return Err(Error::type_mismatch(format!(
                        "{op:?} requires a TEXT or BINARY subject, found {subject}"
                    )));
                }
                let pat = Self::infer_kind(pattern, resolve)?;
                if !pat.is_sequence() && pat != Kind::Null {
                    return Err(Error::type_mismatch(format!(
                        "{op:?} requires a TEXT pattern, found {pat}"
                    )));
                }
                Ok(Kind::Boolean)
            }
            ScalarExpr::Not(inner) => {
                let kind = Self::infer_kind(inner, resolve)?;
                if !matches!(kind, Kind::Boolean | Kind::Null) {
                    return Err(Error::type_mismatch(format!(
                        "NOT requires a BOOLEAN operand, found {kind}"
                    )));
                }
                Ok(Kind::Boolean)
            }
            ScalarExpr::IsNull { expr, .. } => {
                Self::infer_kind(expr, resolve)?;
                Ok(Kind::Boolean)
            }
            ScalarExpr::Length(inner) => {
                let kind = Self::infer_kind(inner, resolve)?;
                if !kind.is_sequence() && kind != Kind::Null {
                    return Err(Error::type_mismatch(format!(
                        "LENGTH requires a TEXT or BINARY operand, found {kind}"
                    )));
                }
                Ok(Kind::Integer)
            }
            ScalarExpr::Cast { expr, target, .. } => {
                let from = Self::infer_kind(expr, resolve)?;
                coerce::check_cast(from, *target)?;
                Ok(*target)
            }
        }
    }

    /// Evaluate an expression over a batch of equal-length columns.
    ///
    /// The result column always has `row_count` rows; scalar subtrees
    /// are broadcast at the very end.
    pub fn evaluate<F: Hash + Eq + Copy>(
        expr: &ScalarExpr<F>,
        row_count: usize,
        columns: &FxHashMap<F, Column>,
    ) -> Result<Column> {
        for column in columns.values() {
            if column.len() != row_count {
                return Err(Error::Internal(format!(
                    "batch declared {row_count} rows but a column holds {}",
                    column.len()
                )));
            }
        }
        let result_kind =
            Self::infer_kind(expr, &mut |fid: F| columns.get(&fid).map(Column::kind))?;
        tracing::debug!("evaluating expression over {row_count} rows into {result_kind}");

        let input = Input::Batch {
            columns,
            rows: row_count,
        };
        match Self::eval_node(expr, &input)? {
            Evaluated::Column(column) => Ok(column),
            Evaluated::Scalar { kind, value } => {
                Column::from_values(kind, vec![value; row_count])
            }
        }
    }

    /// Evaluate an expression against a single row of scalar bindings.
    pub fn evaluate_scalar<F: Hash + Eq + Copy>(
        expr: &ScalarExpr<F>,
        bindings: &FxHashMap<F, Option<Value>>,
    ) -> Result<Option<Value>> {
        Self::infer_kind(expr, &mut |fid: F| {
            bindings
                .get(&fid)
                .map(|value| value.as_ref().map(Value::kind).unwrap_or(Kind::Null))
        })?;
        let input = Input::Row { bindings };
        match Self::eval_node(expr, &input)? {
            Evaluated::Scalar { value, .. } => Ok(value),
            Evaluated::Column(column) => column.value(0),
        }
    }

    fn eval_node<F: Hash + Eq + Copy>(
        expr: &ScalarExpr<F>,
        input: &Input<'_, F>,
    ) -> Result<Evaluated> {
        match expr {
            ScalarExpr::Column(fid) => match input {
                Input::Batch { columns, .. } => {
                    let column = columns.get(fid).ok_or_else(|| {
                        Error::Internal("expression references a column absent from the batch".into())
                    })?;
                    Ok(Evaluated::Column(column.clone()))
                }
                Input::Row { bindings } => {
                    let value = bindings.get(fid).ok_or_else(|| {
                        Error::Internal("expression references an unbound column".into())
                    })?;
                    Ok(Evaluated::Scalar {
                        kind: value.as_ref().map(Value::kind).unwrap_or(Kind::Null),
                        value: value.clone(),
                    })
                }
            },
            ScalarExpr::Literal(lit) => Ok(Evaluated::Scalar {
                kind: lit.kind(),
                value: literal_value(lit),
            }),
            ScalarExpr::Binary { left, op, right } => {
                let lhs = Self::eval_node(left, input)?;
                let rhs = Self::eval_node(right, input)?;
                if matches!(op, BinaryOp::And | BinaryOp::Or) {
                    return Self::logic_node(*op, &lhs, &rhs, input.rows());
                }
                let out_kind = coerce::arithmetic_kind(*op, lhs.kind(), rhs.kind())?;
                Self::zip_map(&lhs, &rhs, input.rows(), out_kind, |a, b| match (a, b) {
                    (Some(a), Some(b)) => arith::arith_values(*op, out_kind, a, b),
                    _ => Ok(None),
                })
            }
            ScalarExpr::Compare { left, op, right } => {
                let lhs = Self::eval_node(left, input)?;
                let rhs = Self::eval_node(right, input)?;
                let key = coerce::comparison_kind(lhs.kind(), rhs.kind())?;
                Self::zip_map(&lhs, &rhs, input.rows(), Kind::Boolean, |a, b| {
                    match (a, b) {
                        (Some(a), Some(b)) => {
                            compare::compare_values(*op, key, a, b).map(|v| Some(Value::Boolean(v)))
                        }
                        _ => Ok(None),
                    }
                })
            }
            ScalarExpr::Pattern { expr, op, pattern: pat } => {
                let subject = Self::eval_node(expr, input)?;
                let pat = Self::eval_node(pat, input)?;
                // Only a pattern shared by the whole batch goes into the
                // process-wide regex cache; per-row patterns compile
                // transiently.
                let cache = pat.is_scalar();
                Self::zip_map(&subject, &pat, input.rows(), Kind::Boolean, |a, b| {
                    match (a, b) {
                        (Some(a), Some(b)) => {
                            pattern::match_pattern(*op, a, b, cache)
                                .map(|v| Some(Value::Boolean(v)))
                        }
                        _ => Ok(None),
                    }
                })
            }
            ScalarExpr::Not(inner) => {
                let operand = Self::eval_node(inner, input)?;
                Self::map_unary(&operand, input.rows(), Kind::Boolean, |value| {
                    match value {
                        Some(Value::Boolean(b)) => Ok(Some(Value::Boolean(!b))),
                        None => Ok(None),
                        Some(other) => Err(Error::Internal(format!(
                            "NOT kernel received a {} operand",
                            other.kind()
                        ))),
                    }
                })
            }
            ScalarExpr::IsNull { expr, negated } => {
                let operand = Self::eval_node(expr, input)?;
                let negated = *negated;
                Self::map_unary(&operand, input.rows(), Kind::Boolean, move |value| {
                    Ok(Some(Value::Boolean(value.is_none() != negated)))
                })
            }
            ScalarExpr::Length(inner) => {
                let operand = Self::eval_node(inner, input)?;
                Self::map_unary(&operand, input.rows(), Kind::Integer, |value| match value {
                    Some(value) => cast::length_value(value).map(|n| Some(Value::Integer(n))),
                    None => Ok(None),
                })
            }
            ScalarExpr::Cast { expr, target, safe } => {
                let operand = Self::eval_node(expr, input)?;
                coerce::check_cast(operand.kind(), *target)?;
                let target = *target;
                let safe = *safe;
                Self::map_unary(&operand, input.rows(), target, move |value| match value {
                    Some(value) => match cast::cast_value(value, target) {
                        Ok(converted) => Ok(Some(converted)),
                        Err(Error::CastError(_)) if safe => Ok(None),
                        Err(err) => Err(err),
                    },
                    None => Ok(None),
                })
            }
        }
    }

    fn logic_node(
        op: BinaryOp,
        lhs: &Evaluated,
        rhs: &Evaluated,
        rows: usize,
    ) -> Result<Evaluated> {
        let combine = match op {
            BinaryOp::And => kleene_and,
            BinaryOp::Or => kleene_or,
            _ => return Err(Error::Internal("logic kernel received a non-logic op".into())),
        };
        Self::zip_map(lhs, rhs, rows, Kind::Boolean, |a, b| {
            let a = bool_operand(a)?;
            let b = bool_operand(b)?;
            Ok(combine(a, b).map(Value::Boolean))
        })
    }

    fn zip_map<K>(
        lhs: &Evaluated,
        rhs: &Evaluated,
        rows: usize,
        out_kind: Kind,
        kernel: K,
    ) -> Result<Evaluated>
    where
        K: Fn(Option<&Value>, Option<&Value>) -> Result<Option<Value>>,
    {
        if lhs.is_scalar() && rhs.is_scalar() {
            let a = lhs.value_at(0)?;
            let b = rhs.value_at(0)?;
            let value = kernel(a.as_ref(), b.as_ref())?;
            return Ok(Evaluated::Scalar {
                kind: out_kind,
                value,
            });
        }
        let mut out = Vec::with_capacity(rows);
        for idx in 0..rows {
            let a = lhs.value_at(idx)?;
            let b = rhs.value_at(idx)?;
            out.push(kernel(a.as_ref(), b.as_ref())?);
        }
        Ok(Evaluated::Column(Column::from_values(out_kind, out)?))
    }

    fn map_unary<K>(
        operand: &Evaluated,
        rows: usize,
        out_kind: Kind,
        kernel: K,
    ) -> Result<Evaluated>
    where
        K: Fn(Option<&Value>) -> Result<Option<Value>>,
    {
        if operand.is_scalar() {
            let value = operand.value_at(0)?;
            let value = kernel(value.as_ref())?;
            return Ok(Evaluated::Scalar {
                kind: out_kind,
                value,
            });
        }
        let mut out = Vec::with_capacity(rows);
        for idx in 0..rows {
            let value = operand.value_at(idx)?;
            out.push(kernel(value.as_ref())?);
        }
        Ok(Evaluated::Column(Column::from_values(out_kind, out)?))
    }
}

fn literal_value(lit: &Literal) -> Option<Value> {
    match lit {
        Literal::Null => None,
        Literal::Boolean(b) => Some(Value::Boolean(*b)),
        Literal::Integer(i) => Some(Value::Integer(*i)),
        Literal::Float(f) => Some(Value::Double(*f)),
        Literal::Decimal(d) => Some(Value::Decimal(*d)),
        Literal::String(s) => Some(Value::Text(s.clone())),
        Literal::Binary(b) => Some(Value::Binary(b.clone())),
        Literal::Date32(d) => Some(Value::Date(*d)),
        Literal::Time64(t) => Some(Value::Time(*t)),
        Literal::Timestamp(t) => Some(Value::Timestamp(*t)),
        Literal::Interval(i) => Some(Value::Interval(*i)),
    }
}

fn bool_operand(value: Option<&Value>) -> Result<Option<bool>> {
    match value {
        None => Ok(None),
        Some(Value::Boolean(b)) => Ok(Some(*b)),
        Some(other) => Err(Error::Internal(format!(
            "logic kernel received a {} operand",
            other.kind()
        ))),
    }
}

fn kleene_and(lhs: Option<bool>, rhs: Option<bool>) -> Option<bool> {
    match (lhs, rhs) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn kleene_or(lhs: Option<bool>, rhs: Option<bool>) -> Option<bool> {
    match (lhs, rhs) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vex_expr::CompareOp;

    type Expr = ScalarExpr<u32>;

    fn batch(columns: Vec<(u32, Column)>) -> FxHashMap<u32, Column> {
        columns.into_iter().collect()
    }

    #[test]
    fn kleene_truth_tables() {
        assert_eq!(kleene_and(Some(false), None), Some(false));
        assert_eq!(kleene_and(None, Some(true)), None);
        assert_eq!(kleene_and(Some(true), Some(true)), Some(true));
        assert_eq!(kleene_or(None, Some(true)), Some(true));
        assert_eq!(kleene_or(Some(false), None), None);
        assert_eq!(kleene_or(Some(false), Some(false)), Some(false));
    }

    #[test]
    fn scalar_subtrees_fold_without_columns() {
        let expr = Expr::binary(
            Expr::literal(2i64),
            BinaryOp::Add,
            Expr::literal(3i64),
        );
        let out = Evaluator::evaluate(&expr, 4, &batch(vec![])).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out.value(3).unwrap(), Some(Value::Integer(5)));
    }

    #[test]
    fn structural_errors_win_over_missing_data() {
        // A double/decimal mix is rejected before evaluation even though
        // the batch is empty of rows.
        let expr = Expr::binary(
            Expr::literal(1.5f64),
            BinaryOp::Add,
            Expr::literal("1.5".parse::<vex_types::DecimalValue>().unwrap()),
        );
        let err = Evaluator::evaluate(&expr, 0, &batch(vec![])).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
    }

    #[test]
    fn comparison_with_null_literal_is_null() {
        let expr = Expr::compare(Expr::literal(1i64), CompareOp::Eq, Expr::null());
        let out = Evaluator::evaluate(&expr, 2, &batch(vec![])).unwrap();
        assert_eq!(out.kind(), Kind::Boolean);
        assert_eq!(out.value(0).unwrap(), None);
    }

    #[test]
    fn evaluate_scalar_binds_rows() {
        let expr = Expr::binary(Expr::column(7), BinaryOp::Multiply, Expr::literal(2i64));
        let mut row = FxHashMap::default();
        row.insert(7u32, Some(Value::Integer(21)));
        assert_eq!(
            Evaluator::evaluate_scalar(&expr, &row).unwrap(),
            Some(Value::Integer(42))
        );
        row.insert(7u32, None);
        assert_eq!(Evaluator::evaluate_scalar(&expr, &row).unwrap(), None);
    }

    #[test]
    fn collect_fields_walks_every_branch() {
        let expr = Expr::binary(
            Expr::compare(Expr::column(1), CompareOp::Lt, Expr::column(2)),
            BinaryOp::And,
            Expr::is_null(Expr::length(Expr::column(3))),
        );
        let mut acc = FxHashSet::default();
        Evaluator::collect_fields(&expr, &mut acc);
        assert_eq!(acc.len(), 3);
        assert!(acc.contains(&1) && acc.contains(&2) && acc.contains(&3));
    }
}
