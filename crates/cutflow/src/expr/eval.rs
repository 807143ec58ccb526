//! Vectorized evaluation of parsed expressions over a dataset.
//!
//! Every operation is element-wise over whole columns; scalar literals and
//! bound parameters broadcast. A verdict for row `i` never depends on any
//! other row.

use std::collections::HashMap;

use crate::dataset::Dataset;
use crate::error::{CutflowError, Result};

use super::parser::{ArithOp, CmpOp, Expr, Func};

/// An intermediate evaluation value.
#[derive(Debug, Clone)]
enum Value {
    /// A scalar that broadcasts against columns.
    Scalar(f64),
    Numeric(Vec<f64>),
    Boolean(Vec<bool>),
}

/// Evaluate a boolean expression to one verdict per row.
pub fn evaluate_predicate(
    expr: &Expr,
    dataset: &Dataset,
    params: &HashMap<String, f64>,
) -> Result<Vec<bool>> {
    let evaluator = Evaluator {
        dataset,
        params,
        rows: dataset.row_count(),
    };
    match evaluator.eval(expr)? {
        Value::Boolean(v) => Ok(v),
        _ => unreachable!("predicate expressions type-check as boolean"),
    }
}

/// Evaluate a numeric expression to one value per row.
pub fn evaluate_numeric(
    expr: &Expr,
    dataset: &Dataset,
    params: &HashMap<String, f64>,
) -> Result<Vec<f64>> {
    let evaluator = Evaluator {
        dataset,
        params,
        rows: dataset.row_count(),
    };
    match evaluator.eval(expr)? {
        Value::Scalar(x) => Ok(vec![x; dataset.row_count()]),
        Value::Numeric(v) => Ok(v),
        Value::Boolean(_) => unreachable!("numeric expressions type-check as numeric"),
    }
}

struct Evaluator<'a> {
    dataset: &'a Dataset,
    params: &'a HashMap<String, f64>,
    rows: usize,
}

impl<'a> Evaluator<'a> {
    fn eval(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Number(x) => Ok(Value::Scalar(*x)),
            Expr::Column(name) => Ok(Value::Numeric(self.dataset.numeric(name)?)),
            Expr::Param(name) => {
                let value = self.params.get(name).ok_or_else(|| {
                    CutflowError::Configuration(format!("unbound parameter '@{name}'"))
                })?;
                Ok(Value::Scalar(*value))
            }
            Expr::Neg(inner) => Ok(match self.eval(inner)? {
                Value::Scalar(x) => Value::Scalar(-x),
                Value::Numeric(v) => Value::Numeric(v.into_iter().map(|x| -x).collect()),
                Value::Boolean(_) => unreachable!("negation type-checks as numeric"),
            }),
            Expr::Arith { op, left, right } => {
                let f = arith_fn(*op);
                Ok(self.zip_numeric(self.eval(left)?, self.eval(right)?, f))
            }
            Expr::Compare { op, left, right } => {
                let f = cmp_fn(*op);
                Ok(self.zip_compare(self.eval(left)?, self.eval(right)?, f))
            }
            Expr::Not(inner) => {
                let Value::Boolean(v) = self.eval(inner)? else {
                    unreachable!("'~' type-checks as boolean");
                };
                Ok(Value::Boolean(v.into_iter().map(|b| !b).collect()))
            }
            Expr::And(left, right) => self.combine(left, right, |a, b| a && b),
            Expr::Or(left, right) => self.combine(left, right, |a, b| a || b),
            Expr::Call { func, arg } => {
                let f = func_fn(*func);
                Ok(match self.eval(arg)? {
                    Value::Scalar(x) => Value::Scalar(f(x)),
                    Value::Numeric(v) => Value::Numeric(v.into_iter().map(f).collect()),
                    Value::Boolean(_) => unreachable!("function arguments type-check as numeric"),
                })
            }
        }
    }

    fn combine(&self, left: &Expr, right: &Expr, f: fn(bool, bool) -> bool) -> Result<Value> {
        let (Value::Boolean(l), Value::Boolean(r)) = (self.eval(left)?, self.eval(right)?) else {
            unreachable!("'&'/'|' type-check as boolean");
        };
        Ok(Value::Boolean(
            l.into_iter().zip(r).map(|(a, b)| f(a, b)).collect(),
        ))
    }

    fn zip_numeric(&self, left: Value, right: Value, f: fn(f64, f64) -> f64) -> Value {
        match (left, right) {
            (Value::Scalar(l), Value::Scalar(r)) => Value::Scalar(f(l, r)),
            (Value::Scalar(l), Value::Numeric(r)) => {
                Value::Numeric(r.into_iter().map(|x| f(l, x)).collect())
            }
            (Value::Numeric(l), Value::Scalar(r)) => {
                Value::Numeric(l.into_iter().map(|x| f(x, r)).collect())
            }
            (Value::Numeric(l), Value::Numeric(r)) => {
                Value::Numeric(l.into_iter().zip(r).map(|(a, b)| f(a, b)).collect())
            }
            _ => unreachable!("arithmetic type-checks as numeric"),
        }
    }

    fn zip_compare(&self, left: Value, right: Value, f: fn(f64, f64) -> bool) -> Value {
        match (left, right) {
            (Value::Scalar(l), Value::Scalar(r)) => Value::Boolean(vec![f(l, r); self.rows]),
            (Value::Scalar(l), Value::Numeric(r)) => {
                Value::Boolean(r.into_iter().map(|x| f(l, x)).collect())
            }
            (Value::Numeric(l), Value::Scalar(r)) => {
                Value::Boolean(l.into_iter().map(|x| f(x, r)).collect())
            }
            (Value::Numeric(l), Value::Numeric(r)) => {
                Value::Boolean(l.into_iter().zip(r).map(|(a, b)| f(a, b)).collect())
            }
            _ => unreachable!("comparisons type-check as numeric"),
        }
    }
}

fn arith_fn(op: ArithOp) -> fn(f64, f64) -> f64 {
    match op {
        ArithOp::Add => |a, b| a + b,
        ArithOp::Sub => |a, b| a - b,
        ArithOp::Mul => |a, b| a * b,
        ArithOp::Div => |a, b| a / b,
        ArithOp::Pow => f64::powf,
    }
}

fn cmp_fn(op: CmpOp) -> fn(f64, f64) -> bool {
    // All comparisons involving NaN are false, matching IEEE semantics and
    // the "missing values yield false" contract.
    match op {
        CmpOp::Lt => |a, b| a < b,
        CmpOp::Le => |a, b| a <= b,
        CmpOp::Gt => |a, b| a > b,
        CmpOp::Ge => |a, b| a >= b,
        CmpOp::Eq => |a, b| a == b,
        CmpOp::Ne => |a, b| a != b,
    }
}

fn func_fn(func: Func) -> fn(f64) -> f64 {
    match func {
        Func::Sqrt => f64::sqrt,
        Func::Exp => f64::exp,
        Func::Log => f64::ln,
        Func::Abs => f64::abs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::expr::parser::{parse_numeric, parse_predicate};

    fn dataset() -> Dataset {
        let mut ds = Dataset::with_rows(3);
        ds.insert("cs1", Column::Float(vec![-5.0, 0.0, 150.0]))
            .unwrap();
        ds.insert("x", Column::Float(vec![3.0, 0.0, -4.0])).unwrap();
        ds.insert("y", Column::Float(vec![4.0, 0.0, 3.0])).unwrap();
        ds
    }

    #[test]
    fn comparison_matches_direct_scalar_test() {
        let ds = dataset();
        let expr = parse_predicate("0 < cs1").unwrap();
        let verdicts = evaluate_predicate(&expr, &ds, &HashMap::new()).unwrap();
        let direct: Vec<bool> = ds.numeric("cs1").unwrap().iter().map(|&v| v > 0.0).collect();
        assert_eq!(verdicts, direct);
        assert_eq!(verdicts, vec![false, false, true]);
    }

    #[test]
    fn arithmetic_and_functions_vectorize() {
        let ds = dataset();
        let expr = parse_numeric("sqrt(x*x + y*y)").unwrap();
        let r = evaluate_numeric(&expr, &ds, &HashMap::new()).unwrap();
        assert_eq!(r, vec![5.0, 0.0, 5.0]);
    }

    #[test]
    fn nan_comparisons_are_false() {
        let mut ds = Dataset::with_rows(2);
        ds.insert("v", Column::Float(vec![f64::NAN, 1.0])).unwrap();
        let expr = parse_predicate("v < 10 | v > -10").unwrap();
        let verdicts = evaluate_predicate(&expr, &ds, &HashMap::new()).unwrap();
        assert_eq!(verdicts, vec![false, true]);
    }

    #[test]
    fn parameters_broadcast() {
        let ds = dataset();
        let expr = parse_predicate("cs1 < @limit").unwrap();
        let params = HashMap::from([("limit".to_string(), 100.0)]);
        let verdicts = evaluate_predicate(&expr, &ds, &params).unwrap();
        assert_eq!(verdicts, vec![true, true, false]);
    }

    #[test]
    fn unbound_parameter_is_an_error() {
        let ds = dataset();
        let expr = parse_predicate("cs1 < @limit").unwrap();
        let err = evaluate_predicate(&expr, &ds, &HashMap::new()).unwrap_err();
        assert!(matches!(err, CutflowError::Configuration(_)));
    }

    #[test]
    fn missing_column_is_an_error() {
        let ds = dataset();
        let expr = parse_predicate("0 < s2").unwrap();
        let err = evaluate_predicate(&expr, &ds, &HashMap::new()).unwrap_err();
        assert!(matches!(err, CutflowError::MissingColumn { .. }));
    }

    #[test]
    fn scalar_only_predicate_broadcasts_to_row_count() {
        let ds = dataset();
        let expr = parse_predicate("1 < 2").unwrap();
        let verdicts = evaluate_predicate(&expr, &ds, &HashMap::new()).unwrap();
        assert_eq!(verdicts, vec![true; 3]);
    }
}
