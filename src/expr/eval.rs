use super::parser::{BinaryOp, Expr, UnaryOp};
use super::value::{EvalContext, Value};
use crate::error::EvalError;
use ahash::AHashMap;

/// Parses and evaluates an expression against a context in one call.
///
/// Pure function of `(text, context)`. Callers evaluating the same text
/// many times should parse once with [`Expr::parse`] and reuse the AST, or
/// use a [`CachingEvaluator`].
pub fn evaluate(text: &str, ctx: &EvalContext) -> Result<Value, EvalError> {
    let expr = Expr::parse(text)?;
    eval_expr(&expr, ctx)
}

/// Evaluates an already-parsed AST against a context.
pub fn eval_expr(expr: &Expr, ctx: &EvalContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Scalar(*n)),
        Expr::Var(name) => ctx
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownSymbol(name.clone())),
        Expr::Unary(op, operand) => eval_unary(*op, eval_expr(operand, ctx)?),
        // Both operands are always evaluated: a scalar on one side must
        // still broadcast over a series on the other, and errors on the
        // right surface regardless of the left value.
        Expr::Binary(op, l, r) => {
            let left = eval_expr(l, ctx)?;
            let right = eval_expr(r, ctx)?;
            match op {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                    eval_arithmetic(*op, left, right)
                }
                BinaryOp::And | BinaryOp::Or => eval_logical(*op, left, right),
                _ => eval_comparison(*op, left, right),
            }
        }
        Expr::Call(name, args) => eval_call(name, args, ctx),
    }
}

/// Parses each distinct expression text once and reuses the AST on
/// subsequent evaluations of the same text.
#[derive(Debug, Default)]
pub struct CachingEvaluator {
    cache: AHashMap<String, Expr>,
}

impl CachingEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eval(&mut self, text: &str, ctx: &EvalContext) -> Result<Value, EvalError> {
        if !self.cache.contains_key(text) {
            let expr = Expr::parse(text)?;
            self.cache.insert(text.to_string(), expr);
        }
        eval_expr(&self.cache[text], ctx)
    }
}

fn eval_unary(op: UnaryOp, operand: Value) -> Result<Value, EvalError> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Scalar(n)) => Ok(Value::Scalar(-n)),
        (UnaryOp::Neg, Value::Series(s)) => Ok(Value::Series(s.iter().map(|n| -n).collect())),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Not, Value::BoolSeries(s)) => {
            Ok(Value::BoolSeries(s.iter().map(|b| !b).collect()))
        }
        (UnaryOp::Neg, v) => Err(type_mismatch("-", "Scalar or Series", &v)),
        (UnaryOp::Not, v) => Err(type_mismatch("not", "Bool or BoolSeries", &v)),
    }
}

fn eval_arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let symbol = op.symbol();
    let f: fn(f64, f64) -> f64 = match op {
        BinaryOp::Add => |a, b| a + b,
        BinaryOp::Sub => |a, b| a - b,
        BinaryOp::Mul => |a, b| a * b,
        BinaryOp::Div => |a, b| a / b,
        _ => unreachable!("eval_arithmetic called with non-arithmetic operator"),
    };
    if op == BinaryOp::Div {
        let divides_by_zero = match &right {
            Value::Scalar(n) => *n == 0.0,
            Value::Series(s) => s.iter().any(|n| *n == 0.0),
            _ => false,
        };
        if divides_by_zero {
            return Err(EvalError::DivisionByZero(symbol));
        }
    }
    match (left, right) {
        (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(a, b))),
        (Value::Scalar(a), Value::Series(s)) => {
            Ok(Value::Series(s.iter().map(|b| f(a, *b)).collect()))
        }
        (Value::Series(s), Value::Scalar(b)) => {
            Ok(Value::Series(s.iter().map(|a| f(*a, b)).collect()))
        }
        (Value::Series(a), Value::Series(b)) => {
            check_shapes(symbol, a.len(), b.len())?;
            Ok(Value::Series(
                a.iter().zip(&b).map(|(x, y)| f(*x, *y)).collect(),
            ))
        }
        (l, r) => Err(binary_type_mismatch(symbol, "numeric operands", &l, &r)),
    }
}

fn eval_comparison(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let symbol = op.symbol();
    let f: fn(f64, f64) -> bool = match op {
        BinaryOp::Gt => |a, b| a > b,
        BinaryOp::Ge => |a, b| a >= b,
        BinaryOp::Lt => |a, b| a < b,
        BinaryOp::Le => |a, b| a <= b,
        BinaryOp::Eq => |a, b| a == b,
        BinaryOp::Ne => |a, b| a != b,
        _ => unreachable!("eval_comparison called with non-comparison operator"),
    };
    match (left, right) {
        (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Bool(f(a, b))),
        (Value::Scalar(a), Value::Series(s)) => {
            Ok(Value::BoolSeries(s.iter().map(|b| f(a, *b)).collect()))
        }
        (Value::Series(s), Value::Scalar(b)) => {
            Ok(Value::BoolSeries(s.iter().map(|a| f(*a, b)).collect()))
        }
        (Value::Series(a), Value::Series(b)) => {
            check_shapes(symbol, a.len(), b.len())?;
            Ok(Value::BoolSeries(
                a.iter().zip(&b).map(|(x, y)| f(*x, *y)).collect(),
            ))
        }
        // Equality is also defined over boolean operands.
        (Value::Bool(a), Value::Bool(b)) if matches!(op, BinaryOp::Eq | BinaryOp::Ne) => {
            Ok(Value::Bool(f(a as u8 as f64, b as u8 as f64)))
        }
        (l, r) => Err(binary_type_mismatch(symbol, "numeric operands", &l, &r)),
    }
}

fn eval_logical(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let symbol = op.symbol();
    let f: fn(bool, bool) -> bool = match op {
        BinaryOp::And => |a, b| a && b,
        BinaryOp::Or => |a, b| a || b,
        _ => unreachable!("eval_logical called with non-logical operator"),
    };
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(f(a, b))),
        (Value::Bool(a), Value::BoolSeries(s)) => {
            Ok(Value::BoolSeries(s.iter().map(|b| f(a, *b)).collect()))
        }
        (Value::BoolSeries(s), Value::Bool(b)) => {
            Ok(Value::BoolSeries(s.iter().map(|a| f(*a, b)).collect()))
        }
        (Value::BoolSeries(a), Value::BoolSeries(b)) => {
            check_shapes(symbol, a.len(), b.len())?;
            Ok(Value::BoolSeries(
                a.iter().zip(&b).map(|(x, y)| f(*x, *y)).collect(),
            ))
        }
        (l, r) => Err(binary_type_mismatch(symbol, "boolean operands", &l, &r)),
    }
}

/// The whitelisted function set. Any other callee name fails with
/// `UnknownSymbol` before anything is executed.
fn eval_call(name: &str, args: &[Expr], ctx: &EvalContext) -> Result<Value, EvalError> {
    match name {
        "rate" => {
            let series = eval_series_arg(name, args, ctx)?;
            Ok(Value::Scalar(rate(&series)))
        }
        "abs" => match eval_single_arg(name, args, ctx)? {
            Value::Scalar(n) => Ok(Value::Scalar(n.abs())),
            Value::Series(s) => Ok(Value::Series(s.iter().map(|n| n.abs()).collect())),
            v => Err(type_mismatch(name, "Scalar or Series", &v)),
        },
        "min" => {
            let series = eval_series_arg(name, args, ctx)?;
            let value = series.iter().copied().fold(f64::INFINITY, f64::min);
            Ok(Value::Scalar(if series.is_empty() { 0.0 } else { value }))
        }
        "max" => {
            let series = eval_series_arg(name, args, ctx)?;
            let value = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Ok(Value::Scalar(if series.is_empty() { 0.0 } else { value }))
        }
        "mean" => {
            let series = eval_series_arg(name, args, ctx)?;
            if series.is_empty() {
                Ok(Value::Scalar(0.0))
            } else {
                Ok(Value::Scalar(series.iter().sum::<f64>() / series.len() as f64))
            }
        }
        _ => Err(EvalError::UnknownSymbol(name.to_string())),
    }
}

/// Endpoint slope of an ordered sequence: `(last - first) / (n - 1)`.
/// Defined as 0 for sequences shorter than two points.
pub fn rate(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    (series[series.len() - 1] - series[0]) / (series.len() - 1) as f64
}

fn eval_single_arg(name: &str, args: &[Expr], ctx: &EvalContext) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::TypeMismatch {
            operation: name.to_string(),
            expected: "exactly one argument".to_string(),
            found: format!("{} arguments", args.len()),
        });
    }
    eval_expr(&args[0], ctx)
}

fn eval_series_arg(name: &str, args: &[Expr], ctx: &EvalContext) -> Result<Vec<f64>, EvalError> {
    match eval_single_arg(name, args, ctx)? {
        Value::Series(s) => Ok(s),
        // A scalar is treated as a length-1 sequence.
        Value::Scalar(n) => Ok(vec![n]),
        v => Err(type_mismatch(name, "Series", &v)),
    }
}

fn check_shapes(operation: &'static str, left_len: usize, right_len: usize) -> Result<(), EvalError> {
    if left_len != right_len {
        Err(EvalError::ShapeMismatch {
            operation,
            left_len,
            right_len,
        })
    } else {
        Ok(())
    }
}

fn type_mismatch(operation: &str, expected: &str, found: &Value) -> EvalError {
    EvalError::TypeMismatch {
        operation: operation.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn binary_type_mismatch(operation: &str, expected: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeMismatch {
        operation: operation.to_string(),
        expected: expected.to_string(),
        found: format!("{} and {}", left.type_name(), right.type_name()),
    }
}
