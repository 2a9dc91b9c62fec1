//! Comparison operations:
//! - `LessOp` - Less than (<)
//! - `LessEqOp` - Less than or equal (<=)
//! - `GreaterOp` - Greater than (>)
//! - `GreaterEqOp` - Greater than or equal (>=)
//! - `EqualOp` - Equality (==)
//! - `NotEqualOp` - Inequality (!=)
//!
//! These build *values*. A comparison that decides a branch has to run on
//! concrete inputs inside the body instead.

use std::cmp::Ordering;

use super::{require_arity, ExecError, GroundedOperation, GroundedResult, Value};

enum Step<'v> {
    Pair(&'v Value, &'v Value),
    /// Decides between two lists whose shared prefix compared equal
    Lengths(usize, usize),
}

/// Order two values: numbers (mixed integer/float), strings, booleans and
/// lists (lexicographically).
///
/// Nested lists are walked with an explicit stack in left-to-right order, so
/// the first unequal pair decides.
pub fn compare_values(a: &Value, b: &Value) -> Result<Ordering, ExecError> {
    let mut pending = vec![Step::Pair(a, b)];

    while let Some(step) = pending.pop() {
        let ordering = match step {
            Step::Lengths(x, y) => x.cmp(&y),
            Step::Pair(Value::List(xs), Value::List(ys)) => {
                pending.push(Step::Lengths(xs.len(), ys.len()));
                pending.extend(
                    xs.iter()
                        .zip(ys.iter())
                        .rev()
                        .map(|(x, y)| Step::Pair(x, y)),
                );
                continue;
            }
            Step::Pair(x, y) => compare_scalars(x, y)?,
        };
        if ordering != Ordering::Equal {
            return Ok(ordering);
        }
    }
    Ok(Ordering::Equal)
}

fn compare_scalars(a: &Value, b: &Value) -> Result<Ordering, ExecError> {
    let incomparable = || {
        ExecError::Runtime(format!(
            "Cannot compare {} with {}",
            a.type_name(),
            b.type_name()
        ))
    };

    match (a, b) {
        (Value::Long(x), Value::Long(y)) => Ok(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y).ok_or_else(incomparable),
        (Value::Long(x), Value::Float(y)) => (*x as f64).partial_cmp(y).ok_or_else(incomparable),
        (Value::Float(x), Value::Long(y)) => x.partial_cmp(&(*y as f64)).ok_or_else(incomparable),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        _ => Err(incomparable()),
    }
}

fn ordered(name: &str, args: &[Value], accept: fn(Ordering) -> bool) -> GroundedResult {
    require_arity(name, args, 2)?;
    compare_values(&args[0], &args[1]).map(|ord| Value::Bool(accept(ord)))
}

/// Structural equality, with integers and floats compared numerically
fn values_equal(a: &Value, b: &Value) -> bool {
    let mut pending = vec![(a, b)];
    while let Some(pair) = pending.pop() {
        let same = match pair {
            (Value::Long(x), Value::Float(y)) | (Value::Float(y), Value::Long(x)) => {
                *x as f64 == *y
            }
            (Value::List(xs), Value::List(ys)) => {
                if xs.len() != ys.len() {
                    return false;
                }
                pending.extend(xs.iter().zip(ys.iter()));
                true
            }
            (x, y) => x == y,
        };
        if !same {
            return false;
        }
    }
    true
}

/// Less than: (< a b)
pub struct LessOp;

impl GroundedOperation for LessOp {
    fn name(&self) -> &str {
        "<"
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        ordered("<", args, Ordering::is_lt)
    }
}

/// Less than or equal: (<= a b)
pub struct LessEqOp;

impl GroundedOperation for LessEqOp {
    fn name(&self) -> &str {
        "<="
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        ordered("<=", args, Ordering::is_le)
    }
}

/// Greater than: (> a b)
pub struct GreaterOp;

impl GroundedOperation for GreaterOp {
    fn name(&self) -> &str {
        ">"
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        ordered(">", args, Ordering::is_gt)
    }
}

/// Greater than or equal: (>= a b)
pub struct GreaterEqOp;

impl GroundedOperation for GreaterEqOp {
    fn name(&self) -> &str {
        ">="
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        ordered(">=", args, Ordering::is_ge)
    }
}

/// Equality: (== a b)
pub struct EqualOp;

impl GroundedOperation for EqualOp {
    fn name(&self) -> &str {
        "=="
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        require_arity("==", args, 2)?;
        Ok(Value::Bool(values_equal(&args[0], &args[1])))
    }
}

/// Inequality: (!= a b)
pub struct NotEqualOp;

impl GroundedOperation for NotEqualOp {
    fn name(&self) -> &str {
        "!="
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        require_arity("!=", args, 2)?;
        Ok(Value::Bool(!values_equal(&args[0], &args[1])))
    }
}
