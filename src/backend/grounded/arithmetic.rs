//! Arithmetic operations:
//! - `AddOp` - Addition (+)
//! - `SubOp` - Subtraction (-)
//! - `MulOp` - Multiplication (*)
//! - `DivOp` - Division (/)

use super::{non_number, require_arity, ExecError, GroundedOperation, GroundedResult, Value};

/// Shared numeric dispatch: checked integer math, float math for mixed operands
fn numeric(
    name: &str,
    args: &[Value],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> GroundedResult {
    require_arity(name, args, 2)?;

    match (&args[0], &args[1]) {
        (Value::Long(x), Value::Long(y)) => int_op(*x, *y).map(Value::Long).ok_or_else(|| {
            ExecError::Arithmetic(format!("Integer overflow: {} {} {}", x, name, y))
        }),
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(float_op(*x, *y))),
        (Value::Long(x), Value::Float(y)) => Ok(Value::Float(float_op(*x as f64, *y))),
        (Value::Float(x), Value::Long(y)) => Ok(Value::Float(float_op(*x, *y as f64))),
        (a, b) => Err(ExecError::Runtime(format!(
            "Cannot perform '{}': expected Number (integer), got {}",
            name,
            non_number(a, b).type_name()
        ))),
    }
}

/// Addition operation: (+ a b)
pub struct AddOp;

impl GroundedOperation for AddOp {
    fn name(&self) -> &str {
        "+"
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        numeric("+", args, i64::checked_add, |x, y| x + y)
    }
}

/// Subtraction operation: (- a b)
pub struct SubOp;

impl GroundedOperation for SubOp {
    fn name(&self) -> &str {
        "-"
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        numeric("-", args, i64::checked_sub, |x, y| x - y)
    }
}

/// Multiplication operation: (* a b)
pub struct MulOp;

impl GroundedOperation for MulOp {
    fn name(&self) -> &str {
        "*"
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        numeric("*", args, i64::checked_mul, |x, y| x * y)
    }
}

/// Division operation: (/ a b)
///
/// Integer operands use truncating division.
pub struct DivOp;

impl GroundedOperation for DivOp {
    fn name(&self) -> &str {
        "/"
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        require_arity("/", args, 2)?;

        let divisor_is_zero = match &args[1] {
            Value::Long(0) => true,
            Value::Float(y) => *y == 0.0,
            _ => false,
        };
        if divisor_is_zero {
            return Err(ExecError::Arithmetic("Division by zero".to_string()));
        }

        numeric("/", args, i64::checked_div, |x, y| x / y)
    }
}
