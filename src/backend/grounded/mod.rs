//! Grounded operations over concrete values.
//!
//! Every operation a trampolined body may defer (`+`, `*`, `<`, `concat`,
//! `index`, ...) is a small object implementing `GroundedOperation`. The same
//! object runs in two places:
//!
//! - immediately, when a body combines concrete values;
//! - later, when the driver collapses a composite placeholder whose operands
//!   have all resolved.
//!
//! Keeping one implementation for both paths means a deferred expression can
//! never compute something different from its eager twin.

mod arithmetic;
mod comparison;
mod sequence;
#[cfg(test)]
mod tests;
mod traits;

use std::fmt;

use super::models::Value;

pub use arithmetic::{AddOp, DivOp, MulOp, SubOp};
pub use comparison::{
    compare_values, EqualOp, GreaterEqOp, GreaterOp, LessEqOp, LessOp, NotEqualOp,
};
pub use sequence::{ConcatOp, IndexOp};
pub use traits::GroundedOperation;

/// Result type for grounded operations
pub type GroundedResult = Result<Value, ExecError>;

/// Errors raised while running a trampolined function
#[derive(Debug, Clone, PartialEq)]
pub enum ExecError {
    /// A recursive call received an unresolved argument, or a body tried to
    /// branch on a result that is not known yet
    UnsupportedRecursionShape(String),

    /// Invoked or called a function that is not registered (or only declared)
    UnknownFunction(String),

    /// Runtime error during execution (type mismatches, body-raised errors)
    Runtime(String),

    /// Arithmetic error (division by zero, overflow)
    Arithmetic(String),

    /// Incorrect argument arity or out-of-range position
    IncorrectArgument(String),

    /// The work stack drained while the top-level frame still waited on itself
    RecursionCycle(String),

    /// The context created more frames than the configured limit
    FrameLimitExceeded(usize),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::UnsupportedRecursionShape(msg) => {
                write!(f, "Unsupported recursion shape: {}", msg)
            }
            ExecError::UnknownFunction(name) => write!(f, "Unknown function: {}", name),
            ExecError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            ExecError::Arithmetic(msg) => write!(f, "Arithmetic error: {}", msg),
            ExecError::IncorrectArgument(msg) => write!(f, "Incorrect argument: {}", msg),
            ExecError::RecursionCycle(msg) => write!(f, "Recursion cycle: {}", msg),
            ExecError::FrameLimitExceeded(limit) => {
                write!(f, "Frame limit exceeded: more than {} frames", limit)
            }
        }
    }
}

impl std::error::Error for ExecError {}

/// Check arity for an operation, producing the standard error message
pub(crate) fn require_arity(name: &str, args: &[Value], expected: usize) -> Result<(), ExecError> {
    if args.len() != expected {
        return Err(ExecError::IncorrectArgument(format!(
            "{} requires {} arguments, got {}",
            name,
            expected,
            args.len()
        )));
    }
    Ok(())
}

/// Pick the offending operand for a type error message
pub(crate) fn non_number<'a>(a: &'a Value, b: &'a Value) -> &'a Value {
    if a.is_number() {
        b
    } else {
        a
    }
}
