//! Trait for grounded operations.

use super::{GroundedResult, Value};

/// A built-in operation over concrete values.
///
/// # Implementing a Grounded Operation
///
/// ```ignore
/// struct AddOp;
///
/// impl GroundedOperation for AddOp {
///     fn name(&self) -> &str { "+" }
///
///     fn execute(&self, args: &[Value]) -> GroundedResult {
///         require_arity("+", args, 2)?;
///         match (&args[0], &args[1]) {
///             (Value::Long(x), Value::Long(y)) => Ok(Value::Long(x + y)),
///             _ => Err(ExecError::Runtime("expected numbers".to_string())),
///         }
///     }
/// }
/// ```
pub trait GroundedOperation: Send + Sync {
    /// The name of this operation (e.g., "+", "concat")
    fn name(&self) -> &str;

    /// Execute the operation on fully concrete arguments.
    ///
    /// # Returns
    /// * `Ok(value)` - The computed value
    /// * `Err(...)` - Type mismatch, arity error, overflow, ...
    fn execute(&self, args: &[Value]) -> GroundedResult;
}
