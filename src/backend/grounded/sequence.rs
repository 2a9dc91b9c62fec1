//! Sequence operations:
//! - `ConcatOp` - Concatenation of lists or strings (variadic)
//! - `IndexOp` - Positional lookup in a list or string

use super::{require_arity, ExecError, GroundedOperation, GroundedResult, Value};

/// Concatenation: (concat a b ...)
///
/// All operands must be lists, or all must be strings. `Nil` counts as the
/// empty list. Zero operands yield the empty list.
pub struct ConcatOp;

impl GroundedOperation for ConcatOp {
    fn name(&self) -> &str {
        "concat"
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        if args.iter().all(|a| matches!(a, Value::String(_))) && !args.is_empty() {
            let mut joined = String::new();
            for arg in args {
                if let Value::String(s) = arg {
                    joined.push_str(s);
                }
            }
            return Ok(Value::String(joined));
        }

        let mut items = Vec::new();
        for arg in args {
            match arg {
                Value::List(part) => items.extend(part.iter().cloned()),
                Value::Nil => {}
                other => {
                    return Err(ExecError::Runtime(format!(
                        "Cannot perform 'concat': expected List, got {}",
                        other.type_name()
                    )))
                }
            }
        }
        Ok(Value::from(items))
    }
}

/// Indexing: (index sequence position)
pub struct IndexOp;

impl GroundedOperation for IndexOp {
    fn name(&self) -> &str {
        "index"
    }

    fn execute(&self, args: &[Value]) -> GroundedResult {
        require_arity("index", args, 2)?;

        let position = match &args[1] {
            Value::Long(n) => *n,
            other => {
                return Err(ExecError::Runtime(format!(
                    "Cannot perform 'index': expected Number (integer) position, got {}",
                    other.type_name()
                )))
            }
        };
        let out_of_range = |len: usize| {
            ExecError::IncorrectArgument(format!(
                "index {} out of range for length {}",
                position, len
            ))
        };

        match &args[0] {
            Value::List(items) => usize::try_from(position)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or_else(|| out_of_range(items.len())),
            Value::String(s) => usize::try_from(position)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::String(c.to_string()))
                .ok_or_else(|| out_of_range(s.chars().count())),
            other => Err(ExecError::Runtime(format!(
                "Cannot perform 'index': expected List or String, got {}",
                other.type_name()
            ))),
        }
    }
}
