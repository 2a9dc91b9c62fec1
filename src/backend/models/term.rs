//! Terms: concrete values or placeholders for values not yet computed.
//!
//! A body running on the trampoline never sees the real result of a recursive
//! call. It gets a `Term::Call` placeholder instead, and every operation that
//! touches a placeholder builds a `Term::Composite` node rather than running.
//! The driver collapses these nodes bottom-up once the frames they depend on
//! have concrete values.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::Value;
use crate::backend::grounded::{ExecError, GroundedOperation};

/// Identity of a call frame inside one trampoline context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub(crate) usize);

impl FrameId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operations that may be deferred inside a composite placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Equal,
    NotEqual,
    /// Variadic sequence concatenation
    Concat,
    /// `(sequence, position)` lookup
    Index,
}

impl Op {
    /// The grounded operation that computes this op on concrete values
    pub fn operation(self) -> &'static dyn GroundedOperation {
        use crate::backend::grounded::*;
        match self {
            Op::Add => &AddOp,
            Op::Sub => &SubOp,
            Op::Mul => &MulOp,
            Op::Div => &DivOp,
            Op::Less => &LessOp,
            Op::LessEq => &LessEqOp,
            Op::Greater => &GreaterOp,
            Op::GreaterEq => &GreaterEqOp,
            Op::Equal => &EqualOp,
            Op::NotEqual => &NotEqualOp,
            Op::Concat => &ConcatOp,
            Op::Index => &IndexOp,
        }
    }

    pub fn name(self) -> &'static str {
        self.operation().name()
    }
}

/// A deferred operation over terms
pub struct Node {
    pub op: Op,
    pub operands: SmallVec<[Term; 2]>,
}

// A body can fold thousands of placeholders into one chain; free it iteratively.
impl Drop for Node {
    fn drop(&mut self) {
        let mut orphans: Vec<Term> = self.operands.drain(..).collect();
        while let Some(term) = orphans.pop() {
            if let Term::Composite(node) = term {
                if let Some(mut node) = Arc::into_inner(node) {
                    orphans.extend(node.operands.drain(..));
                }
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("op", &self.op)
            .field("operands", &self.operands.len())
            .finish()
    }
}

/// Either a concrete value or a placeholder for one
#[derive(Debug, Clone)]
pub enum Term {
    /// Already known
    Value(Value),
    /// Stands in for the result of one call frame
    Call(FrameId),
    /// Stands in for an operation over other terms
    Composite(Arc<Node>),
}

impl Term {
    /// Apply `op` to `operands`.
    ///
    /// Runs immediately when every operand is concrete, so type errors and
    /// overflow surface at the point the body computes them. Otherwise records
    /// a composite placeholder.
    pub fn apply<I>(op: Op, operands: I) -> Result<Term, ExecError>
    where
        I: IntoIterator<Item = Term>,
    {
        let operands: SmallVec<[Term; 2]> = operands.into_iter().collect();
        if operands.iter().all(Term::is_concrete) {
            let values = operands
                .into_iter()
                .map(Term::into_value)
                .collect::<Result<SmallVec<[Value; 2]>, _>>()?;
            return op.operation().execute(&values).map(Term::Value);
        }
        Ok(Term::Composite(Arc::new(Node { op, operands })))
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, Term::Value(_))
    }

    pub fn is_pending(&self) -> bool {
        !self.is_concrete()
    }

    /// Borrow the concrete value, failing on a placeholder.
    ///
    /// Inspecting a placeholder means the body wants to branch on a result
    /// that is not known yet, which the trampoline cannot support.
    pub fn value(&self) -> Result<&Value, ExecError> {
        match self {
            Term::Value(v) => Ok(v),
            pending => Err(ExecError::UnsupportedRecursionShape(format!(
                "cannot inspect unresolved {} inside a trampolined body",
                pending.describe()
            ))),
        }
    }

    pub fn into_value(self) -> Result<Value, ExecError> {
        match self {
            Term::Value(v) => Ok(v),
            pending => Err(ExecError::UnsupportedRecursionShape(format!(
                "cannot use unresolved {} as a concrete value",
                pending.describe()
            ))),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ExecError> {
        let value = self.value()?;
        value.as_bool().ok_or_else(|| {
            ExecError::Runtime(format!("expected Bool, got {}", value.type_name()))
        })
    }

    pub fn as_long(&self) -> Result<i64, ExecError> {
        let value = self.value()?;
        value.as_long().ok_or_else(|| {
            ExecError::Runtime(format!("expected Number (integer), got {}", value.type_name()))
        })
    }

    pub fn as_list(&self) -> Result<&[Value], ExecError> {
        let value = self.value()?;
        value
            .as_list()
            .ok_or_else(|| ExecError::Runtime(format!("expected List, got {}", value.type_name())))
    }

    pub fn add(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::Add, [self, rhs.into()])
    }

    pub fn sub(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::Sub, [self, rhs.into()])
    }

    pub fn mul(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::Mul, [self, rhs.into()])
    }

    pub fn div(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::Div, [self, rhs.into()])
    }

    pub fn lt(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::Less, [self, rhs.into()])
    }

    pub fn le(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::LessEq, [self, rhs.into()])
    }

    pub fn gt(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::Greater, [self, rhs.into()])
    }

    pub fn ge(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::GreaterEq, [self, rhs.into()])
    }

    pub fn eq_to(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::Equal, [self, rhs.into()])
    }

    pub fn ne_to(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::NotEqual, [self, rhs.into()])
    }

    pub fn concat(self, rhs: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::Concat, [self, rhs.into()])
    }

    /// Concatenate any number of sequence terms in order
    pub fn concat_all<I, T>(parts: I) -> Result<Term, ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        Term::apply(Op::Concat, parts.into_iter().map(Into::into))
    }

    pub fn index(self, position: impl Into<Term>) -> Result<Term, ExecError> {
        Term::apply(Op::Index, [self, position.into()])
    }

    fn describe(&self) -> String {
        match self {
            Term::Value(v) => format!("value {}", v),
            Term::Call(id) => format!("call placeholder {}", id),
            Term::Composite(node) => format!("composite placeholder ({} ...)", node.op.name()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Value(v) => write!(f, "{}", v),
            Term::Call(id) => write!(f, "<call {}>", id),
            Term::Composite(node) => write!(f, "<{} of {}>", node.op.name(), node.operands.len()),
        }
    }
}

impl From<Value> for Term {
    fn from(v: Value) -> Self {
        Term::Value(v)
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Term::Value(Value::Long(n))
    }
}

impl From<i32> for Term {
    fn from(n: i32) -> Self {
        Term::Value(Value::Long(n as i64))
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Value(Value::Bool(b))
    }
}

impl From<f64> for Term {
    fn from(x: f64) -> Self {
        Term::Value(Value::Float(x))
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Value(Value::from(s))
    }
}

impl From<Vec<Value>> for Term {
    fn from(items: Vec<Value>) -> Self {
        Term::Value(Value::from(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_operands_compute_immediately() {
        let t = Term::from(6).mul(7).unwrap();
        assert!(matches!(t, Term::Value(Value::Long(42))));

        let joined = Term::concat_all([Value::list([1]), Value::list([2, 3])]).unwrap();
        assert_eq!(joined.into_value().unwrap(), Value::list([1, 2, 3]));
    }

    #[test]
    fn test_placeholder_operand_builds_composite() {
        let t = Term::Call(FrameId(3)).add(1).unwrap();
        match &t {
            Term::Composite(node) => {
                assert_eq!(node.op, Op::Add);
                assert_eq!(node.operands.len(), 2);
                assert!(matches!(node.operands[0], Term::Call(FrameId(3))));
            }
            other => panic!("Expected Composite, got {:?}", other),
        }
        assert!(t.is_pending());
    }

    #[test]
    fn test_concrete_type_error_surfaces_immediately() {
        let err = Term::from(true).add(1).unwrap_err();
        assert!(matches!(err, ExecError::Runtime(_)));
    }

    #[test]
    fn test_inspecting_placeholder_is_unsupported() {
        let pending = Term::Call(FrameId(0)).lt(2).unwrap();
        assert!(matches!(
            pending.as_bool(),
            Err(ExecError::UnsupportedRecursionShape(_))
        ));
        assert!(matches!(
            Term::Call(FrameId(1)).into_value(),
            Err(ExecError::UnsupportedRecursionShape(_))
        ));
    }

    #[test]
    fn test_long_chain_drops_on_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let mut acc = Term::Call(FrameId(0));
                for i in 0..200_000 {
                    acc = acc.add(i).unwrap();
                }
                assert!(acc.is_pending());
                drop(acc);
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_shared_subchain_survives_drop() {
        let shared = Term::Call(FrameId(1)).mul(2).unwrap();
        let left = shared.clone().add(1).unwrap();
        drop(left);
        match &shared {
            Term::Composite(node) => assert_eq!(node.operands.len(), 2),
            other => panic!("Expected Composite, got {:?}", other),
        }
    }
}
