//! Trampoline Types
//!
//! Call frames and the bookkeeping the driver keeps per frame.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::backend::models::{FrameId, Term, Value};
use crate::backend::registry::FnId;

/// Concrete argument tuple of one call
pub type Args = SmallVec<[Value; 2]>;

/// Identity of a call for memoization: function plus equal arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallKey {
    pub func: FnId,
    pub args: Args,
}

/// Lifecycle of a call frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Scheduled on the work stack, body not run yet
    Queued,
    /// Body is executing
    Running,
    /// Body returned; the result may still hold placeholders
    Done,
}

/// One pending or completed invocation
#[derive(Debug)]
pub struct Frame {
    /// Function and arguments (shared with the memo table)
    pub key: Arc<CallKey>,
    pub state: FrameState,
    /// Result template returned by the body. Dropped once collapsed into `value`.
    pub result: Option<Term>,
    /// Concrete value; set exactly once
    pub value: Option<Value>,
    /// Number of distinct unresolved call placeholders inside `result`
    pub waiting: usize,
    /// Frames whose result templates wait on this frame's value
    pub dependents: SmallVec<[FrameId; 1]>,
}

impl Frame {
    pub(crate) fn new(key: Arc<CallKey>) -> Self {
        Frame {
            key,
            state: FrameState::Queued,
            result: None,
            value: None,
            waiting: 0,
            dependents: SmallVec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }
}

/// Counters collected over one top-level invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvokeStats {
    /// Frames created (including the top-level frame)
    pub frames_created: usize,
    /// Bodies executed by the driver
    pub frames_executed: usize,
    /// Intercepted calls answered by an existing frame
    pub memo_hits: usize,
    /// Deepest the work stack got
    pub max_work_stack: usize,
    /// Frames whose result collapsed to a concrete value
    pub resolutions: usize,
    /// Distinct functions that took part
    pub participants: usize,
}
