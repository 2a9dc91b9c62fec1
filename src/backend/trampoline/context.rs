//! Trampoline context and call interception.
//!
//! A `Context` lives for exactly one top-level invocation. Bodies never see it
//! directly: they get a `CallScope`, whose `call` registers a frame in the
//! owning context and hands back a placeholder instead of running the callee.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::trace;

use super::types::{Args, CallKey, Frame, InvokeStats};
use crate::backend::grounded::ExecError;
use crate::backend::hash_utils::{FastHashMap, FastHashSet};
use crate::backend::models::{FrameId, Term};
use crate::backend::registry::{FnId, Trampoline};
use crate::config::TrampolineConfig;

/// Outcome of registering a call
#[derive(Debug)]
pub(crate) enum Interned {
    /// A new frame was created; it still has to be scheduled
    Fresh(FrameId),
    /// An equal call already exists; this is its value or placeholder
    Known(Term),
}

/// Shared state for one top-level call chain
pub(crate) struct Context {
    pub(crate) frames: Vec<Frame>,
    pub(crate) work_stack: Vec<FrameId>,
    memo: FastHashMap<Arc<CallKey>, FrameId>,
    members: FastHashSet<FnId>,
    pub(crate) stats: InvokeStats,
    memoize: bool,
    max_frames: usize,
}

impl Context {
    pub(crate) fn new(config: &TrampolineConfig) -> Self {
        Context {
            frames: Vec::new(),
            work_stack: Vec::new(),
            memo: FastHashMap::default(),
            members: FastHashSet::default(),
            stats: InvokeStats::default(),
            memoize: config.memoize,
            max_frames: config.max_frames,
        }
    }

    pub(crate) fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.index()]
    }

    pub(crate) fn frame_mut(&mut self, id: FrameId) -> &mut Frame {
        &mut self.frames[id.index()]
    }

    /// Find or create the frame for `key`
    pub(crate) fn intern(&mut self, key: CallKey) -> Result<Interned, ExecError> {
        if self.memoize {
            if let Some(&existing) = self.memo.get(&key) {
                self.stats.memo_hits += 1;
                let frame = self.frame(existing);
                trace!(target: "iterec::backend::trampoline::context", frame = %existing, resolved = frame.is_resolved(), "memo hit");
                let term = match &frame.value {
                    Some(value) => Term::Value(value.clone()),
                    None => Term::Call(existing),
                };
                return Ok(Interned::Known(term));
            }
        }

        if self.max_frames > 0 && self.frames.len() >= self.max_frames {
            return Err(ExecError::FrameLimitExceeded(self.max_frames));
        }

        let id = FrameId(self.frames.len());
        let key = Arc::new(key);
        if self.members.insert(key.func) {
            self.stats.participants = self.members.len();
        }
        if self.memoize {
            self.memo.insert(Arc::clone(&key), id);
        }
        self.frames.push(Frame::new(key));
        self.stats.frames_created += 1;
        Ok(Interned::Fresh(id))
    }
}

/// Convert call arguments, rejecting any that are still placeholders
pub(crate) fn concrete_args<I, T>(callee: &str, args: I) -> Result<Args, ExecError>
where
    I: IntoIterator<Item = T>,
    T: Into<Term>,
{
    args.into_iter()
        .enumerate()
        .map(|(position, arg)| match arg.into() {
            Term::Value(value) => Ok(value),
            pending => Err(ExecError::UnsupportedRecursionShape(format!(
                "argument {} of call to '{}' is unresolved ({}); arguments must be concrete when the call is made",
                position, callee, pending
            ))),
        })
        .collect()
}

/// Handle through which a running body makes recursive calls
pub struct CallScope<'a> {
    trampoline: &'a Trampoline,
    ctx: &'a mut Context,
    frame: FrameId,
    function: FnId,
    spawned: SmallVec<[FrameId; 4]>,
}

impl<'a> CallScope<'a> {
    pub(crate) fn new(
        trampoline: &'a Trampoline,
        ctx: &'a mut Context,
        frame: FrameId,
        function: FnId,
    ) -> Self {
        CallScope {
            trampoline,
            ctx,
            frame,
            function,
            spawned: SmallVec::new(),
        }
    }

    /// The function whose body is running
    pub fn function(&self) -> FnId {
        self.function
    }

    /// The frame whose body is running
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// Intercept a call to `func`.
    ///
    /// The callee does not run here. Returns the memoized value when an equal
    /// call has already resolved, otherwise a placeholder for its result.
    pub fn call<I, T>(&mut self, func: FnId, args: I) -> Result<Term, ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let trampoline = self.trampoline;
        let callee = trampoline.name(func);
        let args = concrete_args(callee, args)?;
        trampoline.body(func)?;

        trace!(target: "iterec::backend::trampoline::context", caller = %self.frame, callee, ?args, "intercepted call");
        match self.ctx.intern(CallKey { func, args })? {
            Interned::Known(term) => Ok(term),
            Interned::Fresh(id) => {
                self.spawned.push(id);
                Ok(Term::Call(id))
            }
        }
    }

    /// Call the running function again with new arguments
    pub fn recurse<I, T>(&mut self, args: I) -> Result<Term, ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.call(self.function, args)
    }

    /// Call a function by its registered name
    pub fn call_named<I, T>(&mut self, name: &str, args: I) -> Result<Term, ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let func = self
            .trampoline
            .lookup(name)
            .ok_or_else(|| ExecError::UnknownFunction(name.to_string()))?;
        self.call(func, args)
    }

    /// Frames created by this body, in call order
    pub(crate) fn into_spawned(self) -> SmallVec<[FrameId; 4]> {
        self.spawned
    }
}
