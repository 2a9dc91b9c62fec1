//! Trampoline Engine - Iterative Driver
//!
//! This module contains `drive`, the loop that replaces native recursion.
//! Frames are popped from an explicit work stack, their bodies run with
//! intercepted recursion, and results are resolved bottom-up through a
//! dependents worklist. Nothing here recurses on the Rust stack, no matter
//! how deep the user's recursion goes.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::trace;

use super::context::{CallScope, Context};
use super::types::FrameState;
use crate::backend::grounded::ExecError;
use crate::backend::models::{FrameId, Node, Term, Value};
use crate::backend::registry::Trampoline;
use crate::config::debug_eval_enabled;

/// Run frames until `root` has a concrete value.
///
/// Any error from a body or from a deferred operation aborts the whole
/// context; no partial value is returned.
pub(crate) fn drive(
    trampoline: &Trampoline,
    ctx: &mut Context,
    root: FrameId,
) -> Result<Value, ExecError> {
    // Debug output controlled by environment variable
    let debug_eval = debug_eval_enabled();
    let debug_every = trampoline.config().debug_every;

    ctx.work_stack.push(root);

    while let Some(id) = ctx.work_stack.pop() {
        if ctx.frame(id).state != FrameState::Queued {
            continue;
        }

        run_frame(trampoline, ctx, id)?;

        if debug_eval && progress_due(ctx.stats.frames_executed, debug_every) {
            eprintln!(
                "[ITEREC#{}] frames={} work_stack={} memo_hits={} resolved={}",
                ctx.stats.frames_executed,
                ctx.frames.len(),
                ctx.work_stack.len(),
                ctx.stats.memo_hits,
                ctx.stats.resolutions
            );
        }

        if let Some(value) = ctx.frame_mut(root).value.take() {
            return Ok(value);
        }
    }

    let frame = ctx.frame(root);
    Err(ExecError::RecursionCycle(format!(
        "'{}' still waits on {} unresolved call(s) after every frame ran",
        trampoline.name(frame.key.func),
        frame.waiting
    )))
}

/// Whether the progress line is due after `executed` frames.
///
/// The config fields are public, so a zero period can reach here without
/// passing `TrampolineConfig::validate`; it is treated as 1.
fn progress_due(executed: usize, every: u64) -> bool {
    executed as u64 % every.max(1) == 0
}

/// Execute one frame's body and record its result
fn run_frame(trampoline: &Trampoline, ctx: &mut Context, id: FrameId) -> Result<(), ExecError> {
    let key = Arc::clone(&ctx.frame(id).key);
    let body = trampoline.body(key.func)?;

    ctx.frame_mut(id).state = FrameState::Running;
    ctx.stats.frames_executed += 1;
    trace!(target: "iterec::backend::trampoline::engine", frame = %id, function = trampoline.name(key.func), args = ?key.args, "running frame");

    let mut scope = CallScope::new(trampoline, ctx, id, key.func);
    let outcome = body.step(&key.args, &mut scope);
    let spawned = scope.into_spawned();
    let result = outcome?;

    // The first call the body made runs next, as it would natively
    ctx.work_stack.extend(spawned.into_iter().rev());
    ctx.stats.max_work_stack = ctx.stats.max_work_stack.max(ctx.work_stack.len());

    complete(ctx, id, result)
}

/// Mark a frame done and wire it to the frames its result waits on
fn complete(ctx: &mut Context, id: FrameId, result: Term) -> Result<(), ExecError> {
    let pending = unresolved_calls(ctx, &result);
    trace!(target: "iterec::backend::trampoline::engine", frame = %id, %result, waiting = pending.len(), "frame done");

    let frame = ctx.frame_mut(id);
    frame.state = FrameState::Done;
    frame.waiting = pending.len();
    frame.result = Some(result);

    for &dependency in &pending {
        ctx.frame_mut(dependency).dependents.push(id);
    }

    if pending.is_empty() {
        resolve_from(ctx, id)?;
    }
    Ok(())
}

/// Distinct call placeholders in `term` whose frames have no value yet
fn unresolved_calls(ctx: &Context, term: &Term) -> SmallVec<[FrameId; 4]> {
    let mut pending: SmallVec<[FrameId; 4]> = SmallVec::new();
    let mut stack = vec![term];

    while let Some(term) = stack.pop() {
        match term {
            Term::Value(_) => {}
            Term::Call(id) => {
                if !ctx.frame(*id).is_resolved() {
                    pending.push(*id);
                }
            }
            Term::Composite(node) => stack.extend(node.operands.iter()),
        }
    }

    pending.sort_unstable();
    pending.dedup();
    pending
}

/// Collapse `start` and every dependent that becomes ready as a result
fn resolve_from(ctx: &mut Context, start: FrameId) -> Result<(), ExecError> {
    let mut ready = vec![start];

    while let Some(id) = ready.pop() {
        let Some(template) = ctx.frame_mut(id).result.take() else {
            continue;
        };
        let value = match template {
            Term::Value(value) => value,
            other => collapse(ctx, &other)?,
        };
        ctx.stats.resolutions += 1;
        trace!(target: "iterec::backend::trampoline::engine", frame = %id, %value, "resolved");

        let frame = ctx.frame_mut(id);
        frame.value = Some(value);
        let dependents = std::mem::take(&mut frame.dependents);

        for dependent in dependents {
            let waiting = &mut ctx.frame_mut(dependent).waiting;
            *waiting -= 1;
            if *waiting == 0 {
                ready.push(dependent);
            }
        }
    }
    Ok(())
}

enum Task<'t> {
    Visit(&'t Term),
    Apply(&'t Node),
}

/// Evaluate a result template whose call placeholders have all resolved.
///
/// Post-order walk with an explicit stack: operands are visited left to
/// right, and each node pops its operand values once they are all computed.
fn collapse(ctx: &Context, term: &Term) -> Result<Value, ExecError> {
    let mut tasks = vec![Task::Visit(term)];
    let mut values: Vec<Value> = Vec::new();

    while let Some(task) = tasks.pop() {
        match task {
            Task::Visit(Term::Value(value)) => values.push(value.clone()),
            Task::Visit(Term::Call(id)) => {
                let value = ctx.frame(*id).value.clone().ok_or_else(|| {
                    ExecError::RecursionCycle(format!("frame {} collapsed before it resolved", id))
                })?;
                values.push(value);
            }
            Task::Visit(Term::Composite(node)) => {
                tasks.push(Task::Apply(node));
                tasks.extend(node.operands.iter().rev().map(Task::Visit));
            }
            Task::Apply(node) => {
                let operands = values.split_off(values.len() - node.operands.len());
                values.push(node.op.operation().execute(&operands)?);
            }
        }
    }

    values
        .pop()
        .ok_or_else(|| ExecError::Runtime("empty result template".to_string()))
}
