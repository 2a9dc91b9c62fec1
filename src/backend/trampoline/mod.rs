//! Deferred-evaluation Trampoline
//!
//! This module provides the call frames, the per-invocation context and the
//! driver that together run naturally recursive functions with an explicit
//! work stack instead of recursive function calls.

mod context;
mod engine;
mod types;

pub use context::CallScope;
pub use types::{Args, CallKey, Frame, FrameState, InvokeStats};

pub(crate) use context::{concrete_args, Context, Interned};
pub(crate) use engine::drive;
