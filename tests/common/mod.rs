//! Shared helpers for the integration tests
//!
//! - Building the demo registry with a chosen config
//! - Running a closure on a thread with a deliberately small stack
//! - Small value constructors
#![allow(dead_code)]

use iterec::demos::Demos;
use iterec::{TrampolineConfig, Value};
use std::thread;

/// Stack size used to show that depth does not depend on the native stack
pub const SMALL_STACK: usize = 256 * 1024;

pub fn demos() -> Demos {
    Demos::with_config(TrampolineConfig::default())
}

pub fn demos_without_memo() -> Demos {
    Demos::with_config(TrampolineConfig {
        memoize: false,
        ..TrampolineConfig::default()
    })
}

/// Run `f` on a fresh thread with `stack_size` bytes of stack and return its result.
///
/// # Panics
/// Propagates a panic from `f`.
pub fn on_small_stack<F, R>(stack_size: usize, f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let handle = thread::Builder::new()
        .name("small-stack".to_string())
        .stack_size(stack_size)
        .spawn(f)
        .expect("Failed to spawn small-stack thread");
    match handle.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

pub fn longs(items: &[i64]) -> Value {
    Value::list(items.iter().copied())
}

pub fn parse(literal: &str) -> Value {
    literal.parse().expect("Failed to parse value literal")
}
