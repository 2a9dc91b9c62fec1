//! iterec - Deferred-evaluation Trampoline
//!
//! Runs functions written in natural recursive style without growing the
//! native call stack, while returning exactly what native recursion would.
//!
//! # Architecture
//!
//! 1. **Registration** (`backend::registry`)
//!    - Bodies implement `Recursive` (or are closures of the same shape)
//!    - `declare` reserves ids so mutually recursive bodies can name each other
//!
//! 2. **Interception** (`backend::trampoline::CallScope`)
//!    - A recursive call does not run the callee; it registers a frame and
//!      returns a placeholder `Term`
//!    - Arguments must be concrete; equal calls share one frame
//!
//! 3. **Deferred operations** (`backend::models::Term`, `backend::grounded`)
//!    - Arithmetic, comparison, concatenation and indexing on placeholders
//!      build composite placeholders instead of running
//!
//! 4. **Driver** (`backend::trampoline::engine`)
//!    - Pops frames from an explicit work stack, runs bodies, and collapses
//!      result templates bottom-up once their dependencies resolve
//!
//! # Example
//!
//! ```rust
//! use iterec::{Term, Trampoline, Value};
//!
//! let mut trampoline = Trampoline::new();
//! let is_even = trampoline.declare("is_even");
//! let is_odd = trampoline.declare("is_odd");
//! trampoline
//!     .define(is_even, move |args, scope| match args[0].as_long() {
//!         Some(0) => Ok(Term::from(true)),
//!         Some(n) => scope.call(is_odd, [n - 1]),
//!         None => Ok(Term::from(false)),
//!     })
//!     .unwrap();
//! trampoline
//!     .define(is_odd, move |args, scope| match args[0].as_long() {
//!         Some(0) => Ok(Term::from(false)),
//!         Some(n) => scope.call(is_even, [n - 1]),
//!         None => Ok(Term::from(false)),
//!     })
//!     .unwrap();
//!
//! // Far deeper than the native stack allows
//! assert_eq!(trampoline.invoke(is_even, [100_001]).unwrap(), Value::Bool(false));
//! ```
//!
//! # Limits
//!
//! - Branch conditions must be concrete: inspecting a placeholder fails with
//!   `ExecError::UnsupportedRecursionShape`
//! - Bodies must be pure: the driver, not the caller, decides when each body
//!   runs
//! - Non-terminating recursion is not detected; it grows the heap instead of
//!   the stack unless `TrampolineConfig::max_frames` is set

pub mod backend;
pub mod config;
pub mod demos;

pub use backend::{
    CallScope, ExecError, FnId, FrameId, InvokeStats, Op, Recursive, Term, Trampoline, Value,
};
pub use config::{ConfigError, TrampolineConfig};
