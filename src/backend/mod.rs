// Backend module for trampolined evaluation
//
// - `models`: concrete values and the placeholder terms bodies build
// - `grounded`: operations over concrete values, shared by eager and deferred paths
// - `trampoline`: call frames, per-invocation context, and the driver loop
// - `registry`: function registration and the `invoke` entry point

pub mod grounded;
pub mod hash_utils;
pub mod models;
pub mod registry;
pub mod trampoline;

pub use grounded::{ExecError, GroundedOperation, GroundedResult};
pub use models::*;
pub use registry::{FnId, Recursive, Trampoline};
pub use trampoline::{CallScope, InvokeStats};
