//! Registration of trampolined functions and the `invoke` entry point.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::grounded::ExecError;
use super::hash_utils::FastHashMap;
use super::models::{Term, Value};
use super::trampoline::{concrete_args, drive, CallKey, CallScope, Context, Interned, InvokeStats};
use crate::config::TrampolineConfig;

/// Identity of a registered function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FnId(pub(crate) u32);

/// A function body that can run on the trampoline.
///
/// `step` computes one invocation from concrete arguments. Recursive calls go
/// through `scope`, which returns placeholders; the body combines them with
/// `Term` operations and returns the resulting template (or a plain value for
/// a base case).
///
/// Closures of the same shape implement this trait, so most bodies are
/// registered with `Trampoline::register`:
///
/// ```
/// use iterec::{Term, Trampoline, Value};
///
/// let mut trampoline = Trampoline::new();
/// let fact = trampoline.register("fact", |args, scope| {
///     let n = args[0].as_long().unwrap_or(0);
///     if n <= 1 {
///         return Ok(Term::from(1));
///     }
///     Term::from(n).mul(scope.recurse([n - 1])?)
/// });
/// assert_eq!(trampoline.invoke(fact, [5]).unwrap(), Value::Long(120));
/// ```
pub trait Recursive: Send + Sync {
    fn step(&self, args: &[Value], scope: &mut CallScope<'_>) -> Result<Term, ExecError>;
}

impl<F> Recursive for F
where
    F: Fn(&[Value], &mut CallScope<'_>) -> Result<Term, ExecError> + Send + Sync,
{
    fn step(&self, args: &[Value], scope: &mut CallScope<'_>) -> Result<Term, ExecError> {
        self(args, scope)
    }
}

struct Entry {
    name: String,
    body: Option<Arc<dyn Recursive>>,
}

/// Registry of trampolined functions, keyed by name.
///
/// Every `invoke` builds a fresh context, so one registry can serve many
/// independent invocations, including from several threads at once.
pub struct Trampoline {
    entries: Vec<Entry>,
    names: FastHashMap<String, FnId>,
    config: TrampolineConfig,
}

impl Default for Trampoline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Trampoline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trampoline")
            .field(
                "functions",
                &self.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            )
            .field("config", &self.config)
            .finish()
    }
}

impl Trampoline {
    pub fn new() -> Self {
        Self::with_config(TrampolineConfig::default())
    }

    pub fn with_config(config: TrampolineConfig) -> Self {
        Trampoline {
            entries: Vec::new(),
            names: FastHashMap::default(),
            config,
        }
    }

    pub fn config(&self) -> &TrampolineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TrampolineConfig) {
        self.config = config;
    }

    /// Reserve an id for `name` without a body yet.
    ///
    /// Mutually recursive functions declare each other first so their bodies
    /// can capture the partner's id. Declaring an existing name returns its id.
    pub fn declare(&mut self, name: &str) -> FnId {
        if let Some(&id) = self.names.get(name) {
            return id;
        }
        let id = FnId(self.entries.len() as u32);
        self.entries.push(Entry {
            name: name.to_string(),
            body: None,
        });
        self.names.insert(name.to_string(), id);
        id
    }

    /// Attach (or replace) the body of a declared function
    pub fn define<F>(&mut self, id: FnId, body: F) -> Result<(), ExecError>
    where
        F: Fn(&[Value], &mut CallScope<'_>) -> Result<Term, ExecError> + Send + Sync + 'static,
    {
        self.define_recursive(id, Arc::new(body))
    }

    pub fn define_recursive(&mut self, id: FnId, body: Arc<dyn Recursive>) -> Result<(), ExecError> {
        let entry = self
            .entries
            .get_mut(id.0 as usize)
            .ok_or_else(|| ExecError::UnknownFunction(format!("{:?}", id)))?;
        entry.body = Some(body);
        Ok(())
    }

    /// Declare and define in one step
    pub fn register<F>(&mut self, name: &str, body: F) -> FnId
    where
        F: Fn(&[Value], &mut CallScope<'_>) -> Result<Term, ExecError> + Send + Sync + 'static,
    {
        let id = self.declare(name);
        self.entries[id.0 as usize].body = Some(Arc::new(body));
        id
    }

    pub fn lookup(&self, name: &str) -> Option<FnId> {
        self.names.get(name).copied()
    }

    pub fn name(&self, id: FnId) -> &str {
        self.entries
            .get(id.0 as usize)
            .map(|e| e.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub(crate) fn body(&self, id: FnId) -> Result<Arc<dyn Recursive>, ExecError> {
        match self.entries.get(id.0 as usize) {
            Some(Entry {
                body: Some(body), ..
            }) => Ok(Arc::clone(body)),
            Some(Entry { name, body: None }) => Err(ExecError::UnknownFunction(format!(
                "'{}' is declared but has no body",
                name
            ))),
            None => Err(ExecError::UnknownFunction(format!("{:?}", id))),
        }
    }

    /// Run `func` to completion without growing the native stack.
    pub fn invoke<I, T>(&self, func: FnId, args: I) -> Result<Value, ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.invoke_with_stats(func, args).map(|(value, _)| value)
    }

    pub fn invoke_named<I, T>(&self, name: &str, args: I) -> Result<Value, ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let func = self
            .lookup(name)
            .ok_or_else(|| ExecError::UnknownFunction(name.to_string()))?;
        self.invoke(func, args)
    }

    /// Like `invoke`, also returning the counters of the invocation's context
    pub fn invoke_with_stats<I, T>(&self, func: FnId, args: I) -> Result<(Value, InvokeStats), ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let name = self.name(func);
        let args = concrete_args(name, args)?;
        self.body(func)?;

        debug!(function = name, args = args.len(), memoize = self.config.memoize, "creating trampoline context");
        let mut ctx = Context::new(&self.config);

        let root = match ctx.intern(CallKey { func, args })? {
            Interned::Fresh(root) => root,
            Interned::Known(term) => return Ok((term.into_value()?, ctx.stats)),
        };

        let outcome = drive(self, &mut ctx, root);
        match &outcome {
            Ok(_) => debug!(
                function = name,
                frames = ctx.stats.frames_created,
                memo_hits = ctx.stats.memo_hits,
                max_work_stack = ctx.stats.max_work_stack,
                "trampoline context resolved"
            ),
            Err(e) => debug!(function = name, frames = ctx.stats.frames_created, error = %e, "trampoline context aborted"),
        }
        outcome.map(|value| (value, ctx.stats))
    }
}
