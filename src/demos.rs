//! Worked examples of trampolined functions.
//!
//! Each demo exists twice: as a body registered on a `Trampoline`, and as the
//! plain recursive Rust function it mirrors (`native`). The native versions
//! are the reference results, and they overflow the stack on inputs the
//! trampolined versions handle.

use crate::backend::grounded::{compare_values, ExecError};
use crate::backend::models::{Term, Value};
use crate::backend::registry::{FnId, Trampoline};
use crate::backend::trampoline::CallScope;
use crate::config::TrampolineConfig;

/// A trampoline with every demo registered
pub struct Demos {
    pub trampoline: Trampoline,
    pub fact: FnId,
    pub sum_to: FnId,
    pub ifib1: FnId,
    pub ifib2: FnId,
    pub quicksort: FnId,
    pub even_search: FnId,
}

impl Default for Demos {
    fn default() -> Self {
        Self::new()
    }
}

impl Demos {
    pub const NAMES: &'static [&'static str] =
        &["fact", "sum_to", "ifib1", "ifib2", "quicksort", "even_search"];

    pub fn new() -> Self {
        Self::with_config(TrampolineConfig::default())
    }

    pub fn with_config(config: TrampolineConfig) -> Self {
        let mut trampoline = Trampoline::with_config(config);

        let fact = trampoline.register("fact", fact);
        let sum_to = trampoline.register("sum_to", sum_to);
        let quicksort = trampoline.register("quicksort", quicksort);
        let even_search = trampoline.register("even_search", even_search);

        // Mutually recursive pair: both ids exist before either body does
        let ifib1 = trampoline.declare("ifib1");
        let ifib2 = trampoline.declare("ifib2");
        trampoline.register("ifib1", move |args, scope| ifib_step("ifib1", args, scope, ifib2));
        trampoline.register("ifib2", move |args, scope| ifib_step("ifib2", args, scope, ifib1));

        Demos {
            trampoline,
            fact,
            sum_to,
            ifib1,
            ifib2,
            quicksort,
            even_search,
        }
    }

    /// Run a demo by name on the trampoline
    pub fn run(&self, name: &str, arg: Value) -> Result<Value, ExecError> {
        self.trampoline.invoke_named(name, [arg])
    }

    /// Run the native recursive version of a demo by name
    pub fn run_native(name: &str, arg: &Value) -> Result<Value, ExecError> {
        match name {
            "fact" => Ok(Value::Long(native::fact(long_arg(name, arg)?))),
            "sum_to" => Ok(Value::Long(native::sum_to(long_arg(name, arg)?))),
            "ifib1" | "ifib2" => Ok(Value::Long(native::fib(long_arg(name, arg)?))),
            "quicksort" => {
                let items = list_arg(name, arg)?;
                native::quicksort(items).map(Value::from)
            }
            "even_search" => Ok(Value::from(native::even_search(arg))),
            other => Err(ExecError::UnknownFunction(other.to_string())),
        }
    }
}

fn long_arg(name: &str, arg: &Value) -> Result<i64, ExecError> {
    arg.as_long().ok_or_else(|| {
        ExecError::IncorrectArgument(format!(
            "{} expects a Number (integer), got {}",
            name,
            arg.type_name()
        ))
    })
}

fn list_arg<'v>(name: &str, arg: &'v Value) -> Result<&'v [Value], ExecError> {
    arg.as_list().ok_or_else(|| {
        ExecError::IncorrectArgument(format!("{} expects a List, got {}", name, arg.type_name()))
    })
}

fn single<'v>(name: &str, args: &'v [Value]) -> Result<&'v Value, ExecError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(ExecError::IncorrectArgument(format!(
            "{} requires 1 argument, got {}",
            name,
            args.len()
        ))),
    }
}

/// fact(n) = n * fact(n - 1), fact(n <= 1) = 1
fn fact(args: &[Value], scope: &mut CallScope<'_>) -> Result<Term, ExecError> {
    let n = long_arg("fact", single("fact", args)?)?;
    if n <= 1 {
        return Ok(Term::from(1));
    }
    Term::from(n).mul(scope.recurse([n - 1])?)
}

/// sum_to(n) = n + sum_to(n - 1); linear depth, used for deep-recursion tests
fn sum_to(args: &[Value], scope: &mut CallScope<'_>) -> Result<Term, ExecError> {
    let n = long_arg("sum_to", single("sum_to", args)?)?;
    if n <= 0 {
        return Ok(Term::from(0));
    }
    Term::from(n).add(scope.recurse([n - 1])?)
}

fn ifib_step(
    name: &str,
    args: &[Value],
    scope: &mut CallScope<'_>,
    partner: FnId,
) -> Result<Term, ExecError> {
    let n = long_arg(name, single(name, args)?)?;
    if n < 2 {
        return Ok(Term::from(n));
    }
    let a = scope.call(partner, [n - 1])?;
    let b = scope.call(partner, [n - 2])?;
    a.add(b)
}

/// Pivot on the head, sort both partitions, concatenate
fn quicksort(args: &[Value], scope: &mut CallScope<'_>) -> Result<Term, ExecError> {
    let items = list_arg("quicksort", single("quicksort", args)?)?;
    let Some((pivot, rest)) = items.split_first() else {
        return Ok(Term::from(Vec::new()));
    };

    let mut smaller = Vec::new();
    let mut larger = Vec::new();
    for item in rest {
        if compare_values(item, pivot)?.is_lt() {
            smaller.push(item.clone());
        } else {
            larger.push(item.clone());
        }
    }

    let left = scope.recurse([Value::from(smaller)])?;
    let right = scope.recurse([Value::from(larger)])?;
    Term::concat_all([left, Term::from(vec![pivot.clone()]), right])
}

/// Even integers of a nested list tree, in depth-first order
fn even_search(args: &[Value], scope: &mut CallScope<'_>) -> Result<Term, ExecError> {
    match single("even_search", args)? {
        Value::List(items) => {
            let parts = items
                .iter()
                .map(|item| scope.recurse([item.clone()]))
                .collect::<Result<Vec<_>, _>>()?;
            Term::concat_all(parts)
        }
        Value::Long(n) if n % 2 == 0 => Ok(Term::from(vec![Value::Long(*n)])),
        _ => Ok(Term::from(Vec::new())),
    }
}

/// Plain recursive versions of the demos
pub mod native {
    use super::{compare_values, ExecError, Value};

    /// Overflows `i64` past 20!
    pub fn fact(n: i64) -> i64 {
        if n <= 1 {
            1
        } else {
            n * fact(n - 1)
        }
    }

    pub fn sum_to(n: i64) -> i64 {
        if n <= 0 {
            0
        } else {
            n + sum_to(n - 1)
        }
    }

    pub fn fib(n: i64) -> i64 {
        if n < 2 {
            n
        } else {
            fib(n - 1) + fib(n - 2)
        }
    }

    pub fn quicksort(items: &[Value]) -> Result<Vec<Value>, ExecError> {
        let Some((pivot, rest)) = items.split_first() else {
            return Ok(Vec::new());
        };
        let mut smaller = Vec::new();
        let mut larger = Vec::new();
        for item in rest {
            if compare_values(item, pivot)?.is_lt() {
                smaller.push(item.clone());
            } else {
                larger.push(item.clone());
            }
        }
        let mut sorted = quicksort(&smaller)?;
        sorted.push(pivot.clone());
        sorted.extend(quicksort(&larger)?);
        Ok(sorted)
    }

    pub fn even_search(tree: &Value) -> Vec<Value> {
        match tree {
            Value::List(items) => items.iter().flat_map(even_search).collect(),
            Value::Long(n) if n % 2 == 0 => vec![Value::Long(*n)],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact() {
        let demos = Demos::new();
        assert_eq!(demos.trampoline.invoke(demos.fact, [5]).unwrap(), Value::Long(120));
        assert_eq!(demos.trampoline.invoke(demos.fact, [0]).unwrap(), Value::Long(1));
    }

    #[test]
    fn test_fact_overflow_is_arithmetic_error() {
        let demos = Demos::new();
        let result = demos.trampoline.invoke(demos.fact, [21]);
        assert!(matches!(result, Err(ExecError::Arithmetic(_))));
    }

    #[test]
    fn test_ifib_pair() {
        let demos = Demos::new();
        assert_eq!(demos.run("ifib1", Value::Long(10)).unwrap(), Value::Long(55));
        assert_eq!(demos.run("ifib2", Value::Long(10)).unwrap(), Value::Long(55));
    }

    #[test]
    fn test_ifib_pair_shares_one_context() {
        let demos = Demos::new();
        let (_, stats) = demos
            .trampoline
            .invoke_with_stats(demos.ifib1, [12])
            .unwrap();
        assert_eq!(stats.participants, 2);
    }

    #[test]
    fn test_quicksort() {
        let demos = Demos::new();
        assert_eq!(
            demos.run("quicksort", Value::list([3, 1, 2])).unwrap(),
            Value::list([1, 2, 3])
        );
        assert_eq!(
            demos.run("quicksort", Value::empty_list()).unwrap(),
            Value::empty_list()
        );
    }

    #[test]
    fn test_even_search_tree() {
        let tree: Value = "[[[1, 3, 5], [2, 4, 5]], [9, 11, 13], [22, 9], [[1, -33, 44], [[99, 100]]], 102, 104, 103]"
            .parse()
            .unwrap();
        let expected = Value::list([2, 4, 22, 44, 100, 102, 104]);
        assert_eq!(demos_run("even_search", tree.clone()), expected);
        assert_eq!(Demos::run_native("even_search", &tree).unwrap(), expected);
    }

    #[test]
    fn test_wrong_argument_type() {
        let demos = Demos::new();
        let result = demos.run("fact", Value::from("five"));
        assert!(matches!(result, Err(ExecError::IncorrectArgument(_))));
        assert!(matches!(
            Demos::run_native("quicksort", &Value::Long(3)),
            Err(ExecError::IncorrectArgument(_))
        ));
    }

    fn demos_run(name: &str, arg: Value) -> Value {
        Demos::new().run(name, arg).unwrap()
    }
}
