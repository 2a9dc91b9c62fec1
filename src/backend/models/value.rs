use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;

/// A concrete value passed to, or returned from, a trampolined function.
///
/// Values are the only thing allowed in a call's argument tuple, so they must be
/// hashable: the per-context memo table is keyed by `(function, arguments)`.
///
/// Lists share their items behind an `Arc`, so handing a sub-list to a
/// recursive call is a pointer copy. Every walk over a value's structure
/// (equality, hashing, formatting, dropping) uses an explicit stack, so
/// nesting depth is bounded by the heap and not the native stack.
#[derive(Clone)]
pub enum Value {
    /// The empty value
    Nil,
    /// A boolean literal
    Bool(bool),
    /// An integer literal
    Long(i64),
    /// A floating point literal
    Float(f64),
    /// A string literal
    String(String),
    /// An ordered sequence of values
    List(Arc<Vec<Value>>),
}

impl Drop for Value {
    fn drop(&mut self) {
        let Value::List(items) = self else {
            return;
        };
        // Shared lists only lose a reference here
        let Some(items) = Arc::get_mut(items) else {
            return;
        };
        let mut orphans = std::mem::take(items);
        while let Some(mut value) = orphans.pop() {
            if let Value::List(inner) = &mut value {
                if let Some(inner) = Arc::get_mut(inner) {
                    orphans.append(inner);
                }
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Value::List(xs), Value::List(ys)) => {
                    if Arc::ptr_eq(xs, ys) {
                        continue;
                    }
                    if xs.len() != ys.len() {
                        return false;
                    }
                    pending.extend(xs.iter().zip(ys.iter()));
                }
                (Value::Nil, Value::Nil) => {}
                (Value::Bool(x), Value::Bool(y)) if x == y => {}
                (Value::Long(x), Value::Long(y)) if x == y => {}
                (Value::Float(x), Value::Float(y)) if x == y => {}
                (Value::String(x), Value::String(y)) if x == y => {}
                _ => return false,
            }
        }
        true
    }
}

// Floats compare by IEEE rules, so NaN arguments simply never hit the memo table.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut pending = vec![self];
        while let Some(value) = pending.pop() {
            std::mem::discriminant(value).hash(state);
            match value {
                Value::Nil => {}
                Value::Bool(b) => b.hash(state),
                Value::Long(n) => n.hash(state),
                // 0.0 == -0.0, so both must hash alike
                Value::Float(f) if *f == 0.0 => 0u64.hash(state),
                Value::Float(f) => f.to_bits().hash(state),
                Value::String(s) => s.hash(state),
                Value::List(items) => {
                    items.len().hash(state);
                    pending.extend(items.iter().rev());
                }
            }
        }
    }
}

impl Value {
    /// Build a list value from anything convertible into values
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    pub fn empty_list() -> Self {
        Value::List(Arc::new(Vec::new()))
    }

    /// Friendly type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Long(_) => "Number (integer)",
            Value::Float(_) => "Number (float)",
            Value::String(_) => "String",
            Value::List(_) => "List",
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Long(_) | Value::Float(_))
    }
}

#[derive(Clone, Copy)]
enum Piece<'v> {
    Value(&'v Value),
    Text(&'static str),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pieces still to write, last one first
        let mut pending = vec![Piece::Value(self)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Value(Value::List(items)) => {
                    f.write_str("[")?;
                    pending.push(Piece::Text("]"));
                    pending.extend(Itertools::intersperse(
                        items.iter().rev().map(Piece::Value),
                        Piece::Text(", "),
                    ));
                }
                Piece::Value(Value::Nil) => f.write_str("nil")?,
                Piece::Value(Value::Bool(b)) => write!(f, "{}", b)?,
                Piece::Value(Value::Long(n)) => write!(f, "{}", n)?,
                Piece::Value(Value::Float(x)) if x.fract() == 0.0 && x.is_finite() => {
                    write!(f, "{:.1}", x)?
                }
                Piece::Value(Value::Float(x)) => write!(f, "{}", x)?,
                Piece::Value(Value::String(s)) => write!(f, "{:?}", s)?,
            }
        }
        Ok(())
    }
}

// Same text as `Display`; a derived `Debug` would recurse per nesting level.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Long(n as i64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }
}

/// Error produced when parsing a value literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseValueError {
    pub message: String,
    pub position: usize,
}

impl fmt::Display for ParseValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

impl std::error::Error for ParseValueError {}

/// Parses value literals: `nil`, `true`, `false`, integers, floats,
/// `"strings"` and bracketed lists such as `[1, [2, 3], "x"]`.
///
/// Nesting is handled with an explicit stack of open lists.
impl FromStr for Value {
    type Err = ParseValueError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let bytes = input.as_bytes();
        let err = |message: &str, position: usize| ParseValueError {
            message: message.to_string(),
            position,
        };

        let mut open: Vec<Vec<Value>> = Vec::new();
        let mut done: Option<Value> = None;
        let mut pos = 0;

        while pos < bytes.len() {
            let c = bytes[pos];
            if c.is_ascii_whitespace() || c == b',' {
                pos += 1;
                continue;
            }
            if done.is_some() {
                return Err(err("trailing input", pos));
            }

            let atom = match c {
                b'[' => {
                    open.push(Vec::new());
                    pos += 1;
                    continue;
                }
                b']' => {
                    let items = open.pop().ok_or_else(|| err("unbalanced ']'", pos))?;
                    pos += 1;
                    Value::from(items)
                }
                b'"' => {
                    let start = pos + 1;
                    let end = input[start..]
                        .find('"')
                        .map(|i| start + i)
                        .ok_or_else(|| err("unterminated string", pos))?;
                    pos = end + 1;
                    Value::String(input[start..end].to_string())
                }
                _ => {
                    let start = pos;
                    while pos < bytes.len()
                        && !bytes[pos].is_ascii_whitespace()
                        && !matches!(bytes[pos], b',' | b'[' | b']' | b'"')
                    {
                        pos += 1;
                    }
                    let token = &input[start..pos];
                    match token {
                        "nil" => Value::Nil,
                        "true" => Value::Bool(true),
                        "false" => Value::Bool(false),
                        _ => {
                            if let Ok(n) = token.parse::<i64>() {
                                Value::Long(n)
                            } else if let Ok(x) = token.parse::<f64>() {
                                Value::Float(x)
                            } else {
                                return Err(err(&format!("unknown token '{}'", token), start));
                            }
                        }
                    }
                }
            };

            match open.last_mut() {
                Some(list) => list.push(atom),
                None => done = Some(atom),
            }
        }

        if !open.is_empty() {
            return Err(err("unclosed '['", bytes.len()));
        }
        done.ok_or_else(|| err("empty input", 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_scalars() {
        assert_eq!("42".parse::<Value>().unwrap(), Value::Long(42));
        assert_eq!("-7".parse::<Value>().unwrap(), Value::Long(-7));
        assert_eq!("2.5".parse::<Value>().unwrap(), Value::Float(2.5));
        assert_eq!("true".parse::<Value>().unwrap(), Value::Bool(true));
        assert_eq!("nil".parse::<Value>().unwrap(), Value::Nil);
        assert_eq!(
            "\"hi there\"".parse::<Value>().unwrap(),
            Value::String("hi there".to_string())
        );
    }

    #[test]
    fn test_parse_nested_lists() {
        let parsed: Value = "[[1, 3], [2, [4]], 5]".parse().unwrap();
        let expected = Value::list(vec![
            Value::list([1, 3]),
            Value::list(vec![Value::Long(2), Value::list([4])]),
            Value::Long(5),
        ]);
        assert_eq!(parsed, expected);
        assert_eq!("[]".parse::<Value>().unwrap(), Value::empty_list());
    }

    #[test]
    fn test_parse_errors() {
        assert!("[1, 2".parse::<Value>().is_err());
        assert!("1 2".parse::<Value>().is_err());
        assert!("]".parse::<Value>().is_err());
        assert!("frob".parse::<Value>().is_err());
        assert!("".parse::<Value>().is_err());
    }

    #[test]
    fn test_display() {
        let v = Value::list(vec![Value::Long(1), Value::from("a"), Value::Float(2.0)]);
        assert_eq!(v.to_string(), "[1, \"a\", 2.0]");
        assert_eq!(Value::Nil.to_string(), "nil");
    }

    #[test]
    fn test_hash_agrees_with_eq() {
        let mut set = HashSet::new();
        set.insert(Value::Float(0.0));
        assert!(set.contains(&Value::Float(-0.0)));

        set.insert(Value::list([1, 2]));
        assert!(set.contains(&Value::list([1, 2])));
        assert!(!set.contains(&Value::list([2, 1])));
    }

    fn nested(depth: usize) -> Value {
        let mut value = Value::Long(2);
        for _ in 0..depth {
            value = Value::from(vec![value]);
        }
        value
    }

    #[test]
    fn test_deep_nesting_on_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let depth = 200_000;
                let text = format!("{}2{}", "[".repeat(depth), "]".repeat(depth));
                let parsed: Value = text.parse().unwrap();
                let built = nested(depth);

                assert_eq!(parsed, built);
                assert_ne!(parsed, nested(depth - 1));
                assert_eq!(parsed.to_string(), text);

                let mut set = HashSet::new();
                set.insert(parsed);
                assert!(set.contains(&built));
                drop(set);
                drop(built);
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_clone_shares_list_storage() {
        let original = Value::list([1, 2, 3]);
        let copy = original.clone();
        match (&original, &copy) {
            (Value::List(a), Value::List(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("Expected lists"),
        }
        drop(original);
        assert_eq!(copy, Value::list([1, 2, 3]));
    }
}
