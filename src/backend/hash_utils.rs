//! Fast HashMap/HashSet type aliases with optional AES-NI acceleration
//!
//! When the `ahash-hasher` feature is enabled, the memo table and membership
//! set of every trampoline context use ahash's AES-NI accelerated hasher
//! instead of SipHash. Memo lookups happen on every intercepted call, so the
//! hasher sits on the hot path.
//!
//! When the feature is disabled, these types are simple aliases to
//! the standard library HashMap/HashSet.

#[cfg(feature = "ahash-hasher")]
pub use ahash::{AHashMap as FastHashMap, AHashSet as FastHashSet};

#[cfg(not(feature = "ahash-hasher"))]
pub use std::collections::{HashMap as FastHashMap, HashSet as FastHashSet};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::models::Value;

    #[test]
    fn test_fast_hash_map_with_value_keys() {
        let mut map: FastHashMap<Vec<Value>, usize> = FastHashMap::default();
        map.insert(vec![Value::Long(1), Value::from("a")], 7);
        assert_eq!(map.get(&vec![Value::Long(1), Value::from("a")]), Some(&7));
    }

    #[test]
    fn test_fast_hash_set() {
        let mut set: FastHashSet<Value> = FastHashSet::default();
        set.insert(Value::list([1, 2]));
        assert!(set.contains(&Value::list([1, 2])));
    }
}
