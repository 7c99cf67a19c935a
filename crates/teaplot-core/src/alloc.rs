//! Hash collections backed by AHash.
//!
//! Scene node stores and per-flow lookups are keyed by small integers and
//! short strings, where AHash outperforms SipHash.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_ahash() {
        let mut map = HashMap::new();
        map.insert("flow", 3);
        assert_eq!(map.get("flow"), Some(&3));
    }

    #[test]
    fn test_hashset_ahash() {
        let mut set = HashSet::new();
        set.insert(7u64);
        assert!(set.contains(&7));
        assert!(!set.contains(&8));
    }
}
