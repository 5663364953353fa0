//! Plain `HashMap` dictionary baseline.

use std::collections::HashMap;

use crate::bytes::Bytes;
use crate::dict::Dictionary;
use crate::error::Result;

/// A `HashMap`-backed dictionary.
///
/// Exact-match only: the prefix-key flag is accepted and ignored. This is
/// the simplest possible implementation of the trait and the baseline the
/// trie dictionaries are cross-checked against.
#[derive(Default)]
pub struct HashMapDict {
    map: HashMap<Bytes, Bytes>,
}

impl HashMapDict {
    /// New empty dictionary.
    pub fn new() -> HashMapDict {
        HashMapDict { map: HashMap::new() }
    }

    /// New empty dictionary sized for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> HashMapDict {
        HashMapDict { map: HashMap::with_capacity(capacity) }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Dictionary for HashMapDict {
    fn put_key(&mut self, key: Bytes, value: Bytes, _is_prefix_key: bool) -> Result<()> {
        self.map.insert(key, value);
        Ok(())
    }

    fn get(&self, key: &Bytes) -> Result<Option<Bytes>> {
        Ok(self.map.get(key).cloned())
    }

    fn entries(&self) -> Option<Vec<(Bytes, Bytes)>> {
        Some(self.map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
