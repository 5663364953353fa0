//! Uncompiled trie with value interning.

use std::collections::HashSet;

use crate::bytes::Bytes;
use crate::dict::Dictionary;
use crate::error::Result;
use crate::trie::basic::TrieNode;

/// An uncompiled trie dictionary that interns values.
///
/// Same trie and lookup semantics as [`BasicTrieDict`](crate::BasicTrieDict),
/// but equal values share one allocation through an intern set. This is the
/// halfway point between the plain trie and the compiled form with its
/// packed value table.
pub struct DereferencedTrieDict {
    root: TrieNode,
    values: HashSet<Bytes>,
}

impl DereferencedTrieDict {
    /// New empty dictionary.
    pub fn new() -> DereferencedTrieDict {
        DereferencedTrieDict { root: TrieNode::new(), values: HashSet::new() }
    }

    /// Number of distinct values interned so far.
    pub fn distinct_values(&self) -> usize {
        self.values.len()
    }

    fn intern(&mut self, value: Bytes) -> Bytes {
        match self.values.get(&value) {
            Some(canonical) => canonical.clone(),
            None => {
                self.values.insert(value.clone());
                value
            }
        }
    }
}

impl Default for DereferencedTrieDict {
    fn default() -> Self {
        DereferencedTrieDict::new()
    }
}

impl Dictionary for DereferencedTrieDict {
    fn put_key(&mut self, key: Bytes, value: Bytes, is_prefix_key: bool) -> Result<()> {
        let value = self.intern(value);
        self.root.put(&key, value, is_prefix_key);
        Ok(())
    }

    fn get(&self, key: &Bytes) -> Result<Option<Bytes>> {
        Ok(self.root.get(key))
    }
}
