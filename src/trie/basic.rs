//! Uncompiled reference trie.
//!
//! A plain boxed-node trie with one edge per key byte. No packing, no
//! compile step: this is the semantic reference the compiled dictionaries
//! are tested against, and the simplest correct implementation of
//! longest-prefix-key lookup.

use std::collections::HashMap;

use crate::bytes::Bytes;
use crate::dict::Dictionary;
use crate::error::Result;

/// A node of the uncompiled trie. Carries the walk logic so the trie
/// dictionaries built on it stay thin wrappers.
pub(crate) struct TrieNode {
    value: Option<Bytes>,
    is_prefix_end: bool,
    children: HashMap<u8, TrieNode>,
}

impl TrieNode {
    pub(crate) fn new() -> TrieNode {
        TrieNode {
            value: None,
            is_prefix_end: false,
            children: HashMap::new(),
        }
    }

    /// Store `value` at the end of `key`'s path, creating nodes as needed.
    pub(crate) fn put(&mut self, key: &Bytes, value: Bytes, is_prefix_key: bool) {
        let mut node = self;
        for &b in key.as_slice() {
            node = node.children.entry(b).or_insert_with(TrieNode::new);
        }
        node.value = Some(value);
        node.is_prefix_end = is_prefix_key;
    }

    /// Walk `key`, tracking the deepest prefix-end value passed on the way
    /// down. An exact binding at the terminal wins over any prefix match.
    pub(crate) fn get(&self, key: &Bytes) -> Option<Bytes> {
        let mut node = self;
        let mut prefix_value = None;
        for &b in key.as_slice() {
            if node.is_prefix_end {
                prefix_value = node.value.clone();
            }
            match node.children.get(&b) {
                Some(child) => node = child,
                None => return prefix_value,
            }
        }
        if node.value.is_some() {
            return node.value.clone();
        }
        prefix_value
    }
}

/// A mutable, uncompiled trie dictionary.
///
/// Supports lookups at any time; there is no compiled form and no lifecycle
/// gate.
pub struct BasicTrieDict {
    root: TrieNode,
}

impl BasicTrieDict {
    /// New empty dictionary.
    pub fn new() -> BasicTrieDict {
        BasicTrieDict { root: TrieNode::new() }
    }
}

impl Default for BasicTrieDict {
    fn default() -> Self {
        BasicTrieDict::new()
    }
}

impl Dictionary for BasicTrieDict {
    fn put_key(&mut self, key: Bytes, value: Bytes, is_prefix_key: bool) -> Result<()> {
        self.root.put(&key, value, is_prefix_key);
        Ok(())
    }

    fn get(&self, key: &Bytes) -> Result<Option<Bytes>> {
        Ok(self.root.get(key))
    }
}
