//! # compactdict
//!
//! Compact, in-memory byte-string dictionaries with exact and
//! longest-matching-prefix lookup.
//!
//! The interesting structures here are the compiled tries: a mutable trie
//! is built up with `put`, then `compile` packs it into a single
//! position-independent byte buffer that answers lookups in O(|key|) with a
//! binary search over sorted, fixed-width edge records. Two packed
//! variants:
//!
//! - [`CompiledTrieDict`]: values are interned into a table at the front of
//!   the buffer and nodes reference them by offset. Many keys mapping to
//!   few distinct values cost one value copy total.
//! - [`FstDict`]: values are distributed along edges (shared key prefixes
//!   share value prefixes) and structurally identical suffix subtrees are
//!   deduplicated at serialization time, collapsing the trie into a minimal
//!   acyclic transducer.
//!
//! [`BasicTrieDict`], [`DereferencedTrieDict`], [`HashMapDict`] and
//! [`DereferencedHashMapDict`] are uncompressed references used as
//! correctness baselines.
//!
//! ## Example
//!
//! ```rust
//! use compactdict::{Bytes, CompiledDictionary, Dictionary, FstDict};
//!
//! let mut dict = FstDict::new();
//! dict.put_key(Bytes::from("key"), Bytes::from("value"), true).unwrap();
//! dict.put(Bytes::from("key1"), Bytes::from("value1")).unwrap();
//! dict.compile();
//!
//! assert_eq!(dict.get(&Bytes::from("key1")).unwrap(), Some(Bytes::from("value1")));
//! // "key" is a prefix key: it answers for any query it prefixes.
//! assert_eq!(dict.get(&Bytes::from("keyZ")).unwrap(), Some(Bytes::from("value")));
//! assert_eq!(dict.get(&Bytes::from("nope")).unwrap(), None);
//! ```
//!
//! The packed buffer is immutable after `compile`; each lookup carries its
//! own cursor, so a compiled dictionary can be shared behind an `Arc` and
//! queried from many threads without synchronization.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod bytes;
pub mod dict;
pub mod error;
pub mod map;
pub mod trie;
pub mod varint;

#[cfg(test)]
mod proptests;

pub use bytes::Bytes;
pub use dict::{CompiledDictionary, Dictionary};
pub use error::{DictError, Result};
pub use map::{DereferencedHashMapDict, HashMapDict};
pub use trie::{
    BasicTrieDict, CompiledTrieDict, DereferencedTrieDict, FstDict, FstStats, TrieDictStats,
};
