//! Hash-map backed reference dictionaries.
//!
//! These are correctness baselines, not compact structures: they answer
//! exact-match lookups only and exist so the compiled tries have something
//! simple to be cross-checked against.

mod dereferenced;
mod hashmap;

pub use dereferenced::DereferencedHashMapDict;
pub use hashmap::HashMapDict;
