//! Dictionary traits.

use crate::bytes::Bytes;
use crate::error::Result;

/// A byte-string keyed dictionary.
///
/// Keys and values are opaque byte strings. A key may be stored as a
/// *prefix key*, in which case it matches every query it is a strict prefix
/// of; when several prefix keys match a query, the longest one wins. An
/// exact match always beats prefix matches.
pub trait Dictionary {
    /// Store `key` → `value`, replacing any previous binding.
    fn put(&mut self, key: Bytes, value: Bytes) -> Result<()> {
        self.put_key(key, value, false)
    }

    /// Store `key` → `value`, optionally marking it as a prefix key.
    /// Re-inserting a key overwrites both the value and the prefix flag.
    fn put_key(&mut self, key: Bytes, value: Bytes, is_prefix_key: bool) -> Result<()>;

    /// Look up `key`: the exact binding if present, else the binding of the
    /// longest prefix key that is a strict prefix of `key`, else `None`.
    fn get(&self, key: &Bytes) -> Result<Option<Bytes>>;

    /// All key-value pairs. Reserved; most implementations return `None`.
    fn entries(&self) -> Option<Vec<(Bytes, Bytes)>> {
        None
    }
}

/// A dictionary that must be compiled into its packed form before lookups.
///
/// All `put`s happen before `compile`; all `get`s happen after. `compile`
/// is idempotent: the second and later calls are no-ops.
pub trait CompiledDictionary: Dictionary {
    /// Pack the dictionary into its immutable byte representation.
    fn compile(&mut self);
}
