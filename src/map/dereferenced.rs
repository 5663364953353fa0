//! `HashMap` dictionary with value interning.

use std::collections::{HashMap, HashSet};

use crate::bytes::Bytes;
use crate::dict::Dictionary;
use crate::error::Result;

/// A `HashMap`-backed dictionary that interns values.
///
/// Equal values share a single allocation: the first sighting of a value is
/// kept in an intern set, and every later binding to an equal value reuses
/// it. Useful when many keys map to few distinct values, which is exactly
/// the shape the compiled tries are built for.
#[derive(Default)]
pub struct DereferencedHashMapDict {
    map: HashMap<Bytes, Bytes>,
    values: HashSet<Bytes>,
}

impl DereferencedHashMapDict {
    /// New empty dictionary.
    pub fn new() -> DereferencedHashMapDict {
        DereferencedHashMapDict { map: HashMap::new(), values: HashSet::new() }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of distinct values interned so far. Values orphaned by
    /// re-insertion stay counted; there is no deletion.
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

impl Dictionary for DereferencedHashMapDict {
    fn put_key(&mut self, key: Bytes, value: Bytes, _is_prefix_key: bool) -> Result<()> {
        let value = self.intern(value);
        self.map.insert(key, value);
        Ok(())
    }

    fn get(&self, key: &Bytes) -> Result<Option<Bytes>> {
        Ok(self.map.get(key).cloned())
    }
}
