//! Model-based property tests for the compiled dictionaries.
//!
//! Random entry sets are inserted into a compiled dictionary and into a
//! `BTreeMap`-backed model implementing the documented lookup contract
//! (exact match, else the longest prefix key that is a strict prefix).
//! Every inserted key plus a battery of near-miss probes must agree.
//!
//! The value-dereferenced trie is exercised with fully arbitrary keys,
//! including prefix chains and re-insertions. The value-prefixed FST is
//! exercised with fixed-length (prefix-free) keysets: distributing values
//! along edges makes a key that ends at an interior node share its value
//! prefix with the whole subtree, so arbitrary proper-prefix keysets are
//! outside its contract (see DESIGN.md).

use std::collections::BTreeMap;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

use crate::buffer::{ByteBuffer, Cursor};
use crate::bytes::Bytes;
use crate::dict::{CompiledDictionary, Dictionary};
use crate::trie::{BasicTrieDict, CompiledTrieDict, FstDict};
use crate::varint::{read_vint, write_vint};

/// Reference model: last-writer-wins bindings plus the longest-prefix rule.
#[derive(Default)]
struct Model {
    map: BTreeMap<Vec<u8>, (Vec<u8>, bool)>,
}

impl Model {
    fn insert(&mut self, key: &[u8], value: &[u8], is_prefix: bool) {
        self.map.insert(key.to_vec(), (value.to_vec(), is_prefix));
    }

    fn get(&self, query: &[u8]) -> Option<Vec<u8>> {
        if let Some((value, _)) = self.map.get(query) {
            return Some(value.clone());
        }
        self.map
            .iter()
            .filter(|(key, (_, is_prefix))| {
                *is_prefix && key.len() < query.len() && query.starts_with(key)
            })
            .max_by_key(|(key, _)| key.len())
            .map(|(_, (value, _))| value.clone())
    }
}

/// A small value pool keeps many keys mapping to few distinct values,
/// which is the shape the compiled dictionaries optimize for. The pool
/// shares a common value prefix on purpose: it exercises the FST's
/// prefix-splitting paths.
#[derive(Arbitrary, Debug, Clone)]
enum ValuePick {
    North,
    South,
    East,
    West,
    Empty,
}

impl ValuePick {
    fn bytes(&self) -> &'static [u8] {
        match self {
            ValuePick::North => b"region-north",
            ValuePick::South => b"region-south",
            ValuePick::East => b"region-east",
            ValuePick::West => b"region-west",
            ValuePick::Empty => b"",
        }
    }
}

/// Tiny alphabet, short keys: forces shared paths, prefix chains and
/// re-insertion collisions. High bytes included to catch signed-comparison
/// mistakes in the packed binary search.
fn clustered_key() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop::sample::select(vec![b'a', b'b', b'c', 0x00, 0x7f, 0x80, 0xff]),
        0..6,
    )
}

/// Fixed-length keys over a tiny alphabet: prefix-free by construction.
fn fixed_key() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c']), 4)
}

/// Probes of any length over the same alphabet: misses, dead ends, and
/// extensions of prefix keys.
fn fst_probe() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c']), 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn proptest_vint_roundtrip(value in any::<i32>()) {
        let mut buf = ByteBuffer::new();
        let written = write_vint(&mut buf, value);
        prop_assert!((1..=5).contains(&written));
        let mut cur = Cursor::new(buf.as_slice());
        prop_assert_eq!(read_vint(&mut cur).unwrap(), value);
        prop_assert_eq!(cur.position(), written);
    }

    #[test]
    fn proptest_compiled_trie_matches_model(
        entries in prop::collection::vec(
            (clustered_key(), any::<ValuePick>(), any::<bool>()),
            1..32,
        ),
        probes in prop::collection::vec(clustered_key(), 0..16),
    ) {
        let mut dict = CompiledTrieDict::new();
        let mut reference = BasicTrieDict::new();
        let mut model = Model::default();
        for (key, value, is_prefix) in &entries {
            let k = Bytes::from(&key[..]);
            let v = Bytes::from(value.bytes());
            dict.put_key(k.clone(), v.clone(), *is_prefix).unwrap();
            reference.put_key(k, v, *is_prefix).unwrap();
            model.insert(key, value.bytes(), *is_prefix);
        }
        dict.compile();

        let queries = entries.iter().map(|(key, _, _)| key.clone()).chain(probes);
        for query in queries {
            let want = model.get(&query).map(Bytes::from);
            let q = Bytes::from(&query[..]);
            prop_assert_eq!(dict.get(&q).unwrap(), want.clone(), "query {:?}", q);
            prop_assert_eq!(reference.get(&q).unwrap(), want, "query {:?}", q);
        }
    }

    #[test]
    fn proptest_fst_matches_model_on_prefix_free_keys(
        entries in prop::collection::vec(
            (fixed_key(), any::<ValuePick>(), any::<bool>()),
            1..32,
        ),
        probes in prop::collection::vec(fst_probe(), 0..24),
    ) {
        let mut fst = FstDict::new();
        let mut trie = CompiledTrieDict::new();
        let mut model = Model::default();
        for (key, value, is_prefix) in &entries {
            let k = Bytes::from(&key[..]);
            let v = Bytes::from(value.bytes());
            fst.put_key(k.clone(), v.clone(), *is_prefix).unwrap();
            trie.put_key(k, v, *is_prefix).unwrap();
            model.insert(key, value.bytes(), *is_prefix);
        }
        fst.compile();
        trie.compile();

        let queries = entries.iter().map(|(key, _, _)| key.clone()).chain(probes);
        for query in queries {
            let want = model.get(&query).map(Bytes::from);
            let q = Bytes::from(&query[..]);
            prop_assert_eq!(fst.get(&q).unwrap(), want.clone(), "query {:?}", q);
            prop_assert_eq!(trie.get(&q).unwrap(), want, "query {:?}", q);
        }
    }

    #[test]
    fn proptest_lookup_is_pure(
        entries in prop::collection::vec((fixed_key(), any::<ValuePick>()), 1..16),
        query in fst_probe(),
    ) {
        let mut fst = FstDict::new();
        for (key, value) in &entries {
            fst.put(Bytes::from(&key[..]), Bytes::from(value.bytes())).unwrap();
        }
        fst.compile();
        let before = fst.packed_bytes().unwrap().to_vec();
        let q = Bytes::from(&query[..]);
        let first = fst.get(&q).unwrap();
        for _ in 0..8 {
            prop_assert_eq!(fst.get(&q).unwrap(), first.clone());
        }
        prop_assert_eq!(fst.packed_bytes().unwrap(), &before[..]);
    }
}
