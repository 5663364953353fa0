//! Compression demo: 25,000 postal-code keys mapping to four regions.
//!
//! Run with `cargo run --example postal_codes --release`.

use compactdict::{Bytes, CompiledDictionary, CompiledTrieDict, Dictionary, FstDict};

const REGIONS: [&str; 4] = [
    "region-north",
    "region-south",
    "region-east",
    "region-west",
];

fn main() {
    let entries: Vec<(Bytes, Bytes)> = (0..25_000)
        .map(|i| {
            (
                Bytes::from(format!("{i:05}").into_bytes()),
                Bytes::from(REGIONS[i % 4]),
            )
        })
        .collect();
    let raw_size: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();

    println!("=== Dataset ===\n");
    println!("entries:   {}", entries.len());
    println!("raw bytes: {raw_size}\n");

    let mut trie = CompiledTrieDict::new();
    for (key, value) in &entries {
        trie.put(key.clone(), value.clone()).unwrap();
    }
    trie.compile();
    let trie_size = trie.packed_bytes().unwrap().len();

    let mut fst = FstDict::new();
    for (key, value) in &entries {
        fst.put(key.clone(), value.clone()).unwrap();
    }
    fst.compile();
    let fst_size = fst.packed_bytes().unwrap().len();

    println!("=== Packed sizes ===\n");
    println!(
        "value-dereferenced trie: {trie_size} bytes ({:.1}% of raw)",
        100.0 * trie_size as f64 / raw_size as f64
    );
    println!(
        "value-prefixed FST:      {fst_size} bytes ({:.1}% of raw)",
        100.0 * fst_size as f64 / raw_size as f64
    );
    println!("\ntrie stats: {:?}", trie.stats().unwrap());
    println!("fst stats:  {:?}", fst.stats().unwrap());

    println!("\n=== Lookups ===\n");
    for key in ["00042", "13370", "24999", "99999"] {
        println!("{key} -> {:?}", fst.get(&Bytes::from(key)).unwrap());
    }

    // Prefix keys: route whole key ranges to one answer.
    let mut router = FstDict::new();
    router.put_key(Bytes::from("0"), Bytes::from("zone-a"), true).unwrap();
    router.put_key(Bytes::from("00"), Bytes::from("zone-a-core"), true).unwrap();
    router.put_key(Bytes::from("1"), Bytes::from("zone-b"), true).unwrap();
    router.compile();

    println!("\n=== Prefix routing ===\n");
    for key in ["00042", "09999", "13370", "24999"] {
        println!("{key} -> {:?}", router.get(&Bytes::from(key)).unwrap());
    }
}
