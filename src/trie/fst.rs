//! Value-prefixed compiled FST.
//!
//! Values are split along edges during insertion: every node keeps the
//! longest common prefix of the values reachable through it, and pushes
//! displaced suffixes down to its children. Reading a key back means
//! concatenating the value fragments along its path. Keys that share
//! prefixes therefore share value-prefix storage, and subtrees that end up
//! structurally identical are deduplicated during serialization, collapsing
//! the trie into a minimal acyclic transducer.
//!
//! Packed layout:
//!
//! ```text
//! [0..4)  big-endian offset of the root node record
//! [4..)   node records, deepest BFS level first, suffix-deduplicated
//! ```
//!
//! Node record:
//!
//! ```text
//! flags      : 1 byte            0x01 key end, 0x02 prefix end,
//!                                0x04 value segment present
//! value      : VInt(len) ∥ bytes (iff 0x04)
//! child_count: VInt
//! edge_width : VInt              1 label byte + widest child-offset VInt
//! edges      : child_count × edge_width bytes, ascending label order
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::buffer::{ByteBuffer, Cursor};
use crate::bytes::Bytes;
use crate::dict::{CompiledDictionary, Dictionary};
use crate::error::{DictError, Result};
use crate::trie::{
    find_child, level_order, read_length_prefixed, read_root_offset, NodeId, ROOT_HEADER_LEN,
};
use crate::varint::{read_vint, vint_len, write_vint};

const FLAG_KEY_END: u8 = 0x01;
const FLAG_PREFIX_END: u8 = 0x02;
const FLAG_HAS_VALUE: u8 = 0x04;

struct Node {
    children: BTreeMap<u8, NodeId>,
    value: Option<Bytes>,
    is_key_end: bool,
    is_prefix_end: bool,
    depth: u32,
    buffer_offset: u32,
}

impl Node {
    fn new(depth: u32) -> Node {
        Node {
            children: BTreeMap::new(),
            value: None,
            is_key_end: false,
            is_prefix_end: false,
            depth,
            buffer_offset: 0,
        }
    }
}

/// Structural identity of a node at serialization time. Children are
/// identified by their already-assigned record offsets, so two equal
/// signatures describe byte-identical subtrees. Keying the dedup cache by
/// the full signature (not a hash of it) means a cache hit is an equality
/// hit; hash collisions cannot alias distinct subtrees.
#[derive(PartialEq, Eq, Hash)]
struct NodeSig {
    edges: Vec<(u8, u32)>,
    value: Bytes,
    depth: u32,
    is_key_end: bool,
    is_prefix_end: bool,
}

/// Statistics captured while compiling an [`FstDict`].
#[derive(Debug, Clone, Default)]
pub struct FstStats {
    /// Nodes in the pre-compile trie.
    pub node_count: usize,
    /// Node records actually written to the packed buffer.
    pub nodes_emitted: usize,
    /// Nodes aliased to an identical, already-emitted subtree.
    pub nodes_deduped: usize,
    /// Total packed size, header included.
    pub packed_bytes: usize,
}

/// A trie dictionary compiled into a packed FST with values distributed
/// along edges and equivalent suffix subtrees shared.
///
/// Mutable until [`compile`](CompiledDictionary::compile), queryable only
/// after.
pub struct FstDict {
    nodes: Vec<Node>,
    packed: Option<Vec<u8>>,
    stats: Option<FstStats>,
}

impl FstDict {
    /// New empty dictionary.
    pub fn new() -> FstDict {
        FstDict { nodes: vec![Node::new(0)], packed: None, stats: None }
    }

    /// The packed buffer, once compiled.
    pub fn packed_bytes(&self) -> Option<&[u8]> {
        self.packed.as_deref()
    }

    /// Compilation statistics. `None` before compilation and for loaded
    /// dictionaries, whose staging state never existed here.
    pub fn stats(&self) -> Option<&FstStats> {
        self.stats.as_ref()
    }

    /// Write the packed buffer verbatim to a file. No framing, magic
    /// number, or versioning: the file is exactly the buffer.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let packed = self.packed.as_deref().ok_or(DictError::InvalidState(
            "dictionary must be compiled before saving",
        ))?;
        fs::write(path, packed)?;
        Ok(())
    }

    /// Read a packed buffer written by [`save`](FstDict::save). The loaded
    /// dictionary is compiled and query-only.
    pub fn load(path: impl AsRef<Path>) -> Result<FstDict> {
        let packed = fs::read(path)?;
        Ok(FstDict { nodes: Vec::new(), packed: Some(packed), stats: None })
    }

    fn signature(&self, id: NodeId) -> NodeSig {
        let node = &self.nodes[id as usize];
        NodeSig {
            edges: node
                .children
                .iter()
                .map(|(&label, &child)| (label, self.nodes[child as usize].buffer_offset))
                .collect(),
            value: node.value.clone().unwrap_or_default(),
            depth: node.depth,
            is_key_end: node.is_key_end,
            is_prefix_end: node.is_prefix_end,
        }
    }

    /// Serialize one node, or alias it to an already-emitted identical
    /// subtree. Either way the node's child map is released.
    fn emit_node(&mut self, id: NodeId, out: &mut ByteBuffer, cache: &mut HashMap<NodeSig, u32>) {
        let sig = self.signature(id);
        if let Some(&offset) = cache.get(&sig) {
            let node = &mut self.nodes[id as usize];
            node.buffer_offset = offset;
            node.children = BTreeMap::new();
            return;
        }

        let record_offset = out.position() as u32;
        let node = &self.nodes[id as usize];
        let mut flags = 0u8;
        if node.is_key_end {
            flags |= FLAG_KEY_END;
        }
        if node.is_prefix_end {
            flags |= FLAG_PREFIX_END;
        }
        if !sig.value.is_empty() {
            flags |= FLAG_HAS_VALUE;
            out.write_u8(flags);
            write_vint(out, sig.value.len() as i32);
            out.write_slice(sig.value.as_slice());
        } else {
            out.write_u8(flags);
        }

        write_vint(out, sig.edges.len() as i32);
        let offset_width = sig
            .edges
            .iter()
            .map(|&(_, offset)| vint_len(offset as i32))
            .max()
            .unwrap_or(1);
        write_vint(out, (offset_width + 1) as i32);
        for &(label, child_offset) in &sig.edges {
            out.write_u8(label);
            let used = write_vint(out, child_offset as i32);
            for _ in used..offset_width {
                out.write_u8(0x00);
            }
        }

        let node = &mut self.nodes[id as usize];
        node.buffer_offset = record_offset;
        node.children = BTreeMap::new();
        cache.insert(sig, record_offset);
    }
}

impl Default for FstDict {
    fn default() -> Self {
        FstDict::new()
    }
}

impl Dictionary for FstDict {
    fn put_key(&mut self, key: Bytes, value: Bytes, is_prefix_key: bool) -> Result<()> {
        if self.packed.is_some() {
            return Err(DictError::InvalidState(
                "cannot insert after the dictionary is compiled",
            ));
        }

        let mut remainder = value;
        let mut node = 0usize;
        for (depth, &b) in key.as_slice().iter().enumerate() {
            // Distribute before descending: this node keeps the common
            // prefix of its value and the incoming remainder, children
            // inherit the displaced suffix.
            match self.nodes[node].value.clone() {
                None => {
                    self.nodes[node].value = Some(remainder);
                    remainder = Bytes::empty();
                }
                Some(existing) => {
                    let common = remainder.common_prefix(&existing);
                    let pushdown = existing.suffix(common.len());
                    if !pushdown.is_empty() {
                        let children: Vec<NodeId> =
                            self.nodes[node].children.values().copied().collect();
                        for child in children {
                            let child = child as usize;
                            let old = self.nodes[child].value.take().unwrap_or_default();
                            self.nodes[child].value = Some(old.prepend(&pushdown));
                        }
                    }
                    remainder = remainder.suffix(common.len());
                    self.nodes[node].value = Some(common);
                }
            }

            node = match self.nodes[node].children.get(&b).copied() {
                Some(child) => child as usize,
                None => {
                    let child = self.nodes.len() as NodeId;
                    self.nodes.push(Node::new(depth as u32 + 1));
                    self.nodes[node].children.insert(b, child);
                    child as usize
                }
            };
        }

        self.nodes[node].value = Some(remainder);
        self.nodes[node].is_key_end = true;
        self.nodes[node].is_prefix_end = is_prefix_key;
        Ok(())
    }

    fn get(&self, key: &Bytes) -> Result<Option<Bytes>> {
        let packed = self.packed.as_deref().ok_or(DictError::InvalidState(
            "dictionary must be compiled before lookups",
        ))?;
        let mut cur = Cursor::new(packed);
        cur.seek(read_root_offset(packed)?)?;

        // Value fragments concatenate along the path; `matched` snapshots
        // the accumulator at the deepest prefix-end node seen.
        let mut acc = Bytes::empty();
        let mut matched: Option<Bytes> = None;
        let mut key_idx = 0;
        while key_idx < key.len() {
            let flags = cur.read_u8()?;
            if flags & FLAG_HAS_VALUE != 0 {
                let segment = read_length_prefixed(&mut cur)?;
                acc = acc.append(&segment);
            }
            if flags & FLAG_PREFIX_END != 0 {
                matched = Some(acc.clone());
            }
            let child_count = read_vint(&mut cur)?;
            let edge_width = read_vint(&mut cur)?;
            match find_child(&mut cur, key.byte_at(key_idx), child_count, edge_width)? {
                Some(next) => {
                    cur.seek(next)?;
                    key_idx += 1;
                }
                None => break,
            }
        }

        if key_idx == key.len() {
            let flags = cur.read_u8()?;
            if flags & FLAG_KEY_END != 0 {
                // Exact match: the full path concatenation is the answer.
                if flags & FLAG_HAS_VALUE != 0 {
                    let segment = read_length_prefixed(&mut cur)?;
                    acc = acc.append(&segment);
                }
                matched = Some(acc);
            } else if flags & FLAG_PREFIX_END != 0 && flags & FLAG_HAS_VALUE != 0 {
                let segment = read_length_prefixed(&mut cur)?;
                acc = acc.append(&segment);
                matched = Some(acc);
            }
        }

        Ok(matched)
    }
}

impl CompiledDictionary for FstDict {
    fn compile(&mut self) {
        if self.packed.is_some() {
            return;
        }

        let mut suffix_cache: HashMap<NodeSig, u32> = HashMap::new();
        let mut out = ByteBuffer::new();
        out.write_slice(&[0u8; ROOT_HEADER_LEN]);

        let levels =
            level_order(|id| self.nodes[id as usize].children.values().copied().collect());
        for level in levels.iter().rev() {
            for &id in level {
                self.emit_node(id, &mut out, &mut suffix_cache);
            }
        }

        out.truncate_to_position();
        let root_offset = self.nodes[0].buffer_offset;
        out.set_position(0);
        out.write_slice(&root_offset.to_be_bytes());
        let packed = out.into_bytes();
        self.stats = Some(FstStats {
            node_count: self.nodes.len(),
            nodes_emitted: suffix_cache.len(),
            nodes_deduped: self.nodes.len() - suffix_cache.len(),
            packed_bytes: packed.len(),
        });
        self.packed = Some(packed);

        // The arena and suffix cache are transient; only the packed buffer
        // survives.
        self.nodes = Vec::new();
    }
}
