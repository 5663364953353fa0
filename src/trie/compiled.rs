//! Value-dereferenced compiled trie.
//!
//! Keys are ingested into a mutable arena trie while values are interned
//! into a staging table; `compile` then packs everything into one
//! position-independent buffer:
//!
//! ```text
//! [0..4)    big-endian offset of the root node record
//! [4..4+V)  value table: each distinct value once, as VInt(len) ∥ bytes
//! [4+V..)   node records, deepest BFS level first
//! ```
//!
//! Node record:
//!
//! ```text
//! flags      : 1 byte            0x01 value present, 0x02 prefix end
//! value      : VInt              offset into the value table (iff 0x01)
//! child_count: VInt
//! edge_width : VInt              1 label byte + widest child-offset VInt
//! edges      : child_count × edge_width bytes, ascending label order
//! ```
//!
//! Children are serialized before their parents (reverse-BFS), so a parent
//! always knows its children's record offsets. Lookup walks the buffer with
//! a binary search over each node's fixed-width edge array and never touches
//! the mutable trie again.

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

const FLAG_HAS_VALUE: u8 = 0x01;
const FLAG_PREFIX_END: u8 = 0x02;

#[derive(Default)]
struct Node {
    children: BTreeMap<u8, NodeId>,
    value_offset: Option<u32>,
    is_prefix_end: bool,
    buffer_offset: u32,
}

/// Statistics captured while compiling a [`CompiledTrieDict`].
#[derive(Debug, Clone, Default)]
pub struct TrieDictStats {
    /// Nodes serialized into the packed buffer.
    pub node_count: usize,
    /// Distinct values interned in the value table.
    pub distinct_values: usize,
    /// Bytes occupied by the value table.
    pub value_table_bytes: usize,
    /// Total packed size, header included.
    pub packed_bytes: usize,
}

/// A trie dictionary compiled into a packed buffer with a shared value
/// table.
///
/// Equal values are stored once; trie nodes refer to them by offset. The
/// dictionary is mutable until [`compile`](CompiledDictionary::compile),
/// queryable only after.
pub struct CompiledTrieDict {
    nodes: Vec<Node>,
    value_offsets: HashMap<Bytes, u32>,
    value_table: ByteBuffer,
    packed: Option<Vec<u8>>,
    stats: Option<TrieDictStats>,
}

impl CompiledTrieDict {
    /// New empty dictionary.
    pub fn new() -> CompiledTrieDict {
        CompiledTrieDict {
            nodes: vec![Node::default()],
            value_offsets: HashMap::new(),
            value_table: ByteBuffer::new(),
            packed: None,
            stats: None,
        }
    }

    /// The packed buffer, once compiled.
    pub fn packed_bytes(&self) -> Option<&[u8]> {
        self.packed.as_deref()
    }

    /// Compilation statistics. `None` before compilation and for loaded
    /// dictionaries, whose staging state never existed here.
    pub fn stats(&self) -> Option<&TrieDictStats> {
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

    /// Read a packed buffer written by [`save`](CompiledTrieDict::save).
    /// The loaded dictionary is compiled and query-only.
    pub fn load(path: impl AsRef<Path>) -> Result<CompiledTrieDict> {
        let packed = fs::read(path)?;
        Ok(CompiledTrieDict {
            nodes: Vec::new(),
            value_offsets: HashMap::new(),
            value_table: ByteBuffer::new(),
            packed: Some(packed),
            stats: None,
        })
    }

    /// Intern `value` in the staging table, returning its offset.
    fn intern_value(&mut self, value: &Bytes) -> u32 {
        if let Some(&offset) = self.value_offsets.get(value) {
            return offset;
        }
        let offset = self.value_table.position() as u32;
        write_vint(&mut self.value_table, value.len() as i32);
        self.value_table.write_slice(value.as_slice());
        self.value_offsets.insert(value.clone(), offset);
        offset
    }

    /// Serialize one node at the output cursor and release its child map.
    fn emit_node(&mut self, id: NodeId, out: &mut ByteBuffer) {
        let node = &self.nodes[id as usize];
        let edges: Vec<(u8, u32)> = node
            .children
            .iter()
            .map(|(&label, &child)| (label, self.nodes[child as usize].buffer_offset))
            .collect();
        let value_offset = node.value_offset;
        let is_prefix_end = node.is_prefix_end;

        let record_offset = out.position() as u32;
        let mut flags = 0u8;
        if value_offset.is_some() {
            flags |= FLAG_HAS_VALUE;
        }
        if is_prefix_end {
            flags |= FLAG_PREFIX_END;
        }
        out.write_u8(flags);
        if let Some(offset) = value_offset {
            write_vint(out, offset as i32);
        }

        write_vint(out, edges.len() as i32);
        // Every edge gets the width of the widest child offset so the edge
        // array stays binary-searchable.
        let offset_width = edges
            .iter()
            .map(|&(_, offset)| vint_len(offset as i32))
            .max()
            .unwrap_or(1);
        write_vint(out, (offset_width + 1) as i32);
        for &(label, child_offset) in &edges {
            out.write_u8(label);
            let used = write_vint(out, child_offset as i32);
            for _ in used..offset_width {
                out.write_u8(0x00);
            }
        }

        let node = &mut self.nodes[id as usize];
        node.buffer_offset = record_offset;
        node.children = BTreeMap::new();
    }
}

impl Default for CompiledTrieDict {
    fn default() -> Self {
        CompiledTrieDict::new()
    }
}

impl Dictionary for CompiledTrieDict {
    fn put_key(&mut self, key: Bytes, value: Bytes, is_prefix_key: bool) -> Result<()> {
        if self.packed.is_some() {
            return Err(DictError::InvalidState(
                "cannot insert after the dictionary is compiled",
            ));
        }
        let value_offset = self.intern_value(&value);

        let mut node = 0usize;
        for &b in key.as_slice() {
            node = match self.nodes[node].children.get(&b).copied() {
                Some(child) => child as usize,
                None => {
                    let child = self.nodes.len() as NodeId;
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(b, child);
                    child as usize
                }
            };
        }
        self.nodes[node].value_offset = Some(value_offset);
        self.nodes[node].is_prefix_end = is_prefix_key;
        Ok(())
    }

    fn get(&self, key: &Bytes) -> Result<Option<Bytes>> {
        let packed = self.packed.as_deref().ok_or(DictError::InvalidState(
            "dictionary must be compiled before lookups",
        ))?;
        let mut cur = Cursor::new(packed);
        cur.seek(read_root_offset(packed)?)?;

        let mut value_offset: Option<i32> = None;
        let mut key_idx = 0;
        while key_idx < key.len() {
            let flags = cur.read_u8()?;
            if flags & FLAG_PREFIX_END != 0 {
                if flags & FLAG_HAS_VALUE == 0 {
                    return Err(DictError::Corrupt(
                        "prefix-end node without a value".to_string(),
                    ));
                }
                // Deepest prefix-end node seen so far wins.
                value_offset = Some(read_vint(&mut cur)?);
            } else if flags & FLAG_HAS_VALUE != 0 {
                read_vint(&mut cur)?;
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
            // Walked the whole key; an exact binding here overrides any
            // prefix match recorded on the way down.
            let flags = cur.read_u8()?;
            if flags & FLAG_HAS_VALUE != 0 {
                value_offset = Some(read_vint(&mut cur)?);
            }
        }

        match value_offset {
            None => Ok(None),
            Some(offset) => {
                if offset < 0 {
                    return Err(DictError::Corrupt(format!(
                        "negative value offset {offset}"
                    )));
                }
                cur.seek(ROOT_HEADER_LEN + offset as usize)?;
                Ok(Some(read_length_prefixed(&mut cur)?))
            }
        }
    }
}

impl CompiledDictionary for CompiledTrieDict {
    fn compile(&mut self) {
        if self.packed.is_some() {
            return;
        }

        let mut out = ByteBuffer::with_capacity(ROOT_HEADER_LEN + self.value_table.len() * 2);
        out.write_slice(&[0u8; ROOT_HEADER_LEN]);
        out.append_buffer(&self.value_table);

        let levels =
            level_order(|id| self.nodes[id as usize].children.values().copied().collect());
        for level in levels.iter().rev() {
            for &id in level {
                self.emit_node(id, &mut out);
            }
        }

        out.truncate_to_position();
        let root_offset = self.nodes[0].buffer_offset;
        out.set_position(0);
        out.write_slice(&root_offset.to_be_bytes());
        let packed = out.into_bytes();
        self.stats = Some(TrieDictStats {
            node_count: self.nodes.len(),
            distinct_values: self.value_offsets.len(),
            value_table_bytes: self.value_table.len(),
            packed_bytes: packed.len(),
        });
        self.packed = Some(packed);

        // The staging state is transient; only the packed buffer survives.
        self.nodes = Vec::new();
        self.value_offsets = HashMap::new();
        self.value_table = ByteBuffer::new();
    }
}
