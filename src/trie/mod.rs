//! Trie dictionaries: an uncompiled reference trie and two compiled,
//! packed-buffer variants.
//!
//! Both compiled variants share the same skeleton: keys are ingested into a
//! mutable arena trie, then `compile` serializes the trie bottom-up into a
//! single position-independent byte buffer that lookups walk with a binary
//! search over fixed-width edge records. They differ in where values live:
//!
//! - [`CompiledTrieDict`]: values are interned into a table at the front of
//!   the buffer; node records hold offsets into it.
//! - [`FstDict`]: values are split along edges so shared key prefixes share
//!   value prefixes, and structurally identical suffix subtrees are
//!   deduplicated during serialization.

mod basic;
mod compiled;
mod dereferenced;
mod fst;

pub use basic::BasicTrieDict;
pub use compiled::{CompiledTrieDict, TrieDictStats};
pub use dereferenced::DereferencedTrieDict;
pub use fst::{FstDict, FstStats};

use crate::buffer::Cursor;
use crate::bytes::Bytes;
use crate::error::{DictError, Result};
use crate::varint::read_vint;

/// Index of a node in a mutable trie arena.
pub(crate) type NodeId = u32;

/// Byte length of the big-endian root-offset header.
pub(crate) const ROOT_HEADER_LEN: usize = 4;

/// Partition the arena trie into BFS levels, root level first. Emission
/// walks the result in reverse so every child is serialized before its
/// parent needs its offset.
pub(crate) fn level_order(children_of: impl Fn(NodeId) -> Vec<NodeId>) -> Vec<Vec<NodeId>> {
    let mut levels = Vec::new();
    let mut current = vec![0];
    while !current.is_empty() {
        let next = current.iter().flat_map(|&id| children_of(id)).collect();
        levels.push(current);
        current = next;
    }
    levels
}

/// Decode the root node offset from the packed buffer's header.
pub(crate) fn read_root_offset(packed: &[u8]) -> Result<usize> {
    if packed.len() < ROOT_HEADER_LEN {
        return Err(DictError::Corrupt(
            "buffer shorter than root-offset header".to_string(),
        ));
    }
    Ok(u32::from_be_bytes(packed[..ROOT_HEADER_LEN].try_into().unwrap()) as usize)
}

/// Binary search the edge array that starts at the cursor for `target`.
///
/// Each edge record is exactly `edge_width` bytes: one label byte followed
/// by the child offset as a zero-padded VInt. Labels are ordered by
/// unsigned byte value, and the comparison here is unsigned to match.
/// Returns the child's record offset, or `None` if no edge carries the
/// label.
pub(crate) fn find_child(
    cur: &mut Cursor<'_>,
    target: u8,
    child_count: i32,
    edge_width: i32,
) -> Result<Option<usize>> {
    if child_count < 0 {
        return Err(DictError::Corrupt(format!(
            "negative child count {child_count}"
        )));
    }
    if edge_width < 2 {
        return Err(DictError::Corrupt(format!(
            "edge width {edge_width} below minimum"
        )));
    }
    let edges_base = cur.position();
    let width = edge_width as usize;

    let mut lo = 0;
    let mut hi = child_count as usize;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        cur.seek(edges_base + mid * width)?;
        let label = cur.read_u8()?;
        if label < target {
            lo = mid + 1;
        } else if label > target {
            hi = mid;
        } else {
            let offset = read_vint(cur)?;
            if offset < 0 {
                return Err(DictError::Corrupt(format!(
                    "negative child offset {offset}"
                )));
            }
            return Ok(Some(offset as usize));
        }
    }
    Ok(None)
}

/// Read a `VInt(length) ∥ bytes` segment at the cursor.
pub(crate) fn read_length_prefixed(cur: &mut Cursor<'_>) -> Result<Bytes> {
    let len = read_vint(cur)?;
    if len < 0 {
        return Err(DictError::Corrupt(format!("negative value length {len}")));
    }
    Ok(Bytes::from(cur.read_slice(len as usize)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ByteBuffer;
    use crate::varint::write_vint;

    fn edge_array(edges: &[(u8, i32)], edge_width: usize) -> Vec<u8> {
        let mut buf = ByteBuffer::new();
        for &(label, offset) in edges {
            buf.write_u8(label);
            let used = write_vint(&mut buf, offset);
            for _ in used..edge_width - 1 {
                buf.write_u8(0);
            }
        }
        buf.into_bytes()
    }

    #[test]
    fn test_find_child_hits_every_edge() {
        let edges = [(b'a', 7), (b'k', 300), (b'z', 90_000)];
        let bytes = edge_array(&edges, 4);
        for &(label, offset) in &edges {
            let mut cur = Cursor::new(&bytes);
            let found = find_child(&mut cur, label, edges.len() as i32, 4).unwrap();
            assert_eq!(found, Some(offset as usize));
        }
    }

    #[test]
    fn test_find_child_misses() {
        let bytes = edge_array(&[(b'b', 1), (b'd', 2)], 2);
        for probe in [b'a', b'c', b'e'] {
            let mut cur = Cursor::new(&bytes);
            assert_eq!(find_child(&mut cur, probe, 2, 2).unwrap(), None);
        }
        let mut cur = Cursor::new(&bytes);
        assert_eq!(find_child(&mut cur, b'b', 0, 2).unwrap(), None);
    }

    #[test]
    fn test_find_child_orders_high_bytes_unsigned() {
        // 0x7f sorts before 0x80 and 0xff; a signed comparison would put
        // the high-bit labels first and break the search.
        let bytes = edge_array(&[(0x01, 1), (0x7f, 2), (0x80, 3), (0xff, 4)], 2);
        for (probe, want) in [(0x01u8, 1), (0x7f, 2), (0x80, 3), (0xff, 4)] {
            let mut cur = Cursor::new(&bytes);
            assert_eq!(find_child(&mut cur, probe, 4, 2).unwrap(), Some(want));
        }
    }

    #[test]
    fn test_find_child_rejects_bad_geometry() {
        let bytes = edge_array(&[(b'a', 1)], 2);
        let mut cur = Cursor::new(&bytes);
        assert!(find_child(&mut cur, b'a', -1, 2).is_err());
        let mut cur = Cursor::new(&bytes);
        assert!(find_child(&mut cur, b'a', 1, 1).is_err());
    }

    #[test]
    fn test_read_root_offset_requires_header() {
        assert!(read_root_offset(&[0, 0]).is_err());
        assert_eq!(read_root_offset(&[0, 0, 1, 2, 9, 9]).unwrap(), 0x0102);
    }
}
