//! Variable-length integer codec.
//!
//! Little-endian 7-bit continuation encoding of `i32`:
//! - 0-127: 1 byte
//! - 128-16383: 2 bytes
//! - etc., up to 5 bytes for the full 32-bit range
//!
//! Each non-final byte has its high bit set. The encoder works on the
//! two's-complement bit pattern with logical shifts, so any negative value
//! occupies all 5 bytes. Offsets and lengths in packed dictionaries are
//! non-negative, which keeps the hot path at 1-3 bytes.

use crate::buffer::{ByteBuffer, Cursor};
use crate::error::{DictError, Result};

const CONTINUATION_BIT: u8 = 0x80;
const PAYLOAD_MASK: u32 = 0x7f;

/// Encode `value` at the buffer's cursor. Returns the number of bytes
/// written (1 to 5).
pub fn write_vint(buf: &mut ByteBuffer, value: i32) -> usize {
    let mut v = value as u32;
    let mut count = 1;
    while v & !PAYLOAD_MASK != 0 {
        buf.write_u8((v & PAYLOAD_MASK) as u8 | CONTINUATION_BIT);
        v >>= 7;
        count += 1;
    }
    buf.write_u8(v as u8);
    count
}

/// Number of bytes `value` would occupy, without encoding it.
pub fn vint_len(value: i32) -> usize {
    let mut v = value as u32;
    let mut count = 1;
    while v & !PAYLOAD_MASK != 0 {
        v >>= 7;
        count += 1;
    }
    count
}

/// Decode a value at the cursor. A run of more than 5 bytes cannot come
/// from the encoder and is reported as corruption.
pub fn read_vint(cur: &mut Cursor<'_>) -> Result<i32> {
    let mut value = 0u32;
    let mut shift = 0;
    loop {
        let byte = cur.read_u8()?;
        if byte & CONTINUATION_BIT == 0 {
            value |= (byte as u32) << shift;
            return Ok(value as i32);
        }
        value |= (byte as u32 & PAYLOAD_MASK) << shift;
        shift += 7;
        if shift > 28 {
            return Err(DictError::Corrupt("VInt runs past 5 bytes".to_string()));
        }
    }
}
