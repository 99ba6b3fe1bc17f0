//! Binary VDF decoding.

use super::node::{Node, VdfMap, MARKER_INT32, MARKER_MAP, MARKER_MAP_END, MARKER_STRING};
use crate::{Result, ShortcutError};

/// Deepest map nesting accepted before the input is rejected.
const MAX_DEPTH: usize = 64;

/// Decode a whole binary VDF document into its root map.
///
/// The root is closed by a final `0x08`; anything after it is rejected, as is
/// a buffer that ends before every map is closed. An empty buffer is *not* an
/// empty document: callers holding a missing or zero-length file substitute
/// an empty tree themselves.
pub fn decode(bytes: &[u8]) -> Result<VdfMap> {
    let mut reader = Reader { buf: bytes, pos: 0 };
    let root = reader.read_map_body(0)?;

    if reader.pos != bytes.len() {
        return Err(ShortcutError::malformed(
            reader.pos,
            format!(
                "{} trailing bytes after root terminator",
                bytes.len() - reader.pos
            ),
        ));
    }

    Ok(root)
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn read_map_body(&mut self, depth: usize) -> Result<VdfMap> {
        if depth > MAX_DEPTH {
            return Err(ShortcutError::malformed(
                self.pos,
                format!("maps nested deeper than {}", MAX_DEPTH),
            ));
        }

        let mut map = VdfMap::new();
        loop {
            let offset = self.pos;
            let marker = self.next_byte().ok_or_else(|| {
                ShortcutError::malformed(offset, "map not closed before end of input")
            })?;

            match marker {
                MARKER_MAP_END => return Ok(map),
                MARKER_MAP => {
                    let key = self.read_cstr()?;
                    let child = self.read_map_body(depth + 1)?;
                    map.insert(key, Node::Map(child));
                }
                MARKER_STRING => {
                    let key = self.read_cstr()?;
                    let value = self.read_cstr()?;
                    map.insert(key, Node::Str(value));
                }
                MARKER_INT32 => {
                    let key = self.read_cstr()?;
                    let value = self.read_i32()?;
                    map.insert(key, Node::Int32(value));
                }
                other => {
                    return Err(ShortcutError::malformed(
                        offset,
                        format!("unknown marker 0x{:02x}", other),
                    ));
                }
            }
        }
    }

    fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    fn read_cstr(&mut self) -> Result<String> {
        let start = self.pos;
        let rest = &self.buf[start..];
        let len = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            ShortcutError::malformed(start, "string not terminated before end of input")
        })?;

        let value = std::str::from_utf8(&rest[..len])
            .map_err(|e| ShortcutError::malformed(start, format!("string is not UTF-8: {}", e)))?
            .to_string();

        self.pos = start + len + 1;
        Ok(value)
    }

    fn read_i32(&mut self) -> Result<i32> {
        let start = self.pos;
        let raw: [u8; 4] = self
            .buf
            .get(start..start + 4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ShortcutError::malformed(start, "truncated 32-bit integer"))?;
        self.pos = start + 4;
        Ok(i32::from_le_bytes(raw))
    }
}
