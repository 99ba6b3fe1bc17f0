//! Binary VDF encoding.

use super::node::{Node, VdfMap, MARKER_INT32, MARKER_MAP, MARKER_MAP_END, MARKER_STRING};
use crate::{Result, ShortcutError};

/// Encode a root map into a binary VDF document.
///
/// Output depends only on the tree: entries are written in map order, so the
/// same tree always yields the same bytes. Keys and string values containing
/// a NUL byte cannot be represented in the format and are rejected.
pub fn encode(root: &VdfMap) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(estimate_len(root));
    write_map_body(root, &mut out)?;
    Ok(out)
}

fn write_map_body(map: &VdfMap, out: &mut Vec<u8>) -> Result<()> {
    for (key, node) in map.iter() {
        match node {
            Node::Map(child) => {
                out.push(MARKER_MAP);
                write_cstr(key, "key", out)?;
                write_map_body(child, out)?;
            }
            Node::Str(value) => {
                out.push(MARKER_STRING);
                write_cstr(key, "key", out)?;
                write_cstr(value, key, out)?;
            }
            Node::Int32(value) => {
                out.push(MARKER_INT32);
                write_cstr(key, "key", out)?;
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
    }
    out.push(MARKER_MAP_END);
    Ok(())
}

fn write_cstr(s: &str, field: &str, out: &mut Vec<u8>) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(ShortcutError::validation(
            field,
            format!("contains a NUL byte: {:?}", s),
        ));
    }
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    Ok(())
}

fn estimate_len(map: &VdfMap) -> usize {
    map.iter()
        .map(|(key, node)| {
            2 + key.len()
                + match node {
                    Node::Map(child) => estimate_len(child),
                    Node::Str(value) => value.len() + 1,
                    Node::Int32(_) => 4,
                }
        })
        .sum::<usize>()
        + 1
}
