//! Binary VDF codec.
//!
//! Valve's binary key-value format as used by `shortcuts.vdf`:
//!
//! - map: `0x00`, key, `0x00`, children..., `0x08`
//! - string: `0x01`, key, `0x00`, value, `0x00`
//! - int32: `0x02`, key, `0x00`, 4 bytes little-endian
//!
//! A document is an unnamed root map, closed by a final `0x08`.

mod node;
mod reader;
mod writer;

pub use node::{Node, VdfMap, MARKER_INT32, MARKER_MAP, MARKER_MAP_END, MARKER_STRING};
pub use reader::decode;
pub use writer::encode;
