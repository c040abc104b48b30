//! Feed assembly and RSS 2.0 rendering.

mod assembler;
mod render;

pub use assembler::assemble;
pub use render::{to_channel, to_xml, RSS_CONTENT_TYPE};
