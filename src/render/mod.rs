//! Output formats for merged outlines.

mod json;
mod text;

pub use json::{to_json, toc_to_json, JsonFormat};
pub use text::toc_to_text;
