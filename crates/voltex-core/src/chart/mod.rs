//! Chart-related types and descriptor parsing.
//!
//! This module contains types for representing a single difficulty's chart:
//! - `Difficulty` - difficulty slots (NOV, ADV, EXH, MXM)
//! - `ChartField`, `AttributeUpdate` - recognized descriptor header fields
//! - `Chart`, `ChartRecord`, `ChartSource` - parsed chart and its snapshot form
//! - `rewrite_title` - in-place title rewrite of a descriptor file

mod difficulty;
mod field;
mod parser;
mod title;
mod types;

pub use difficulty::*;
pub use field::*;
pub use parser::{collect_sounds, decode_descriptor};
pub use title::*;
pub use types::*;
