//! Detection and manipulation of numbered sequences embedded in strings and
//! file paths, such as `frame.0001.exr`, `frame.0002.exr`, ...
//!
//! The core (`name`, `types`, `sequence`, `rename`) is pure string
//! processing. Only [`fs`] touches the filesystem.

mod consts;
pub mod error;
pub mod fs;
pub mod name;
pub mod rename;
pub mod sequence;
pub mod types;

pub use error::{Result, SequenceError};
pub use name::{parse_item, parse_pattern};
pub use rename::{Rename, RenamePlan, RenameTarget};
pub use sequence::{Catalog, Gaps, SequenceGroup, group_sequences};
pub use types::{Padding, PatternStyle, SequenceItem, SequenceKey};
