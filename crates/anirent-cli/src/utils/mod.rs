//! Filesystem and input helpers.

pub mod files;

pub use files::{move_content, read_result};
