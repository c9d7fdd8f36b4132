//! Small pure helpers shared by adapters.

pub mod plex;

pub use plex::plex_file_name;
