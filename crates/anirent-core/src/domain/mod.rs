//! Domain types shared by search and download.

mod resolution;
mod result;

pub use resolution::{ContainerFormat, Resolution, UnknownResolution};
pub use result::{Episode, RawResult, ReleaseDetails, SearchQuery, StructuredResult};
