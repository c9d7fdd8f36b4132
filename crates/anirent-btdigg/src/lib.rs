//! BTDigg torrent index search provider.
//!
//! Implements the [`SearchProvider`](anirent_core::SearchProvider) port by
//! scraping `btdig.com` result pages.

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

mod config;
mod error;
mod http;
mod page;
mod provider;

pub use config::{BtDiggConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use error::{BtDiggError, BtDiggResult};
pub use http::{PageFetcher, ReqwestFetcher};
pub use page::{ResultsPage, parse_page};
pub use provider::BtDiggProvider;
