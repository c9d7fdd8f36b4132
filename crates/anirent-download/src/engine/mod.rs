//! Download engine adapters.

mod http;

pub use http::HttpEngine;
