//! `anirent search` - in-process search printing a JSON array.

use anirent_core::{Resolution, SearchQuery};
use anyhow::Result;
use futures_util::StreamExt;

use crate::bootstrap::CliContext;

/// Resolution searched when none is given.
const DEFAULT_RESOLUTION: Resolution = Resolution::P1080;

/// Search for `name` and print every parsed result as one JSON array.
///
/// Results found before a failure are still printed.
pub async fn execute(ctx: &CliContext, name: String, resolutions: Vec<Resolution>) -> Result<()> {
    let resolutions = if resolutions.is_empty() {
        vec![DEFAULT_RESOLUTION]
    } else {
        resolutions
    };

    let mut stream = ctx.service.search(SearchQuery::new(name, resolutions));
    let mut results = Vec::new();
    let mut failure = None;

    while let Some(item) = stream.next().await {
        match item {
            Ok(result) => {
                tracing::info!(
                    target: "anirent.search",
                    name = %result.title,
                    resolution = %result.resolution,
                    kind = result.kind(),
                    locator = %result.locator,
                    "received search result"
                );
                results.push(result);
            }
            Err(err) => failure = Some(err),
        }
    }

    println!("{}", serde_json::to_string(&results)?);

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
