//! Search inputs and outputs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::resolution::{ContainerFormat, Resolution};

/// A search request: one title, searched across a set of resolutions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Title to search for.
    pub name: String,
    /// Requested quality variants. Duplicates collapse.
    pub resolutions: BTreeSet<Resolution>,
}

impl SearchQuery {
    /// Create a query for `name` across the given resolutions.
    pub fn new(name: impl Into<String>, resolutions: impl IntoIterator<Item = Resolution>) -> Self {
        Self {
            name: name.into(),
            resolutions: resolutions.into_iter().collect(),
        }
    }

    /// Provider query string for one resolution of this search.
    #[must_use]
    pub fn provider_query(&self, resolution: Resolution) -> String {
        format!("[SubsPlease] {} ({resolution})", self.name)
    }
}

/// An unparsed hit produced by a search provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResult {
    /// Release name as displayed by the provider.
    pub display_name: String,
    /// Locator link (magnet or URL) for retrieving the content.
    pub locator: String,
}

impl RawResult {
    /// Create a raw result.
    pub fn new(display_name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            locator: locator.into(),
        }
    }
}

/// A single episode reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Episode {
    /// Season number.
    pub season: u32,
    /// Episode number within the season.
    pub number: u32,
}

impl Episode {
    /// Create an episode reference.
    pub const fn new(season: u32, number: u32) -> Self {
        Self { season, number }
    }
}

/// Whether a release is a single episode or a whole-season batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReleaseDetails {
    /// One episode.
    Episode(Episode),
    /// A season batch with its episodes in order.
    Season {
        /// Season number.
        number: u32,
        /// Episodes contained in the batch, ascending.
        episodes: Vec<Episode>,
    },
}

/// A parsed search result, ready to be handed to the downloader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredResult {
    /// Show title.
    pub title: String,
    /// Video resolution.
    pub resolution: Resolution,
    /// Container format of the video file.
    #[serde(default)]
    pub format: ContainerFormat,
    /// Episode or season details.
    pub details: ReleaseDetails,
    /// Locator link copied from the raw result.
    #[serde(default)]
    pub locator: String,
}

impl StructuredResult {
    /// Short label for logs: `"episode"` or `"season"`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self.details {
            ReleaseDetails::Episode(_) => "episode",
            ReleaseDetails::Season { .. } => "season",
        }
    }

    /// Attach the locator of the raw result this was parsed from.
    #[must_use]
    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = locator.into();
        self
    }
}
