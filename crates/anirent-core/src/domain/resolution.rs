//! Video quality variants and container formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Video resolution advertised in a release name (e.g. `1080p`, `4k`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    /// 360p.
    #[serde(rename = "360p")]
    P360,
    /// 480p.
    #[serde(rename = "480p")]
    P480,
    /// 720p.
    #[serde(rename = "720p")]
    P720,
    /// 1080p.
    #[serde(rename = "1080p")]
    P1080,
    /// 2160p.
    #[serde(rename = "2160p")]
    P2160,
    /// 4k.
    #[serde(rename = "4k")]
    K4,
}

impl Resolution {
    /// Every supported resolution, lowest first.
    pub const ALL: [Self; 6] = [
        Self::P360,
        Self::P480,
        Self::P720,
        Self::P1080,
        Self::P2160,
        Self::K4,
    ];

    /// The label used in release names and search queries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::P360 => "360p",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::P2160 => "2160p",
            Self::K4 => "4k",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a supported resolution label.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unsupported resolution: {0}")]
pub struct UnknownResolution(pub String);

impl FromStr for Resolution {
    type Err = UnknownResolution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownResolution(s.to_string()))
    }
}

/// Container format of the released video file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// Matroska.
    #[default]
    Mkv,
}

impl ContainerFormat {
    /// File extension without the leading dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mkv => "mkv",
        }
    }

    /// Look up a format by its file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "mkv" => Some(Self::Mkv),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
