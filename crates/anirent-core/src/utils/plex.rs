//! File naming for Plex media libraries.

use crate::domain::{ReleaseDetails, Resolution, StructuredResult};

/// Plex-style name for a downloaded release.
///
/// - Episode: `Tonikaku Kawaii - s01e08 (1080p).mkv`
/// - Season batch (a directory): `Tonikaku Kawaii - s01 (1080p)`
///
/// The result is always a single path component: path separators in the
/// title become `_`.
#[must_use]
pub fn plex_file_name(result: &StructuredResult) -> String {
    let resolution = plex_resolution(result.resolution);
    let title = file_safe(&result.title);
    match &result.details {
        ReleaseDetails::Episode(episode) => format!(
            "{title} - s{:02}e{:02} ({resolution}).{}",
            episode.season,
            episode.number,
            result.format.extension()
        ),
        ReleaseDetails::Season { number, .. } => {
            format!("{title} - s{number:02} ({resolution})")
        }
    }
}

fn file_safe(title: &str) -> String {
    title
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect()
}

fn plex_resolution(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::K4 => "4K",
        other => other.as_str(),
    }
}
