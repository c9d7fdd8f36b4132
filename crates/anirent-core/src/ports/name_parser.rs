//! Release name parser port.

use thiserror::Error;

use crate::domain::StructuredResult;

/// Why a release name could not be parsed.
///
/// Parse failures are per item and never fatal to a search.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A token other than the one the grammar requires.
    #[error("unexpected token {found:?} while parsing {context}, expected {expected}")]
    UnexpectedToken {
        /// Grammar rule being parsed.
        context: &'static str,
        /// What the grammar required.
        expected: &'static str,
        /// What the input had.
        found: String,
    },

    /// A number that does not fit or is not numeric.
    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    /// A batch range that is inverted or wider than a batch can be.
    #[error("invalid episode range {first}-{last}")]
    InvalidEpisodeRange {
        /// First episode of the batch.
        first: u32,
        /// Last episode of the batch.
        last: u32,
    },

    /// A resolution outside the supported set.
    #[error("unknown resolution {0:?}")]
    UnknownResolution(String),

    /// A file extension outside the supported set.
    #[error("unknown file format {0:?}")]
    UnknownFormat(String),
}

/// Port for turning a provider display name into a structured result.
///
/// The returned result carries an empty locator; the caller attaches the
/// locator of the raw result it parsed.
pub trait NameParser: Send + Sync {
    /// Parse one release name.
    fn parse(&self, raw: &str) -> Result<StructuredResult, ParseError>;
}
