//! Recursive-descent parser for `SubsPlease` release names.
//!
//! ```text
//! result   = "[" IDENT "]" title ( episode | season ) resolution label ext?
//! title    = IDENT*
//! episode  = "-" NUMBER
//! season   = "(" NUMBER "-" NUMBER ")"
//! resolution = "(" IDENT ")"
//! label    = "[" IDENT "]"
//! ext      = "." IDENT              (episodes only)
//! ```

use anirent_core::{
    ContainerFormat, Episode, NameParser, ParseError, ReleaseDetails, Resolution,
    StructuredResult,
};

use crate::scanner::{Item, Scanner, Token};

/// Season number assigned to every release; `SubsPlease` names carry none.
const DEFAULT_SEASON: u32 = 1;

/// Widest episode range a batch name may span.
pub const MAX_BATCH_EPISODES: u32 = 2000;

/// Parser for `SubsPlease` torrent names.
///
/// Stateless; one instance can be shared across searches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsPleaseParser;

impl SubsPleaseParser {
    /// Create a parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl NameParser for SubsPleaseParser {
    fn parse(&self, raw: &str) -> Result<StructuredResult, ParseError> {
        let result = Parser::new(raw).parse_result();
        if let Err(err) = &result {
            tracing::trace!(target: "anirent.search", name = raw, error = %err, "parse failed");
        }
        result
    }
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    peeked: Option<Item<'a>>,
}

impl<'a> Parser<'a> {
    const fn new(src: &'a str) -> Self {
        Self {
            scanner: Scanner::new(src),
            peeked: None,
        }
    }

    fn next(&mut self) -> Item<'a> {
        self.peeked
            .take()
            .unwrap_or_else(|| self.scanner.next_item())
    }

    fn peek(&mut self) -> Item<'a> {
        if let Some(item) = self.peeked {
            return item;
        }
        let item = self.scanner.next_item();
        self.peeked = Some(item);
        item
    }

    fn expect(&mut self, token: Token, context: &'static str) -> Result<Item<'a>, ParseError> {
        let item = self.next();
        if item.token == token {
            Ok(item)
        } else {
            Err(unexpected(item, context, token.describe()))
        }
    }

    fn parse_result(mut self) -> Result<StructuredResult, ParseError> {
        self.expect(Token::LBrack, "release group label")?;
        self.expect(Token::Ident, "release group label")?;
        self.expect(Token::RBrack, "release group label")?;

        let title = self.parse_title();

        let item = self.next();
        let details = match item.token {
            Token::Hyphen => self.parse_episode()?,
            Token::LParen => self.parse_season()?,
            _ => return Err(unexpected(item, "title", "'-' or '('")),
        };

        let resolution = self.parse_resolution()?;

        self.expect(Token::LBrack, "unique label")?;
        self.expect(Token::Ident, "unique label")?;
        self.expect(Token::RBrack, "unique label")?;

        let format = match details {
            ReleaseDetails::Episode(_) => self.parse_extension()?,
            ReleaseDetails::Season { .. } => ContainerFormat::default(),
        };

        Ok(StructuredResult {
            title,
            resolution,
            format,
            details,
            locator: String::new(),
        })
    }

    fn parse_title(&mut self) -> String {
        let mut words = Vec::new();
        while self.peek().token == Token::Ident {
            words.push(self.next().text);
        }
        words.join(" ")
    }

    fn parse_episode(&mut self) -> Result<ReleaseDetails, ParseError> {
        let number = self.parse_number("episode number")?;
        Ok(ReleaseDetails::Episode(Episode::new(DEFAULT_SEASON, number)))
    }

    fn parse_season(&mut self) -> Result<ReleaseDetails, ParseError> {
        let first = self.parse_number("first episode of season")?;
        self.expect(Token::Hyphen, "season episode range")?;
        let last = self.parse_number("last episode of season")?;
        self.expect(Token::RParen, "season episode range")?;

        if last < first || last - first >= MAX_BATCH_EPISODES {
            return Err(ParseError::InvalidEpisodeRange { first, last });
        }

        let episodes = (first..=last)
            .map(|number| Episode::new(DEFAULT_SEASON, number))
            .collect();

        Ok(ReleaseDetails::Season {
            number: DEFAULT_SEASON,
            episodes,
        })
    }

    fn parse_number(&mut self, context: &'static str) -> Result<u32, ParseError> {
        let item = self.expect(Token::Ident, context)?;
        item.text
            .parse()
            .map_err(|_| ParseError::InvalidNumber(item.text.to_string()))
    }

    fn parse_resolution(&mut self) -> Result<Resolution, ParseError> {
        self.expect(Token::LParen, "resolution")?;
        let item = self.expect(Token::Ident, "resolution")?;
        let resolution = item
            .text
            .parse()
            .map_err(|_| ParseError::UnknownResolution(item.text.to_string()))?;
        self.expect(Token::RParen, "resolution")?;
        Ok(resolution)
    }

    fn parse_extension(&mut self) -> Result<ContainerFormat, ParseError> {
        self.expect(Token::Dot, "file extension")?;
        let item = self.expect(Token::Ident, "file extension")?;
        ContainerFormat::from_extension(item.text)
            .ok_or_else(|| ParseError::UnknownFormat(item.text.to_string()))
    }
}

fn unexpected(item: Item<'_>, context: &'static str, expected: &'static str) -> ParseError {
    ParseError::UnexpectedToken {
        context,
        expected,
        found: item.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<StructuredResult, ParseError> {
        SubsPleaseParser::new().parse(raw)
    }

    #[test]
    fn parses_a_single_episode() {
        let result = parse("[SubsPlease] Tonikaku Kawaii - 08 (1080p) [37FBE4D6].mkv").unwrap();

        assert_eq!(result.title, "Tonikaku Kawaii");
        assert_eq!(result.resolution, Resolution::P1080);
        assert_eq!(result.format, ContainerFormat::Mkv);
        assert_eq!(result.details, ReleaseDetails::Episode(Episode::new(1, 8)));
        assert!(result.locator.is_empty());
    }

    #[test]
    fn parses_a_season_batch() {
        let result = parse("[SubsPlease] Tonikaku Kawaii (01-03) (1080p) [Batch]").unwrap();

        assert_eq!(result.title, "Tonikaku Kawaii");
        assert_eq!(result.resolution, Resolution::P1080);
        assert_eq!(result.format, ContainerFormat::Mkv);
        assert_eq!(
            result.details,
            ReleaseDetails::Season {
                number: 1,
                episodes: vec![Episode::new(1, 1), Episode::new(1, 2), Episode::new(1, 3)],
            }
        );
    }

    #[test]
    fn single_episode_batch_is_inclusive() {
        let result = parse("[SubsPlease] Show (05-05) (720p) [Batch]").unwrap();
        match result.details {
            ReleaseDetails::Season { episodes, .. } => {
                assert_eq!(episodes, vec![Episode::new(1, 5)]);
            }
            other @ ReleaseDetails::Episode(_) => panic!("expected season, got {other:?}"),
        }
    }

    #[test]
    fn rejects_inverted_range() {
        let err = parse("[SubsPlease] Show (03-01) (720p) [Batch]").unwrap_err();
        assert_eq!(err, ParseError::InvalidEpisodeRange { first: 3, last: 1 });
    }

    #[test]
    fn batch_range_width_is_bounded() {
        let widest = format!("[SubsPlease] Show (1-{MAX_BATCH_EPISODES}) (720p) [Batch]");
        assert!(parse(&widest).is_ok());

        let too_wide = format!("[SubsPlease] Show (1-{}) (720p) [Batch]", MAX_BATCH_EPISODES + 1);
        assert_eq!(
            parse(&too_wide).unwrap_err(),
            ParseError::InvalidEpisodeRange {
                first: 1,
                last: MAX_BATCH_EPISODES + 1,
            }
        );
    }

    #[test]
    fn rejects_unknown_resolution() {
        let err = parse("[SubsPlease] Show - 01 (999p) [ABCD].mkv").unwrap_err();
        assert_eq!(err, ParseError::UnknownResolution("999p".to_string()));
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = parse("[SubsPlease] Show - 01 (720p) [ABCD].mp4").unwrap_err();
        assert_eq!(err, ParseError::UnknownFormat("mp4".to_string()));
    }

    #[test]
    fn rejects_non_numeric_episode() {
        let err = parse("[SubsPlease] Show - OVA (720p) [ABCD].mkv").unwrap_err();
        assert_eq!(err, ParseError::InvalidNumber("OVA".to_string()));
    }

    #[test]
    fn episode_requires_extension() {
        let err = parse("[SubsPlease] Show - 01 (720p) [ABCD]").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                context: "file extension",
                expected: "'.'",
                found: "EOF".to_string(),
            }
        );
    }

    #[test]
    fn missing_group_label_is_rejected() {
        let err = parse("Tonikaku Kawaii - 08 (1080p) [37FBE4D6].mkv").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                context: "release group label",
                ..
            }
        ));
    }

    #[test]
    fn title_must_be_followed_by_episode_or_range() {
        let err = parse("[SubsPlease] Show [x]").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                context: "title",
                expected: "'-' or '('",
                found: "\"[\"".to_string(),
            }
        );
    }
}
