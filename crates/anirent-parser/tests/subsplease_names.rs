//! Parsing of real release names as they appear on torrent indexes.

use anirent_parser::{NameParser, ParseError, SubsPleaseParser};
use anirent_core::{Episode, ReleaseDetails, Resolution};
use tokio_test::{assert_err, assert_ok};

#[test]
fn parses_release_names_seen_on_indexes() {
    let parser = SubsPleaseParser::new();

    let cases = [
        (
            "[SubsPlease] Spy x Family - 12 (720p) [5B3E0D42].mkv",
            "Spy x Family",
            Resolution::P720,
            12,
        ),
        (
            "[SubsPlease] Mushoku Tensei S2 - 01 (480p) [D1A5C7F3].mkv",
            "Mushoku Tensei S2",
            Resolution::P480,
            1,
        ),
        (
            "[SubsPlease]\tBocchi the Rock!  -  03 (1080p) [ABCDEF01].mkv",
            "Bocchi the Rock!",
            Resolution::P1080,
            3,
        ),
    ];

    for (raw, title, resolution, number) in cases {
        let result = assert_ok!(parser.parse(raw));
        assert_eq!(result.title, title, "{raw}");
        assert_eq!(result.resolution, resolution, "{raw}");
        assert_eq!(result.details, ReleaseDetails::Episode(Episode::new(1, number)));
    }
}

#[test]
fn parses_a_full_cour_batch() {
    let parser = SubsPleaseParser::new();
    let result = assert_ok!(parser.parse("[SubsPlease] Frieren (01-28) (1080p) [Batch]"));

    let ReleaseDetails::Season { number, episodes } = result.details else {
        panic!("expected a season batch");
    };
    assert_eq!(number, 1);
    assert_eq!(episodes.len(), 28);
    assert_eq!(episodes.first(), Some(&Episode::new(1, 1)));
    assert_eq!(episodes.last(), Some(&Episode::new(1, 28)));
}

#[test]
fn hyphenated_titles_are_not_supported() {
    let parser = SubsPleaseParser::new();
    let err = assert_err!(parser.parse("[SubsPlease] Re-Zero - 01 (1080p) [ABCD].mkv"));
    assert!(matches!(err, ParseError::InvalidNumber(ref n) if n == "Zero"));
}

#[test]
fn other_release_groups_with_the_same_layout_parse() {
    let parser = SubsPleaseParser::new();
    let result = assert_ok!(parser.parse("[HorribleSubs] Show - 02 (720p) [X].mkv"));
    assert_eq!(result.title, "Show");
}

#[test]
fn absurd_batch_ranges_are_parse_errors() {
    let parser = SubsPleaseParser::new();
    let err = assert_err!(parser.parse("[SubsPlease] Show (1-4294967295) (1080p) [Batch]"));
    assert_eq!(
        err,
        ParseError::InvalidEpisodeRange {
            first: 1,
            last: u32::MAX,
        }
    );
}
