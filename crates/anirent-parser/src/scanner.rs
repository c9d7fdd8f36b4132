//! Tokenizer for release names.
//!
//! Produces punctuation tokens for `()[]-.` and identifier tokens for every
//! other run of characters. Spaces and tabs separate tokens and are never
//! part of one.

use std::fmt;

/// Kinds of token produced by the [`Scanner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    Eof,
    LParen,
    RParen,
    LBrack,
    RBrack,
    Ident,
    Hyphen,
    Dot,
}

impl Token {
    pub(crate) const fn describe(self) -> &'static str {
        match self {
            Self::Eof => "end of input",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBrack => "'['",
            Self::RBrack => "']'",
            Self::Ident => "identifier",
            Self::Hyphen => "'-'",
            Self::Dot => "'.'",
        }
    }
}

/// A token together with the text it covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Item<'a> {
    pub token: Token,
    pub text: &'a str,
}

impl fmt::Display for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token {
            Token::Eof => f.write_str("EOF"),
            _ => write!(f, "{:?}", self.text),
        }
    }
}

const SEPARATORS: &[char] = &['(', ')', '[', ']', '-', '.', ' ', '\t'];

/// Single-pass scanner over a release name.
pub(crate) struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) const fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Next token; returns `Eof` forever once the input is exhausted.
    pub(crate) fn next_item(&mut self) -> Item<'a> {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start_matches([' ', '\t']);
        self.pos += rest.len() - trimmed.len();

        let Some(first) = trimmed.chars().next() else {
            return Item {
                token: Token::Eof,
                text: "",
            };
        };

        let token = match first {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBrack,
            ']' => Token::RBrack,
            '-' => Token::Hyphen,
            '.' => Token::Dot,
            _ => Token::Ident,
        };

        let len = match token {
            Token::Ident => trimmed.find(SEPARATORS).unwrap_or(trimmed.len()),
            _ => first.len_utf8(),
        };

        let text = &trimmed[..len];
        self.pos += len;
        Item { token, text }
    }
}
