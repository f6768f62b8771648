use std::fmt;
use thiserror::Error;

/// Which structural rule a malformed line broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The line has no `<` at all.
    MissingOpeningTag,
    /// The opening tag never reaches its closing `>`.
    UnterminatedOpeningTag,
    /// An attribute value opens with `"` but nothing closes it on the same line.
    UnterminatedAttributeValue,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ParseErrorKind::MissingOpeningTag => "couldn't find initial tag",
            ParseErrorKind::UnterminatedOpeningTag => "initial tag doesn't close",
            ParseErrorKind::UnterminatedAttributeValue => "attribute value doesn't close",
        };
        f.write_str(reason)
    }
}

/// A single line of BLCMM markup that could not be transcoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to parse line ({kind}): {line}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The offending input line, line break stripped.
    pub line: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: &[u8]) -> Self {
        Self {
            kind,
            line: String::from_utf8_lossy(line).into_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("IO error while reading input: {0}")]
    Read(#[source] std::io::Error),
    #[error("IO error while reading input (eof): no </BLCMM> line before end of input")]
    UnexpectedEof,
    #[error("IO error while writing output: {0}")]
    Write(#[source] std::io::Error),
}

impl TranscodeError {
    /// True for every failure of the underlying streams, including a missing terminator.
    pub fn is_io(&self) -> bool {
        !matches!(self, TranscodeError::Parse(_))
    }

    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            TranscodeError::Parse(err) => Some(err.kind),
            _ => None,
        }
    }
}
