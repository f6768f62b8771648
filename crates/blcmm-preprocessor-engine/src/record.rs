//! Transcoding of a single BLCMM record (one line) into XML.
//!
//! A record is an opening tag with optional attributes, optional text and an
//! optional closing tag, all on one line. Tag and attribute syntax is copied
//! verbatim; attribute values and element text are escaped.

use memchr::{memchr, memchr2, memmem};

use crate::error::{ParseError, ParseErrorKind};
use crate::escape::push_escaped;

/// Line that ends the BLCMM section. Copied through verbatim.
pub const TERMINATOR: &[u8] = b"</BLCMM>";

/// Prefix of the filter tool warning line, which is dropped.
pub const WARNING_PREFIX: &[u8] = b"#<!!!";

/// How a line should be handled before any markup parsing happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Terminator,
    Warning,
    Record,
}

pub fn classify(line: &[u8]) -> LineKind {
    if line.starts_with(TERMINATOR) {
        LineKind::Terminator
    } else if line.starts_with(WARNING_PREFIX) {
        LineKind::Warning
    } else {
        LineKind::Record
    }
}

/// Transcodes one record, appending the XML to `out`.
///
/// On error nothing is guaranteed about what was appended; callers should
/// discard `out`.
pub fn transcode_record(line: &[u8], out: &mut Vec<u8>) -> Result<(), ParseError> {
    let fail = |kind| ParseError::new(kind, line);

    let tag_start = memchr(b'<', line).ok_or_else(|| fail(ParseErrorKind::MissingOpeningTag))?;
    let tag_name_end = memchr2(b'>', b' ', &line[tag_start..])
        .map(|i| tag_start + i)
        .ok_or_else(|| fail(ParseErrorKind::UnterminatedOpeningTag))?;
    out.extend_from_slice(&line[tag_start..=tag_name_end]);

    let content_start = if line[tag_name_end] == b'>' {
        tag_name_end + 1
    } else {
        copy_attributes(line, tag_name_end + 1, out).map_err(fail)?
    };

    let tag_name = &line[tag_start + 1..tag_name_end];
    let closing_tag = closing_tag_for(tag_name);

    // Search from the end: the real closing tag is the last one on the line.
    // A match inside the opening tag still closes the element, with no text.
    if let Some(closing_start) = memmem::rfind(line, &closing_tag) {
        push_escaped(out, &line[content_start..closing_start.max(content_start)]);
        out.extend_from_slice(&closing_tag);
    }

    Ok(())
}

/// Walks the attribute list starting at `pos`, returning the index just past
/// the opening tag's closing `>`.
fn copy_attributes(
    line: &[u8],
    mut pos: usize,
    out: &mut Vec<u8>,
) -> Result<usize, ParseErrorKind> {
    loop {
        let delim = memchr2(b'"', b'>', &line[pos..])
            .map(|i| pos + i)
            .ok_or(ParseErrorKind::UnterminatedOpeningTag)?;
        out.extend_from_slice(&line[pos..=delim]);
        if line[delim] == b'>' {
            return Ok(delim + 1);
        }

        let value_end = find_value_end(line, delim)?;
        push_escaped(out, &line[delim + 1..value_end]);
        out.push(b'"');
        pos = value_end + 1;
    }
}

/// Finds the `"` closing the value opened at `open_quote`. A quote directly
/// preceded by `\` belongs to the value.
fn find_value_end(line: &[u8], open_quote: usize) -> Result<usize, ParseErrorKind> {
    let mut candidate = open_quote;
    loop {
        candidate = memchr(b'"', &line[candidate + 1..])
            .map(|i| candidate + 1 + i)
            .ok_or(ParseErrorKind::UnterminatedAttributeValue)?;
        if line[candidate - 1] != b'\\' {
            return Ok(candidate);
        }
    }
}

fn closing_tag_for(tag_name: &[u8]) -> Vec<u8> {
    let mut tag = Vec::with_capacity(tag_name.len() + 3);
    tag.extend_from_slice(b"</");
    tag.extend_from_slice(tag_name);
    tag.push(b'>');
    tag
}
