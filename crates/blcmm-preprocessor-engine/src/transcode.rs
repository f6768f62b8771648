use std::io::{BufRead, Write};

use crate::error::TranscodeError;
use crate::record::{LineKind, classify, transcode_record};

/// Counters describing a successful transcode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscodeSummary {
    /// Lines consumed from the input, including the terminator.
    pub lines_read: usize,
    /// Records written to the output, not counting the terminator.
    pub records_written: usize,
    /// Filter tool warning lines that were dropped.
    pub warnings_skipped: usize,
}

/// Transcodes BLCMM markup from `input` into XML on `output`.
///
/// Reads one record per line and writes each transcoded record followed by a
/// newline. Stops after copying the `</BLCMM>` line. Reaching the end of
/// `input` before that line is an error. The streams stay owned by the caller;
/// `output` is flushed but not closed.
pub fn transcode<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
) -> Result<TranscodeSummary, TranscodeError> {
    let mut summary = TranscodeSummary::default();
    let mut raw = Vec::new();
    let mut xml = Vec::new();

    loop {
        raw.clear();
        let read = input
            .read_until(b'\n', &mut raw)
            .map_err(TranscodeError::Read)?;
        if read == 0 {
            return Err(TranscodeError::UnexpectedEof);
        }
        summary.lines_read += 1;
        let line = trim_line_break(&raw);

        match classify(line) {
            LineKind::Terminator => {
                log::debug!("Reached terminator on line {}", summary.lines_read);
                write_line(&mut output, line)?;
                break;
            }
            LineKind::Warning => {
                log::debug!("Skipping warning on line {}", summary.lines_read);
                summary.warnings_skipped += 1;
            }
            LineKind::Record => {
                xml.clear();
                transcode_record(line, &mut xml)?;
                log::trace!(
                    "Line {}: {}",
                    summary.lines_read,
                    String::from_utf8_lossy(&xml)
                );
                write_line(&mut output, &xml)?;
                summary.records_written += 1;
            }
        }
    }

    output.flush().map_err(TranscodeError::Write)?;
    Ok(summary)
}

/// Convenience wrapper transcoding an in-memory document.
pub fn transcode_str(input: &str) -> Result<String, TranscodeError> {
    let mut out = Vec::with_capacity(input.len());
    transcode(input.as_bytes(), &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn write_line<W: Write>(output: &mut W, line: &[u8]) -> Result<(), TranscodeError> {
    output
        .write_all(line)
        .and_then(|()| output.write_all(b"\n"))
        .map_err(TranscodeError::Write)
}

fn trim_line_break(raw: &[u8]) -> &[u8] {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    line.strip_suffix(b"\r").unwrap_or(line)
}
