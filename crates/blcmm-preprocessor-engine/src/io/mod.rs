use crate::{TranscodeError, TranscodeSummary, transcode};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to transcode {path}: {source}")]
    Transcode {
        path: PathBuf,
        source: TranscodeError,
    },
}

/// Transcode the BLCMM file at `input` into an XML file at `output`
pub fn transcode_file(input: &Path, output: &Path) -> Result<TranscodeSummary, IoError> {
    if !input.exists() {
        return Err(IoError::NotFound(input.to_path_buf()));
    }
    let reader = BufReader::new(File::open(input)?);

    // Create parent directories if they don't exist
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(output)?);

    transcode(reader, writer).map_err(|source| IoError::Transcode {
        path: input.to_path_buf(),
        source,
    })
}

/// Transcode the BLCMM file at `input` and return the XML as a string
pub fn transcode_file_to_string(input: &Path) -> Result<String, IoError> {
    if !input.exists() {
        return Err(IoError::NotFound(input.to_path_buf()));
    }
    let reader = BufReader::new(File::open(input)?);
    let mut out = Vec::new();
    transcode(reader, &mut out).map_err(|source| IoError::Transcode {
        path: input.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
