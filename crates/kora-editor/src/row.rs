//! The loaded text row.
//!
//! Kora displays at most one row of text: the first line of the file named
//! on the command line. It is read once at startup and never changes. The
//! cardinality is explicit: callers hold an `Option<TextRow>`, not a list.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Errors from loading a row from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened.
    #[error("open file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file opened but reading its first line failed.
    #[error("read file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One immutable row of raw bytes.
///
/// Bytes, not `String`: the row is written to the terminal as-is and is
/// truncated to the screen width by byte count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    bytes: Box<[u8]>,
}

impl TextRow {
    /// Wrap `bytes` as a row.
    #[must_use]
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The row content.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// At most `width` leading bytes of the row.
    #[must_use]
    pub fn truncated(&self, width: usize) -> &[u8] {
        &self.bytes[..self.bytes.len().min(width)]
    }

    /// Read the first line from `reader`, without its trailing `\n` / `\r`.
    ///
    /// Returns `None` if the reader is empty.
    ///
    /// # Errors
    ///
    /// Propagates read errors.
    pub fn first_line(mut reader: impl BufRead) -> io::Result<Option<Self>> {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }
        Ok(Some(Self::new(line)))
    }

    /// Load the first line of the file at `path`.
    ///
    /// Returns `None` for an empty file.
    ///
    /// # Errors
    ///
    /// [`LoadError::Open`] if the file can't be opened, [`LoadError::Read`]
    /// if reading fails.
    pub fn load(path: &Path) -> Result<Option<Self>, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let row = Self::first_line(BufReader::new(file)).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            bytes = row.as_ref().map_or(0, Self::size),
            "loaded first line"
        );
        Ok(row)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
