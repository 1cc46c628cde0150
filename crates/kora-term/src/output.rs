// SPDX-License-Identifier: MIT
//
// Frame output buffering.
//
//   AppendBuffer: accumulates every byte of one frame in memory so the
//   whole frame reaches the terminal in a single write() call. A partial
//   frame never shows up on screen, so there is nothing to flicker.
//
// Growth goes through `Vec::try_reserve`. If the allocator refuses, the
// append fails with `ErrorKind::OutOfMemory` and the frame render fails
// with it; a frame is never silently truncated.

use std::io::{self, Write};

// ─── AppendBuffer ────────────────────────────────────────────────────────────

/// A growable byte accumulator for one output frame.
///
/// Build the frame with [`append`](Self::append) (or through the
/// [`Write`] impl, which is what the [`ansi`](crate::ansi) helpers use),
/// then hand it to the terminal with [`flush_to`](Self::flush_to).
///
/// Invariant: [`len`](Self::len) is always the sum of the lengths of every
/// fragment appended since creation (or the last [`clear`](Self::clear)).
#[derive(Debug, Default)]
pub struct AppendBuffer {
    buf: Vec<u8>,
}

/// Initial capacity: a full 80×24 frame of content plus escapes.
const DEFAULT_CAPACITY: usize = 4096;

impl AppendBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Append `fragment` to the end of the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::OutOfMemory`] if the buffer cannot grow.
    /// The buffer is left unchanged in that case.
    pub fn append(&mut self, fragment: &[u8]) -> io::Result<()> {
        self.buf
            .try_reserve(fragment.len())
            .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
        self.buf.extend_from_slice(fragment);
        Ok(())
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the buffer and return its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write the whole buffer to `w` in one `write_all`, flush, and clear.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for AppendBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Nothing to do: bytes leave the buffer via flush_to().
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
