//! Screen composition — one frame, one write.
//!
//! Each frame is rebuilt from scratch: hide the cursor, home it, draw every
//! row, put the cursor where the [`Cursor`] says, show it again. The bytes
//! are assembled in an [`AppendBuffer`] and reach the terminal in a single
//! `write_all`, so the user never sees half a frame.
//!
//! # Row layout
//!
//! ```text
//! row 0            loaded text (if any), cut to the screen width
//! row rows/2       ~ + padding + "Kora -- version x.y.z"   (centered)
//! every other row  ~
//! ```
//!
//! Every row ends with erase-to-end-of-line; rows are separated by CRLF
//! (none after the last, so the screen never scrolls).

use std::io::{self, Write};

use kora_term::ansi;
use kora_term::output::AppendBuffer;
use kora_term::terminal::Size;

use crate::cursor::Cursor;
use crate::row::TextRow;

/// The welcome banner drawn on the middle row.
pub const BANNER: &str = concat!("Kora -- version ", env!("CARGO_PKG_VERSION"));

/// Marker for rows past the end of the text.
pub const FILLER: &[u8] = b"~";

/// Builds and writes frames.
#[derive(Debug, Clone)]
pub struct ScreenComposer {
    banner: String,
}

impl ScreenComposer {
    /// A composer with the default [`BANNER`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_banner(BANNER)
    }

    /// A composer with a custom banner.
    #[must_use]
    pub fn with_banner(banner: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
        }
    }

    /// The banner text.
    #[must_use]
    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// Append one complete frame to `out`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `out` (for an [`AppendBuffer`], only a failed
    /// allocation).
    pub fn compose(
        &self,
        cursor: &Cursor,
        row: Option<&TextRow>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        ansi::cursor_hide(out)?;
        ansi::cursor_home(out)?;
        self.draw_rows(cursor.size(), row, out)?;
        ansi::cursor_to(out, cursor.x(), cursor.y())?;
        ansi::cursor_show(out)
    }

    /// Compose a frame and write it to `w` in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame can't be built or written.
    pub fn refresh(
        &self,
        cursor: &Cursor,
        row: Option<&TextRow>,
        w: &mut impl Write,
    ) -> io::Result<()> {
        let mut frame = AppendBuffer::new();
        self.compose(cursor, row, &mut frame)?;
        frame.flush_to(w)
    }

    fn draw_rows(&self, size: Size, row: Option<&TextRow>, out: &mut impl Write) -> io::Result<()> {
        let cols = usize::from(size.cols);
        let center = size.rows / 2;

        for i in 0..size.rows {
            match row {
                Some(text) if i == 0 => out.write_all(text.truncated(cols))?,
                _ if i == center => self.draw_banner(cols, out)?,
                _ => out.write_all(FILLER)?,
            }

            ansi::clear_line(out)?;
            if i + 1 < size.rows {
                out.write_all(ansi::CRLF)?;
            }
        }
        Ok(())
    }

    fn draw_banner(&self, cols: usize, out: &mut impl Write) -> io::Result<()> {
        let text = self.banner.as_bytes();
        let len = text.len().min(cols);
        let padding = (cols - len) / 2;

        if padding > 0 {
            out.write_all(FILLER)?;
        }
        for _ in 0..padding {
            out.write_all(b" ")?;
        }
        out.write_all(&text[..len])
    }
}

impl Default for ScreenComposer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use kora_term::input::Key;
    use pretty_assertions::assert_eq;

    /// Records every fragment handed to `write`.
    #[derive(Default)]
    struct Recorder {
        fragments: Vec<Vec<u8>>,
        writes: usize,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            self.fragments.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn frame(composer: &ScreenComposer, cursor: &Cursor, row: Option<&TextRow>) -> String {
        let mut buf = AppendBuffer::new();
        composer.compose(cursor, row, &mut buf).unwrap();
        String::from_utf8(buf.into_bytes()).unwrap()
    }

    /// The row bodies of a frame, without the `\x1b[K` terminators.
    fn rows(frame: &str) -> Vec<String> {
        let body = frame.strip_prefix("\x1b[?25l\x1b[H").unwrap();
        let end = body.rfind("\x1b[K").unwrap();
        body[..end]
            .split("\x1b[K\r\n")
            .map(str::to_owned)
            .collect()
    }

    // -- Whole frames -------------------------------------------------------

    #[test]
    fn small_frame_exact_bytes() {
        let composer = ScreenComposer::with_banner("hi");
        let cursor = Cursor::new(Size::new(6, 3));
        assert_eq!(
            frame(&composer, &cursor, None),
            "\x1b[?25l\x1b[H~\x1b[K\r\n~  hi\x1b[K\r\n~\x1b[K\x1b[1;1H\x1b[?25h"
        );
    }

    #[test]
    fn frame_starts_hidden_and_ends_shown() {
        let composer = ScreenComposer::new();
        let f = frame(&composer, &Cursor::new(Size::new(80, 24)), None);
        assert!(f.starts_with("\x1b[?25l\x1b[H"));
        assert!(f.ends_with("\x1b[?25h"));
    }

    #[test]
    fn cursor_position_is_one_indexed() {
        let composer = ScreenComposer::new();
        let cursor = Cursor::at(Size::new(80, 24), 9, 4);
        let f = frame(&composer, &cursor, None);
        assert!(f.ends_with("\x1b[5;10H\x1b[?25h"), "{f:?}");
    }

    #[test]
    fn crlf_count_is_rows_minus_one() {
        let composer = ScreenComposer::new();
        for rows in [1u16, 2, 3, 24, 51] {
            let f = frame(&composer, &Cursor::new(Size::new(80, rows)), None);
            assert_eq!(f.matches("\r\n").count(), usize::from(rows) - 1, "rows={rows}");
            assert_eq!(f.matches("\x1b[K").count(), usize::from(rows));
        }
    }

    #[test]
    fn frame_length_is_sum_of_fragments() {
        let composer = ScreenComposer::new();
        let row = TextRow::new(b"hello".to_vec());
        let cursor = Cursor::at(Size::new(40, 10), 3, 7);

        let mut rec = Recorder::default();
        composer.compose(&cursor, Some(&row), &mut rec).unwrap();
        let total: usize = rec.fragments.iter().map(Vec::len).sum();

        let mut buf = AppendBuffer::new();
        composer.compose(&cursor, Some(&row), &mut buf).unwrap();
        assert_eq!(buf.len(), total);
        assert_eq!(buf.as_bytes(), rec.fragments.concat().as_slice());
    }

    #[test]
    fn refresh_is_one_write() {
        let composer = ScreenComposer::new();
        let mut rec = Recorder::default();
        composer
            .refresh(&Cursor::new(Size::new(80, 24)), None, &mut rec)
            .unwrap();
        assert_eq!(rec.writes, 1);
    }

    // -- Banner -------------------------------------------------------------

    #[test]
    fn banner_is_centered_on_80_columns() {
        let composer = ScreenComposer::new();
        let f = frame(&composer, &Cursor::new(Size::new(80, 24)), None);
        let rows = rows(&f);

        let padding = (80 - BANNER.len()) / 2;
        let expected = format!("~{}{BANNER}", " ".repeat(padding));
        assert_eq!(rows[12], expected);
    }

    #[test]
    fn banner_text() {
        assert_eq!(BANNER, concat!("Kora -- version ", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn banner_without_padding_has_no_tilde() {
        let composer = ScreenComposer::with_banner("abcd");
        // cols 5: padding (5 - 4) / 2 == 0.
        let f = frame(&composer, &Cursor::new(Size::new(5, 3)), None);
        assert_eq!(rows(&f)[1], "abcd");
    }

    #[test]
    fn banner_truncated_to_width() {
        let composer = ScreenComposer::with_banner("0123456789");
        let f = frame(&composer, &Cursor::new(Size::new(4, 3)), None);
        assert_eq!(rows(&f)[1], "0123");
    }

    #[test]
    fn other_rows_are_tildes() {
        let composer = ScreenComposer::new();
        let f = frame(&composer, &Cursor::new(Size::new(80, 5)), None);
        let rows = rows(&f);
        assert_eq!(rows.len(), 5);
        for (i, r) in rows.iter().enumerate() {
            if i != 2 {
                assert_eq!(r, "~", "row {i}");
            }
        }
    }

    // -- Loaded row ---------------------------------------------------------

    #[test]
    fn loaded_row_replaces_first_tilde() {
        let composer = ScreenComposer::new();
        let row = TextRow::new(b"first line".to_vec());
        let f = frame(&composer, &Cursor::new(Size::new(80, 5)), Some(&row));
        let rows = rows(&f);
        assert_eq!(rows[0], "first line");
        assert_eq!(rows[1], "~");
    }

    #[test]
    fn loaded_row_is_cut_to_width() {
        let composer = ScreenComposer::new();
        let row = TextRow::new(b"abcdefghij".to_vec());
        let f = frame(&composer, &Cursor::new(Size::new(4, 5)), Some(&row));
        assert_eq!(rows(&f)[0], "abcd");
    }

    #[test]
    fn loaded_row_wins_over_banner_on_one_row_screen() {
        let composer = ScreenComposer::new();
        let row = TextRow::new(b"text".to_vec());
        let f = frame(&composer, &Cursor::new(Size::new(80, 1)), Some(&row));
        assert_eq!(rows(&f), vec!["text".to_owned()]);
    }

    #[test]
    fn banner_on_one_row_screen_without_text() {
        let composer = ScreenComposer::with_banner("x");
        let f = frame(&composer, &Cursor::new(Size::new(3, 1)), None);
        assert_eq!(rows(&f), vec!["~ x".to_owned()]);
    }

    // -- Cursor + frame -----------------------------------------------------

    #[test]
    fn frame_follows_cursor_moves() {
        let composer = ScreenComposer::new();
        let mut cursor = Cursor::new(Size::new(80, 24));
        cursor.apply(Key::End);
        cursor.apply(Key::ArrowRight);
        let f = frame(&composer, &cursor, None);
        assert!(f.ends_with("\x1b[2;1H\x1b[?25h"));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_frame_has_one_line_per_row(cols in 1u16..=200, rows in 1u16..=80) {
                let composer = ScreenComposer::new();
                let f = frame(&composer, &Cursor::new(Size::new(cols, rows)), None);
                prop_assert_eq!(f.matches("\r\n").count(), usize::from(rows) - 1);
            }
        }
    }
}
