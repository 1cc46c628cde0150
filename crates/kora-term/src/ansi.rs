// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; the screen composer makes those. This
// module just knows the byte-level encoding of the handful of VT100 commands
// kora needs.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
use std::io::{self, Write};

/// Clear the entire screen (ED 2).
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
/// Move the cursor to the top-left corner (CUP with no parameters).
pub const CURSOR_HOME: &[u8] = b"\x1b[H";
/// Erase from the cursor to the end of the line (EL 0).
pub const CLEAR_LINE: &[u8] = b"\x1b[K";
/// Hide the cursor (DECTCEM reset).
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
/// Show the cursor (DECTCEM set).
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";
/// Row separator. Raw mode keeps `OPOST`, but we spell out the CR anyway.
pub const CRLF: &[u8] = b"\r\n";

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Move the cursor to the top-left corner.
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_HOME)
}

/// Hide the cursor.
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_HIDE)
}

/// Show the cursor.
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_SHOW)
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen. Does not move the cursor.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_SCREEN)
}

/// Clear from the cursor to the end of the current line.
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_LINE)
}

/// Clear the screen and home the cursor, then flush.
///
/// Used on quit and on every fatal path so the shell prompt comes back on a
/// clean screen.
///
/// # Errors
///
/// Returns an error if writing or flushing `w` fails.
pub fn wipe(w: &mut impl Write) -> io::Result<()> {
    clear_screen(w)?;
    cursor_home(w)?;
    w.flush()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cursor_to_origin() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
    }

    #[test]
    fn cursor_to_is_row_then_col() {
        assert_eq!(emit(|w| cursor_to(w, 9, 4)), "\x1b[5;10H");
    }

    #[test]
    fn cursor_to_max_coordinates_do_not_overflow() {
        assert_eq!(
            emit(|w| cursor_to(w, u16::MAX, u16::MAX)),
            "\x1b[65536;65536H"
        );
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
    }

    #[test]
    fn screen_sequences() {
        assert_eq!(emit(|w| clear_screen(w)), "\x1b[2J");
        assert_eq!(emit(|w| clear_line(w)), "\x1b[K");
        assert_eq!(emit(|w| cursor_home(w)), "\x1b[H");
    }

    #[test]
    fn wipe_clears_then_homes() {
        assert_eq!(emit(|w| wipe(w)), "\x1b[2J\x1b[H");
    }
}
