//! Cursor — screen position with clamp and wrap rules.
//!
//! The cursor lives in screen coordinates, not text coordinates: `x` is a
//! column in `[0, cols-1]` and `y` a row in `[0, rows-1]`. Both stay inside
//! those bounds after every [`Cursor::apply`].
//!
//! # Movement
//!
//! | Key          | Effect                                                    |
//! |--------------|-----------------------------------------------------------|
//! | `ArrowUp`    | `y - 1`, stops at row 0                                   |
//! | `ArrowDown`  | `y + 1`, stops at the last row                            |
//! | `ArrowRight` | `x + 1`; past the right edge wraps to the next row start  |
//! | `ArrowLeft`  | `x - 1`; past the left edge wraps to the previous row end |
//! | `PageUp`     | top-left corner                                           |
//! | `PageDown`   | bottom-right corner                                       |
//! | `Home`       | `x = 0`                                                   |
//! | `End`        | `x = cols - 1`                                            |
//!
//! Wrapping never leaves the screen: `ArrowRight` on the bottom-right cell
//! stays put, and so does `ArrowLeft` at the origin.

use kora_term::input::Key;
use kora_term::terminal::Size;

/// The logical cursor and the screen it is confined to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    x: u16,
    y: u16,
    /// Never zero in either dimension.
    size: Size,
}

impl Cursor {
    /// A cursor at the origin of a `size` screen.
    ///
    /// Zero dimensions are treated as 1.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            x: 0,
            y: 0,
            size: nonzero(size),
        }
    }

    /// A cursor at `(x, y)`, clamped into the screen.
    #[must_use]
    pub fn at(size: Size, x: u16, y: u16) -> Self {
        let size = nonzero(size);
        Self {
            x: x.min(size.cols - 1),
            y: y.min(size.rows - 1),
            size,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Column, 0-indexed.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Row, 0-indexed.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }

    /// The screen the cursor is confined to.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    const fn last_col(&self) -> u16 {
        self.size.cols - 1
    }

    const fn last_row(&self) -> u16 {
        self.size.rows - 1
    }

    // -- Movement -----------------------------------------------------------

    /// Move according to `key`. Keys that aren't navigation keys are ignored.
    pub const fn apply(&mut self, key: Key) {
        match key {
            Key::ArrowUp => self.up(),
            Key::ArrowDown => self.down(),
            Key::ArrowLeft => self.left(),
            Key::ArrowRight => self.right(),
            Key::PageUp => {
                self.x = 0;
                self.y = 0;
            }
            Key::PageDown => {
                self.x = self.last_col();
                self.y = self.last_row();
            }
            Key::Home => self.x = 0,
            Key::End => self.x = self.last_col(),
            Key::Delete | Key::Escape | Key::Char(_) => {}
        }
    }

    const fn up(&mut self) {
        if self.y > 0 {
            self.y -= 1;
        }
    }

    const fn down(&mut self) {
        if self.y < self.last_row() {
            self.y += 1;
        }
    }

    const fn right(&mut self) {
        if self.x < self.last_col() {
            self.x += 1;
        } else if self.y < self.last_row() {
            self.y += 1;
            self.x = 0;
        }
        // Bottom-right corner: x stays at cols - 1.
    }

    const fn left(&mut self) {
        if self.x > 0 {
            self.x -= 1;
            return;
        }
        // Left edge. Rows 0 and 1 both collapse onto row 0 first: from row 1
        // that lands on the end of row 0, from row 0 there is nowhere to go.
        if self.y <= 1 {
            if self.y == 1 {
                self.y = 0;
                self.x = self.last_col();
            }
            return;
        }
        self.y -= 1;
        self.x = self.last_col();
    }
}

const fn nonzero(size: Size) -> Size {
    Size {
        cols: if size.cols == 0 { 1 } else { size.cols },
        rows: if size.rows == 0 { 1 } else { size.rows },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
