// SPDX-License-Identifier: MIT
//
// kora-term — Terminal layer for kora.
//
// Everything that touches the terminal device lives here: raw mode with a
// restore guard, the window size query, the byte-level key decoder, the
// handful of VT100 sequences the viewer emits, and the buffer that turns a
// frame into a single write.
//
// No TUI framework (ratatui, crossterm): direct termios and ANSI bytes.
// Every byte sent to the terminal is accounted for.

#[cfg(not(unix))]
compile_error!("kora-term drives termios directly and only supports unix targets");

pub mod ansi;
pub mod error;
pub mod input;
pub mod output;
pub mod terminal;

pub use error::{Error, Result};
