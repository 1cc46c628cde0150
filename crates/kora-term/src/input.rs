// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal input decoder.
//
// Turns raw stdin bytes into logical keys: plain bytes (control characters
// included) and the named navigation keys that VT100/xterm terminals send
// as escape sequences:
//
// - CSI letter sequences   ESC [ A..D, ESC [ H, ESC [ F
// - CSI tilde sequences    ESC [ 1..8 ~
// - SS3 sequences          ESC O H, ESC O F
//
// # Design
//
// One `decode` call reads exactly the bytes of one key and nothing more.
// There is no buffering between calls. A lone ESC and an escape sequence
// are told apart by the read timeout configured in raw mode (`VTIME`): if
// the next byte doesn't arrive in time, the ESC was the Escape key.
//
// Anything the table doesn't know decodes as a literal Escape: unmapped
// final bytes, truncated sequences, digits not followed by `~`. Decoding is
// best-effort, not protocol validation.
//
// The transition function `Decoder::step` is pure, so the decode table is
// testable without a terminal.

use std::io;

use crate::error::{Error, Result};

// ─── Key ────────────────────────────────────────────────────────────────────

/// The ESCAPE byte.
pub const ESC: u8 = 0x1B;

/// Map a letter to its Ctrl-combination byte (`ctrl(b'q') == 0x11`).
#[inline]
#[must_use]
pub const fn ctrl(key: u8) -> u8 {
    key & 0x1F
}

/// A decoded key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any byte that didn't start an escape sequence, unchanged.
    Char(u8),
    /// A lone ESC, or an escape sequence we don't map.
    Escape,
    // ── Navigation ──────────────────────────────────────────────
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
}

impl Key {
    /// True for the Ctrl-combination of `letter`.
    #[inline]
    #[must_use]
    pub const fn is_ctrl(self, letter: u8) -> bool {
        matches!(self, Self::Char(b) if b == ctrl(letter))
    }
}

// ─── Byte Source ────────────────────────────────────────────────────────────

/// Where the decoder gets its bytes.
pub trait ByteSource {
    /// Read one byte.
    ///
    /// `Ok(None)` means no byte arrived before the read timeout.
    ///
    /// # Errors
    ///
    /// Any I/O failure other than a timeout.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// In-memory byte source. Reports a timeout once exhausted.
impl ByteSource for std::collections::VecDeque<u8> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

/// Reads one byte at a time straight from a file descriptor.
///
/// Goes through `read(2)` rather than `io::Stdin`, whose internal buffer
/// would swallow bytes past the current key.
#[derive(Debug, Clone, Copy)]
pub struct FdSource {
    fd: std::os::unix::io::RawFd,
}

impl FdSource {
    /// Read from standard input.
    #[must_use]
    pub const fn stdin() -> Self {
        Self {
            fd: libc::STDIN_FILENO,
        }
    }

    /// Read from an arbitrary descriptor.
    #[must_use]
    pub const fn new(fd: std::os::unix::io::RawFd) -> Self {
        Self { fd }
    }
}

impl ByteSource for FdSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(self.fd, (&raw mut byte).cast::<libc::c_void>(), 1) };
        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    // Cygwin and some BSDs report the VTIME timeout this way.
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Decoder state between bytes of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing read yet.
    Start,
    /// Read ESC.
    SawEscape,
    /// Read ESC `[`.
    SawBracket,
    /// Read ESC `[` and a digit.
    SawDigit(u8),
    /// Read ESC `O`.
    SawSs3,
    /// Read ESC and a byte that starts nothing we know.
    SawOther,
}

/// Outcome of feeding one byte to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The key isn't finished; read another byte.
    Continue(State),
    /// The key is decoded.
    Done(Key),
}

/// The escape-sequence state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    /// Feed one byte in `state`.
    #[must_use]
    pub const fn step(state: State, byte: u8) -> Step {
        match state {
            State::Start => match byte {
                ESC => Step::Continue(State::SawEscape),
                b => Step::Done(Key::Char(b)),
            },
            State::SawEscape => match byte {
                b'[' => Step::Continue(State::SawBracket),
                b'O' => Step::Continue(State::SawSs3),
                // The two bytes after ESC are always read as a pair.
                _ => Step::Continue(State::SawOther),
            },
            State::SawBracket => match byte {
                b @ b'0'..=b'9' => Step::Continue(State::SawDigit(b)),
                b'A' => Step::Done(Key::ArrowUp),
                b'B' => Step::Done(Key::ArrowDown),
                b'C' => Step::Done(Key::ArrowRight),
                b'D' => Step::Done(Key::ArrowLeft),
                b'H' => Step::Done(Key::Home),
                b'F' => Step::Done(Key::End),
                _ => Step::Done(Key::Escape),
            },
            State::SawDigit(digit) => match (digit, byte) {
                (b'1' | b'7', b'~') => Step::Done(Key::Home),
                (b'3', b'~') => Step::Done(Key::Delete),
                (b'4' | b'8', b'~') => Step::Done(Key::End),
                (b'5', b'~') => Step::Done(Key::PageUp),
                (b'6', b'~') => Step::Done(Key::PageDown),
                _ => Step::Done(Key::Escape),
            },
            State::SawSs3 => match byte {
                b'H' => Step::Done(Key::Home),
                b'F' => Step::Done(Key::End),
                _ => Step::Done(Key::Escape),
            },
            State::SawOther => Step::Done(Key::Escape),
        }
    }

    /// Block until one key has been read from `source` and decode it.
    ///
    /// Waits through read timeouts for the first byte; a timeout after that
    /// resolves the pending sequence as [`Key::Escape`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputRead`] if the source fails.
    pub fn decode(source: &mut impl ByteSource) -> Result<Key> {
        let first = loop {
            if let Some(b) = source.read_byte().map_err(Error::InputRead)? {
                break b;
            }
        };

        let mut state = match Self::step(State::Start, first) {
            Step::Done(key) => return Ok(key),
            Step::Continue(next) => next,
        };

        loop {
            let Some(byte) = source.read_byte().map_err(Error::InputRead)? else {
                tracing::trace!(?state, "escape sequence timed out");
                return Ok(Key::Escape);
            };
            match Self::step(state, byte) {
                Step::Done(key) => return Ok(key),
                Step::Continue(next) => state = next,
            }
        }
    }
}

/// Decode the first key of an in-memory byte slice.
///
/// Returns `None` for an empty slice. Running out of bytes mid-sequence
/// counts as a timeout.
#[must_use]
pub fn decode_bytes(bytes: &[u8]) -> Option<Key> {
    let mut state = State::Start;
    for &byte in bytes {
        match Decoder::step(state, byte) {
            Step::Done(key) => return Some(key),
            Step::Continue(next) => state = next,
        }
    }
    (state != State::Start).then_some(Key::Escape)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
