// SPDX-License-Identifier: MIT
//
// Terminal-layer errors.
//
// Every variant is unrecoverable for the viewer: the binary restores the
// terminal, clears the screen, reports the error and exits non-zero. The
// variants exist so the report names what was being attempted.

use std::io;

/// Errors from terminal control, size queries, input and output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `tcgetattr` / `tcsetattr` failed.
    #[error("{op}: {source}")]
    Attributes {
        /// What we were doing, e.g. `"enable raw mode"`.
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// `ioctl(TIOCGWINSZ)` failed or reported a zero dimension.
    #[error("get window size: {0}")]
    WindowSize(#[source] io::Error),

    /// Reading a byte from the input device failed.
    #[error("reading input: {0}")]
    InputRead(#[source] io::Error),

    /// Writing a frame (or growing the frame buffer) failed.
    #[error("writing output: {0}")]
    Output(#[source] io::Error),
}

impl Error {
    /// Wrap the current `errno` as an attribute error.
    pub(crate) fn last_attr_error(op: &'static str) -> Self {
        Self::Attributes {
            op,
            source: io::Error::last_os_error(),
        }
    }
}

/// Result alias for terminal-layer operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_error_names_operation() {
        let e = Error::Attributes {
            op: "enable raw mode",
            source: io::Error::other("not a tty"),
        };
        assert_eq!(e.to_string(), "enable raw mode: not a tty");
    }

    #[test]
    fn window_size_error_message() {
        let e = Error::WindowSize(io::Error::other("no tty"));
        assert_eq!(e.to_string(), "get window size: no tty");
    }

    #[test]
    fn input_read_error_exposes_source() {
        use std::error::Error as _;
        let e = Error::InputRead(io::Error::other("boom"));
        assert!(e.source().is_some());
    }

    #[test]
    fn output_error_message() {
        let e = Error::Output(io::Error::new(io::ErrorKind::OutOfMemory, "oom"));
        assert_eq!(e.to_string(), "writing output: oom");
    }
}
