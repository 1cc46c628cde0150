// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size, and RAII restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ) and raw fd writes. These are the standard
// POSIX interfaces for terminal control.
// Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// Raw mode is a scoped acquisition. `RawModeGuard::enable` captures the
// device's attribute set, switches the device to raw mode, and hands back a
// guard. The captured set is put back exactly once: by `disable()`, or by
// the guard's `Drop` on any other exit path (early return, `?`, quit).
//
// Panics get the same treatment through a process-wide hook that writes a
// short restore sequence straight to fd 1 and reapplies the captured
// termios from a global backup before the original hook prints its message.

use std::fmt;
use std::os::unix::io::RawFd;
use std::sync::{Mutex, Once};

use crate::error::{Error, Result};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells. Both fields are non-zero when
/// produced by [`probe_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// Construct a size from explicit dimensions.
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

// ─── Window Size Probe ──────────────────────────────────────────────────────

/// Query the size of the terminal attached to stdout.
///
/// # Errors
///
/// Returns [`Error::WindowSize`] if stdout is not a terminal, the query
/// fails, or the terminal reports a zero dimension.
pub fn probe_size() -> Result<Size> {
    probe_size_of(libc::STDOUT_FILENO)
}

/// Query the size of the terminal behind `fd` via `ioctl(TIOCGWINSZ)`.
///
/// # Errors
///
/// Same as [`probe_size`].
pub fn probe_size_of(fd: RawFd) -> Result<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &raw mut ws) };

    if result == -1 {
        return Err(Error::WindowSize(std::io::Error::last_os_error()));
    }
    if ws.ws_col == 0 || ws.ws_row == 0 {
        return Err(Error::WindowSize(std::io::Error::other(format!(
            "terminal reported {}x{}",
            ws.ws_col, ws.ws_row
        ))));
    }

    let size = Size::new(ws.ws_col, ws.ws_row);
    tracing::debug!(cols = size.cols, rows = size.rows, "probed window size");
    Ok(size)
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the captured termios for panic recovery.
///
/// The [`RawModeGuard`] owns its own copy, but the panic hook can't reach
/// it, so the hook restores cooked mode from this copy instead.
static TERMIOS_BACKUP: Mutex<Option<(RawFd, libc::termios)>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some((fd, ref original)) = *guard {
            unsafe {
                let _ = libc::tcsetattr(fd, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Emergency screen restore: clear, home, show cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

/// The panic hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Writes [`EMERGENCY_RESTORE`] directly to fd 1 (bypassing Rust's stdout
/// lock in case the panic happened mid-frame), reapplies the captured
/// termios, then delegates to the original hook.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            restore_termios_from_backup();

            original(info);
        }));
    });
}

fn emergency_restore() {
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// `VTIME` in raw mode, in tenths of a second.
pub const READ_TIMEOUT_DECISECONDS: libc::cc_t = 1;

/// Derive the raw-mode attribute set from the captured one.
///
/// Clears canonical line buffering, local echo and signal-generating keys
/// (`ICANON | ECHO | ISIG`), software flow control and CR→NL translation
/// (`IXON | ICRNL`). Output processing is left alone. `VMIN = 0`,
/// `VTIME = 1` makes `read()` return after 100 ms without input, which is
/// what lets a lone ESC resolve as the Escape key.
#[must_use]
pub fn raw_attributes(original: &libc::termios) -> libc::termios {
    let mut raw = *original;
    raw.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG);
    raw.c_iflag &= !(libc::IXON | libc::ICRNL);
    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = READ_TIMEOUT_DECISECONDS;
    raw
}

/// Read the current attribute set of `fd`.
///
/// # Errors
///
/// Returns [`Error::Attributes`] if `tcgetattr` fails (e.g. not a tty).
pub fn get_attributes(fd: RawFd, op: &'static str) -> Result<libc::termios> {
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &raw mut termios) != 0 {
            return Err(Error::last_attr_error(op));
        }
        Ok(termios)
    }
}

fn set_attributes(fd: RawFd, termios: &libc::termios, op: &'static str) -> Result<()> {
    unsafe {
        if libc::tcsetattr(fd, libc::TCSAFLUSH, termios) != 0 {
            return Err(Error::last_attr_error(op));
        }
    }
    Ok(())
}

/// Raw mode held for as long as the guard lives.
///
/// # Example
///
/// ```no_run
/// use kora_term::terminal::RawModeGuard;
///
/// let guard = RawModeGuard::enable()?;
/// // ... render frames, decode keys ...
/// guard.disable()?; // or just let it drop
/// # Ok::<(), kora_term::Error>(())
/// ```
pub struct RawModeGuard {
    fd: RawFd,

    /// Attribute set captured before entering raw mode.
    original: libc::termios,

    /// Set once the original attributes are back on the device.
    restored: bool,
}

impl RawModeGuard {
    /// Put the terminal on stdin into raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Attributes`] if the attributes cannot be read or
    /// written.
    pub fn enable() -> Result<Self> {
        Self::enable_on(libc::STDIN_FILENO)
    }

    /// Put the terminal behind `fd` into raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Attributes`] if the attributes cannot be read or
    /// written. When the write fails nothing has changed on the device.
    pub fn enable_on(fd: RawFd) -> Result<Self> {
        let original = get_attributes(fd, "store attributes from default terminal")?;

        // Back up before mutating so a panic from here on can restore.
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some((fd, original));
        }
        install_panic_hook();

        let raw = raw_attributes(&original);
        if let Err(e) = set_attributes(fd, &raw, "enable raw mode") {
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            return Err(e);
        }

        tracing::debug!(fd, "raw mode enabled");
        Ok(Self {
            fd,
            original,
            restored: false,
        })
    }

    /// The attribute set that will be restored.
    #[must_use]
    pub const fn original(&self) -> &libc::termios {
        &self.original
    }

    /// Restore the captured attribute set now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Attributes`] if `tcsetattr` fails. The guard is
    /// consumed either way; its `Drop` does not retry.
    pub fn disable(mut self) -> Result<()> {
        let result = self.restore();
        self.restored = true;
        result
    }

    fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        set_attributes(self.fd, &self.original, "disable raw mode")?;
        self.restored = true;

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            if guard.as_ref().is_some_and(|(fd, _)| *fd == self.fd) {
                *guard = None;
            }
        }

        tracing::debug!(fd = self.fd, "raw mode disabled");
        Ok(())
    }
}

impl fmt::Debug for RawModeGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawModeGuard")
            .field("fd", &self.fd)
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.restored {
            if let Err(e) = self.restore() {
                tracing::warn!("failed to restore terminal on drop: {e}");
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
