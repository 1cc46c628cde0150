// SPDX-License-Identifier: MIT
//
// kora — a minimal raw-mode terminal text viewer.
//
// This is the main binary that wires the two crates together:
//
//   kora-term   → raw mode, window size, key decoding, frame output
//   kora-editor → cursor, loaded row, screen composition
//
// The `Kora` struct is the whole session. Each iteration of the loop:
//
//   paint → ScreenComposer → one write to stdout
//   stdin → Decoder → on_key → quit, or Cursor::apply
//
// Raw mode is held by a `RawModeGuard` that lives in `start()`. However
// `start()` returns, the guard has restored the terminal before `main`
// decides the exit status.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use kora_editor::cursor::Cursor;
use kora_editor::row::{LoadError, TextRow};
use kora_editor::screen::ScreenComposer;

use kora_term::ansi;
use kora_term::input::{ByteSource, Decoder, FdSource, Key};
use kora_term::terminal::{self, RawModeGuard, Size};

// ─── Command line ───────────────────────────────────────────────────────────

/// A minimal raw-mode terminal text viewer.
#[derive(Parser, Debug)]
#[command(name = "kora", disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// File whose first line is displayed.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

/// Environment variable naming the log file. Unset means no logging.
const LOG_ENV: &str = "KORA_LOG";

/// Everything startup needs, resolved from the command line and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Config {
    file: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

impl Config {
    fn new(args: Args, log_env: Option<OsString>) -> Self {
        Self {
            file: args.file,
            log_file: log_env.filter(|v| !v.is_empty()).map(PathBuf::from),
        }
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send `tracing` output to `path`, filtered by `RUST_LOG` (default `debug`).
///
/// stdout is the screen, so logs only ever go to a file.
fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let fmt_layer = fmt::layer().with_writer(Arc::new(file)).with_ansi(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .map_err(io::Error::other)
}

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Anything that ends the session with a non-zero status.
#[derive(Debug, thiserror::Error)]
enum KoraError {
    #[error(transparent)]
    Term(#[from] kora_term::Error),

    #[error(transparent)]
    Load(#[from] LoadError),
}

// ─── Session ────────────────────────────────────────────────────────────────

/// What the loop does after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Continue,
    Quit,
}

/// Ctrl-Q.
const QUIT_LETTER: u8 = b'q';

/// The viewer session: screen state and the composer that draws it.
struct Kora {
    cursor: Cursor,
    /// At most one row is ever loaded.
    row: Option<TextRow>,
    composer: ScreenComposer,
}

impl Kora {
    fn new(size: Size, row: Option<TextRow>) -> Self {
        Self {
            cursor: Cursor::new(size),
            row,
            composer: ScreenComposer::new(),
        }
    }

    fn on_key(&mut self, key: Key) -> Action {
        if key.is_ctrl(QUIT_LETTER) {
            return Action::Quit;
        }
        self.cursor.apply(key);
        Action::Continue
    }

    fn paint(&self, out: &mut impl Write) -> kora_term::Result<()> {
        self.composer
            .refresh(&self.cursor, self.row.as_ref(), out)
            .map_err(kora_term::Error::Output)
    }

    /// Paint, read a key, dispatch. Repeats until quit or an error.
    ///
    /// On quit the screen is cleared and the cursor homed before returning.
    fn run(&mut self, input: &mut impl ByteSource, out: &mut impl Write) -> kora_term::Result<()> {
        loop {
            self.paint(out)?;
            let key = Decoder::decode(input)?;
            tracing::trace!(?key, "key");

            if self.on_key(key) == Action::Quit {
                ansi::wipe(out).map_err(kora_term::Error::Output)?;
                tracing::info!("quit");
                return Ok(());
            }
        }
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

/// Acquire the terminal, load the file, run the loop.
fn start(config: &Config) -> Result<(), KoraError> {
    let guard = RawModeGuard::enable()?;
    let size = terminal::probe_size()?;

    let row = match &config.file {
        Some(path) => TextRow::load(path)?,
        None => None,
    };

    let mut kora = Kora::new(size, row);
    kora.run(&mut FdSource::stdin(), &mut io::stdout().lock())?;

    guard.disable()?;
    Ok(())
}

/// Report a fatal error on a clean screen. The terminal is already back in
/// cooked mode by the time this runs.
fn report_fatal(err: &KoraError) {
    let _ = ansi::wipe(&mut io::stdout().lock());
    eprintln!("kora: {err}");
    tracing::error!("{err}");
}

fn main() -> ExitCode {
    let config = Config::new(Args::parse(), std::env::var_os(LOG_ENV));

    if let Some(path) = &config.log_file {
        if let Err(e) = init_logging(path) {
            eprintln!("kora: logging disabled: {}: {e}", path.display());
        }
    }
    tracing::info!(?config, "starting");

    match start(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_fatal(&err);
            ExitCode::FAILURE
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
