//! # kora-editor — Viewer core for kora
//!
//! The state kora keeps between frames and the code that turns it into one:
//!
//! - **[`cursor`]** — `Cursor`, the screen position with clamp/wrap rules
//! - **[`row`]** — `TextRow`, the one line of text loaded from disk
//! - **[`screen`]** — `ScreenComposer`, building and writing each frame

pub mod cursor;
pub mod row;
pub mod screen;
