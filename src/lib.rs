// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. ed::EdError)
    clippy::module_name_repetitions
)]

//! # rhed
//!
//! An ed-style command palette for text fields, editable regions and the
//! clipboard.
//!
//! rhed edits a buffer of lines with classic `ed` commands:
//! - Line addresses, ranges and `/regex/` searches
//! - Append, insert, change, delete, print and substitute
//! - Write-back to the buffer's source
//! - Highlighting of regex capture groups
//!
//! ## Architecture
//!
//! The interpreter is pure: it takes one input line and returns an outcome.
//! Everything that touches the outside world lives in the host.
//! - **Interpreter**: buffer, cursor and mode ([`ed`])
//! - **Palette**: routes outcomes to actions and messages ([`palette`])
//! - **Host**: reads input, writes files or the clipboard ([`app`])
//!
//! ## Modules
//!
//! - [`app`]: Line-oriented host loop and side effects
//! - [`config`]: Persistent flag defaults
//! - [`ed`]: The command interpreter
//! - [`highlight`]: Capture-group highlighting over segmented text
//! - [`palette`]: Session routing and buffer sources
//! - [`pattern`]: Regex compilation and replacement

pub mod app;
pub mod config;
pub mod ed;
pub mod highlight;
pub mod palette;
pub mod pattern;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, SessionEnd, Target};
    pub use crate::ed::{Ed, EdConfig, Outcome};
    pub use crate::palette::{Palette, SourceMode};
}
