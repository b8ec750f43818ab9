//! The ed-style line editor interpreter.
//!
//! [`Ed`] owns a line buffer and a cursor. Each call to [`Ed::process`]
//! takes one line of user input and returns an [`Outcome`]:
//! - In command mode the line is split into address and command
//!   ([`command::CommandLine`]), the address is resolved
//!   ([`address::Resolver`]) and the command runs against the buffer.
//! - `a`, `i` and `c` switch to text-input mode, which collects lines until
//!   a lone `.` commits them.
//!
//! The interpreter performs no I/O. Hosts render the outcome and, for `w`,
//! take the returned buffer and write it wherever it came from.

mod address;
mod command;
mod error;

pub use address::LineRange;
pub use command::{CommandLine, Substitution};
pub use error::EdError;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::pattern::Pattern;
use address::Resolver;

const QUIT_GUIDANCE: &str =
    "Type 'w' to save and 'q' again to exit.\nOr 'Q' to quit without saving.";
const RESET_MESSAGE: &str = "Buffer reset.";
const WRITE_MESSAGE: &str = "Buffer written.";
const HELP_TEXT: &str = "
ed commands:
 a      - Append text after current line
 i      - Insert text before current line
 c      - Change lines
 d      - Delete lines
 p      - Print lines
 n      - Number and print lines
 s/old/new/g - Substitute (g for global)
 w      - Write the buffer back and close
 q      - Warn before quitting
 Q      - Quit without saving (empties the buffer)
 .      - Exit input mode / refer to current line
 $      - Refer to last line
 1,$p   - Print all lines
 /regex/ - Search for regex (forward)
 /regex/H - Highlight regex capture groups
 H      - Toggle verbose error messages
 P      - Toggle prompt
";

/// Session options that only affect how results are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdConfig {
    /// Show `*` as the command-mode prompt.
    pub show_prompt: bool,
    /// Follow the `?` error marker with the error message.
    pub verbose_errors: bool,
}

impl Default for EdConfig {
    fn default() -> Self {
        Self {
            show_prompt: true,
            verbose_errors: false,
        }
    }
}

/// Which kind of edit a text-input session will perform on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Append,
    Insert,
    Change,
}

/// An edit waiting for its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub op: EditOp,
    pub range: LineRange,
    pub lines: Vec<String>,
}

/// Interpreter state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Command,
    TextInput(PendingEdit),
}

/// The result of processing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command succeeded; the text may be empty.
    Output(String),
    /// The command failed; `?` or `? <message>`.
    Error(String),
    /// Text-input mode was entered and is waiting for lines.
    Input,
    /// A line was added to the pending edit; still in text-input mode.
    Continue,
    /// The buffer is ready to be written back by the host.
    Saved { output: String, buffer: Vec<String> },
}

impl Outcome {
    /// The text a host should display, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Output(text) | Self::Error(text) => Some(text.as_str()),
            Self::Saved { output, .. } => Some(output.as_str()),
            Self::Continue => Some(""),
            Self::Input => None,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Output(output) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("output", output)?;
                map.end()
            }
            Self::Error(error) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
            Self::Input => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("status", "input")?;
                map.end()
            }
            Self::Continue => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("output", "")?;
                map.serialize_entry("status", "input")?;
                map.end()
            }
            Self::Saved { output, buffer } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("output", output)?;
                map.serialize_entry("buffer", buffer)?;
                map.end()
            }
        }
    }
}

/// One editing session over an in-memory line buffer.
#[derive(Debug, Clone)]
pub struct Ed {
    buffer: Vec<String>,
    current_line: usize,
    mode: Mode,
    config: EdConfig,
    last_error: Option<EdError>,
}

impl Ed {
    /// Start a session. The cursor starts on the last line.
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>, config: EdConfig) -> Self {
        let buffer: Vec<String> = lines.into_iter().map(Into::into).collect();
        let current_line = buffer.len().saturating_sub(1);
        Self {
            buffer,
            current_line,
            mode: Mode::Command,
            config,
            last_error: None,
        }
    }

    pub fn buffer(&self) -> &[String] {
        &self.buffer
    }

    /// The 0-based cursor.
    pub const fn current_line(&self) -> usize {
        self.current_line
    }

    /// Move the cursor, clamped to the buffer.
    pub fn set_current_line(&mut self, line: usize) {
        self.current_line = line.min(self.buffer.len().saturating_sub(1));
    }

    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    pub const fn is_input_mode(&self) -> bool {
        matches!(self.mode, Mode::TextInput(_))
    }

    pub const fn config(&self) -> EdConfig {
        self.config
    }

    /// The most recent failure, kept even when errors are terse.
    pub const fn last_error(&self) -> Option<EdError> {
        self.last_error
    }

    /// `*` in command mode when prompting is on, otherwise empty.
    pub const fn prompt(&self) -> &'static str {
        if self.is_input_mode() || !self.config.show_prompt {
            ""
        } else {
            "*"
        }
    }

    /// Process one line of input.
    pub fn process(&mut self, line: &str) -> Outcome {
        let result = if !self.is_input_mode() {
            self.run_command(line.trim())
        } else if line == "." {
            self.commit()
        } else {
            if let Mode::TextInput(pending) = &mut self.mode {
                pending.lines.push(line.to_string());
            }
            Ok(Outcome::Continue)
        };
        let outcome = result.unwrap_or_else(|err| self.fail(err));
        tracing::debug!(
            input = line,
            input_mode = self.is_input_mode(),
            cursor = self.current_line,
            error = outcome.is_error(),
            "processed line"
        );
        outcome
    }

    fn fail(&mut self, err: EdError) -> Outcome {
        self.last_error = Some(err);
        if self.config.verbose_errors {
            Outcome::Error(format!("? {err}"))
        } else {
            Outcome::Error("?".to_string())
        }
    }

    fn run_command(&mut self, input: &str) -> Result<Outcome, EdError> {
        let Some(cmd) = CommandLine::parse(input) else {
            return self.advance();
        };
        let range = Resolver::new(&self.buffer).range(cmd.address, self.current_line)?;

        match cmd.letter {
            'a' => Ok(self.begin_input(EditOp::Append, range)),
            'i' => Ok(self.begin_input(EditOp::Insert, range)),
            'c' => Ok(self.begin_input(EditOp::Change, range)),
            'd' => {
                self.delete(range)?;
                Ok(Outcome::Output(String::new()))
            }
            'p' => self.print(range, false).map(Outcome::Output),
            'n' => self.print(range, true).map(Outcome::Output),
            's' => self.substitute(range, cmd.tail).map(Outcome::Output),
            'q' => Ok(Outcome::Output(QUIT_GUIDANCE.to_string())),
            'Q' => {
                self.buffer.clear();
                self.current_line = 0;
                Ok(Outcome::Output(RESET_MESSAGE.to_string()))
            }
            'w' => Ok(Outcome::Saved {
                output: WRITE_MESSAGE.to_string(),
                buffer: self.buffer.clone(),
            }),
            'h' => Ok(Outcome::Output(HELP_TEXT.to_string())),
            'H' => {
                self.config.verbose_errors = !self.config.verbose_errors;
                let state = if self.config.verbose_errors {
                    "enabled"
                } else {
                    "disabled"
                };
                Ok(Outcome::Output(format!("Verbose errors {state}.")))
            }
            'P' => {
                self.config.show_prompt = !self.config.show_prompt;
                Ok(Outcome::Output(String::new()))
            }
            _ => Err(EdError::UnknownCommand),
        }
    }

    /// Empty input: step to the next line, wrapping, and print it.
    fn advance(&mut self) -> Result<Outcome, EdError> {
        if self.buffer.is_empty() {
            return Err(EdError::EmptyBuffer);
        }
        self.current_line = (self.current_line + 1) % self.buffer.len();
        Ok(Outcome::Output(self.buffer[self.current_line].clone()))
    }

    fn begin_input(&mut self, op: EditOp, range: LineRange) -> Outcome {
        self.mode = Mode::TextInput(PendingEdit {
            op,
            range,
            lines: Vec::new(),
        });
        Outcome::Input
    }

    /// Apply the pending edit. The mode returns to command even on failure.
    fn commit(&mut self) -> Result<Outcome, EdError> {
        let Mode::TextInput(pending) = std::mem::take(&mut self.mode) else {
            return Ok(Outcome::Output(String::new()));
        };
        let PendingEdit { op, range, lines } = pending;
        match op {
            EditOp::Append => self.splice_at(range.end, lines)?,
            EditOp::Insert => self.splice_at((range.start - 1).max(0), lines)?,
            EditOp::Change => self.change(range, lines)?,
        }
        Ok(Outcome::Output(String::new()))
    }

    /// Insert `lines` so the first lands at 0-based `at`, clamped to the end.
    fn splice_at(&mut self, at: i64, lines: Vec<String>) -> Result<(), EdError> {
        let at = usize::try_from(at)
            .map_err(|_| EdError::InvalidAddress)?
            .min(self.buffer.len());
        let count = lines.len();
        self.buffer.splice(at..at, lines);
        if count > 0 {
            self.current_line = at + count - 1;
        }
        Ok(())
    }

    fn change(&mut self, range: LineRange, lines: Vec<String>) -> Result<(), EdError> {
        let (first, last) = range.indices(self.buffer.len())?;
        let count = lines.len();
        self.buffer.splice(first..=last, lines);
        self.current_line = (first + count).saturating_sub(1);
        Ok(())
    }

    fn delete(&mut self, range: LineRange) -> Result<(), EdError> {
        if self.buffer.is_empty() {
            return Err(EdError::EmptyBuffer);
        }
        let (first, last) = range.indices(self.buffer.len())?;
        self.buffer.drain(first..=last);
        self.current_line = first.min(self.buffer.len().saturating_sub(1));
        Ok(())
    }

    fn print(&mut self, range: LineRange, numbered: bool) -> Result<String, EdError> {
        if self.buffer.is_empty() {
            return Err(EdError::EmptyBuffer);
        }
        let (first, last) = range.indices(self.buffer.len())?;
        let text = self.buffer[first..=last]
            .iter()
            .enumerate()
            .map(|(offset, line)| {
                if numbered {
                    format!("{}\t{line}", first + offset + 1)
                } else {
                    line.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.current_line = last;
        Ok(text)
    }

    fn substitute(&mut self, range: LineRange, tail: &str) -> Result<String, EdError> {
        let sub = Substitution::parse(tail)?;
        if self.buffer.is_empty() {
            return Err(EdError::EmptyBuffer);
        }
        let pattern = Pattern::compile(sub.pattern).map_err(|_| EdError::InvalidRegex)?;
        let (first, last) = range.indices(self.buffer.len())?;

        let mut last_changed = None;
        for idx in first..=last {
            let replaced = pattern.replace(&self.buffer[idx], sub.replacement, sub.global);
            if replaced != self.buffer[idx].as_str() {
                let replaced = replaced.into_owned();
                self.buffer[idx] = replaced;
                last_changed = Some(idx);
            }
        }

        let idx = last_changed.ok_or(EdError::NoMatch)?;
        self.current_line = idx;
        Ok(self.buffer[idx].clone())
    }
}
