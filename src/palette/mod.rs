//! Command palette session.
//!
//! The palette sits between a host and the [`Ed`] interpreter:
//! - [`SourceMode`] says where the buffer came from and how to write it back
//! - [`Palette::submit`] runs one input line and decides what the host
//!   should do next ([`Action`])
//! - [`Message`] is the envelope a palette broadcasts so every frame can
//!   apply a write or highlight and close its own palette

mod markup;

pub use markup::{lines_from_markup, markup_from_lines};

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::ed::{Ed, EdConfig, Outcome};

/// Buffer used when the clipboard cannot be read.
pub const CLIPBOARD_READ_ERROR: &str = "Error reading clipboard.";

/// Where a session's buffer came from.
#[derive(
    clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum SourceMode {
    /// A plain text field; its value is split on newlines.
    #[default]
    #[serde(rename = "textfield-value")]
    TextField,
    /// A rich content-editable region.
    #[serde(rename = "textfield-editable")]
    Editable,
    /// The system clipboard.
    #[serde(rename = "clipboard-edit")]
    Clipboard,
}

impl SourceMode {
    /// Turn source text into buffer lines.
    pub fn import(self, text: &str) -> Vec<String> {
        match self {
            Self::TextField | Self::Clipboard => text.split('\n').map(ToOwned::to_owned).collect(),
            Self::Editable => lines_from_markup(text),
        }
    }

    /// Turn buffer lines back into source text.
    pub fn export(self, lines: &[String]) -> String {
        match self {
            Self::TextField | Self::Clipboard => lines.join("\n"),
            Self::Editable => markup_from_lines(lines),
        }
    }

    /// Name used on the command line and in config files.
    pub const fn as_flag(self) -> &'static str {
        match self {
            Self::TextField => "text-field",
            Self::Editable => "editable",
            Self::Clipboard => "clipboard",
        }
    }
}

/// Buffer lines for a clipboard read, substituting a diagnostic on failure.
pub fn clipboard_lines<E: Display>(read: Result<String, E>) -> Vec<String> {
    match read {
        Ok(text) => SourceMode::Clipboard.import(&text),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read clipboard");
            vec![CLIPBOARD_READ_ERROR.to_string()]
        }
    }
}

/// Work every frame should perform before closing its palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Payload {
    Highlight {
        #[serde(rename = "regexString")]
        regex_string: String,
    },
    Write {
        buffer: Vec<String>,
        #[serde(rename = "sessionMode")]
        session_mode: SourceMode,
    },
}

/// Messages exchanged between the palette, the background relay and frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Message {
    /// Keyboard shortcut: open the palette in the focused frame.
    TogglePalette,
    /// Sent by a palette; the relay forwards it to every frame.
    BroadcastAndClose { payload: Payload },
    /// Delivered to each frame.
    ExecuteAndClose { payload: Payload },
}

impl Message {
    /// What the relay forwards to frames, if anything.
    pub fn relay(self) -> Option<Self> {
        match self {
            Self::BroadcastAndClose { payload } => Some(Self::ExecuteAndClose { payload }),
            Self::TogglePalette | Self::ExecuteAndClose { .. } => None,
        }
    }
}

/// What the host should do after a submitted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Text input continues; clear the prompt and hide output.
    AwaitInput,
    /// Show this text, or hide the output area on `None`.
    Render(Option<String>),
    /// Broadcast and close the palette.
    Broadcast(Message),
}

/// The interpreter's outcome together with the routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub outcome: Outcome,
    pub action: Action,
}

/// One palette session bound to a buffer source.
pub struct Palette {
    ed: Ed,
    source: SourceMode,
}

impl Palette {
    pub fn new(source: SourceMode, lines: Vec<String>, config: EdConfig) -> Self {
        tracing::debug!(source = source.as_flag(), lines = lines.len(), "opening palette");
        Self {
            ed: Ed::new(lines, config),
            source,
        }
    }

    /// Open a session over source text.
    pub fn from_text(source: SourceMode, text: &str, config: EdConfig) -> Self {
        Self::new(source, source.import(text), config)
    }

    pub const fn source(&self) -> SourceMode {
        self.source
    }

    pub const fn ed(&self) -> &Ed {
        &self.ed
    }

    pub const fn prompt(&self) -> &'static str {
        self.ed.prompt()
    }

    /// Run one line through the interpreter and route the result.
    pub fn submit(&mut self, line: &str) -> Submission {
        let outcome = self.ed.process(line);
        let action = self.route(line, &outcome);
        Submission { outcome, action }
    }

    fn route(&self, line: &str, outcome: &Outcome) -> Action {
        if matches!(outcome, Outcome::Input | Outcome::Continue) {
            return Action::AwaitInput;
        }
        if !self.ed.is_input_mode() {
            if let Some(regex) = highlight_request(line) {
                return Action::Broadcast(Message::BroadcastAndClose {
                    payload: Payload::Highlight {
                        regex_string: regex.to_string(),
                    },
                });
            }
        }
        if let Outcome::Saved { buffer, .. } = outcome {
            return Action::Broadcast(Message::BroadcastAndClose {
                payload: Payload::Write {
                    buffer: buffer.clone(),
                    session_mode: self.source,
                },
            });
        }
        Action::Render(
            outcome
                .text()
                .filter(|text| !text.is_empty())
                .map(ToOwned::to_owned),
        )
    }
}

/// `/regex/H` asks for the regex to be highlighted.
fn highlight_request(line: &str) -> Option<&str> {
    if line.len() > 2 && line.starts_with('/') && line.ends_with("/H") {
        Some(&line[1..line.len() - 2])
    } else {
        None
    }
}
