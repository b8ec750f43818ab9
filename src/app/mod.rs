//! Line-oriented palette host.
//!
//! [`App`] opens a [`Palette`] over a file or the system clipboard, feeds it
//! one input line at a time and carries out whatever the palette asks for:
//! - render text, or nothing while text is being typed
//! - write the buffer back to where it came from and finish
//! - highlight a pattern's capture groups in the buffer and finish

mod effects;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::ed::{EdConfig, Outcome};
use crate::palette::{Action, Palette, SourceMode, clipboard_lines};

/// Where the buffer is read from and written back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Clipboard,
}

impl Target {
    /// Pick the target for an optional file and an optional `--source`.
    ///
    /// # Errors
    /// Returns an error when a file is combined with the clipboard source,
    /// when a file source is requested without a file, or when the file
    /// does not exist.
    pub fn resolve(file: Option<&Path>, source: Option<SourceMode>) -> Result<Self> {
        match (file, source) {
            (Some(path), Some(SourceMode::Clipboard)) => bail!(
                "--source clipboard edits the clipboard; drop {} or choose another source",
                path.display()
            ),
            (None, Some(source @ (SourceMode::TextField | SourceMode::Editable))) => bail!(
                "--source {} needs a FILE to edit",
                source.as_flag()
            ),
            (None, _) => Ok(Self::Clipboard),
            (Some(path), _) => {
                if !path.exists() {
                    bail!("File not found: {}", path.display());
                }
                Ok(Self::File(path.to_path_buf()))
            }
        }
    }
}

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The buffer was written back to the target.
    Written,
    /// A highlight was rendered.
    Highlighted,
    /// Input ran out before the session closed; nothing was written.
    EndOfInput,
}

/// Main application struct that owns the session settings.
pub struct App {
    target: Target,
    source: SourceMode,
    config: EdConfig,
    json: bool,
}

impl App {
    /// Create an application editing `target`.
    pub fn new(target: Target) -> Self {
        let source = match target {
            Target::File(_) => SourceMode::TextField,
            Target::Clipboard => SourceMode::Clipboard,
        };
        Self {
            target,
            source,
            config: EdConfig::default(),
            json: false,
        }
    }

    /// Choose how file contents are interpreted.
    pub const fn with_source(mut self, source: SourceMode) -> Self {
        self.source = source;
        self
    }

    pub const fn with_config(mut self, config: EdConfig) -> Self {
        self.config = config;
        self
    }

    /// Print every outcome as a JSON object instead of plain text.
    pub const fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Read the target and start a palette session over it.
    ///
    /// # Errors
    /// Returns an error if a file target cannot be read. Clipboard failures
    /// open a session over a diagnostic line instead.
    pub fn open(&self) -> Result<Palette> {
        match &self.target {
            Target::File(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(Palette::from_text(self.source, &text, self.config))
            }
            Target::Clipboard => {
                let lines =
                    clipboard_lines(arboard::Clipboard::new().and_then(|mut c| c.get_text()));
                Ok(Palette::new(self.source, lines, self.config))
            }
        }
    }

    /// Run a session on stdin/stdout.
    pub fn run(&self) -> Result<SessionEnd> {
        let mut palette = self.open()?;
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout().lock();
        self.run_with(&mut palette, stdin.lock(), &mut stdout)
    }

    /// Drive `palette` from `input` until it closes or input ends.
    pub fn run_with<R: BufRead, W: Write>(
        &self,
        palette: &mut Palette,
        mut input: R,
        output: &mut W,
    ) -> Result<SessionEnd> {
        let mut line = String::new();
        loop {
            let prompt = palette.prompt();
            if !prompt.is_empty() && !self.json {
                write!(output, "{prompt}")?;
            }
            output.flush()?;

            line.clear();
            if input.read_line(&mut line).context("Failed to read input")? == 0 {
                tracing::debug!("input closed without writing");
                return Ok(SessionEnd::EndOfInput);
            }
            let command = line.trim_end_matches(['\n', '\r']);
            let submission = palette.submit(command);

            if self.json {
                writeln!(output, "{}", serde_json::to_string(&submission.outcome)?)?;
            }

            match submission.action {
                Action::AwaitInput | Action::Render(None) => {}
                Action::Render(Some(text)) => {
                    if !self.json {
                        writeln!(output, "{text}")?;
                    }
                }
                Action::Broadcast(message) => {
                    if let Outcome::Saved { output: text, .. } = &submission.outcome {
                        if !self.json {
                            writeln!(output, "{text}")?;
                        }
                    }
                    let Some(delivered) = message.relay() else {
                        continue;
                    };
                    return self.execute(delivered, palette.ed().buffer(), output);
                }
            }
        }
    }
}
