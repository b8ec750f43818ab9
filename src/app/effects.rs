use std::io::Write;

use anyhow::{Context, Result};

use crate::app::{App, SessionEnd, Target};
use crate::highlight::{TextMap, plan, render_ansi};
use crate::palette::{Message, Payload, SourceMode};
use crate::pattern::Pattern;

impl App {
    /// Carry out a message delivered to this frame.
    pub(super) fn execute<W: Write>(
        &self,
        message: Message,
        buffer: &[String],
        output: &mut W,
    ) -> Result<SessionEnd> {
        let Message::ExecuteAndClose { payload } = message else {
            return Ok(SessionEnd::EndOfInput);
        };
        match payload {
            Payload::Write {
                buffer: lines,
                session_mode,
            } => {
                self.write_back(session_mode, &lines)?;
                Ok(SessionEnd::Written)
            }
            Payload::Highlight { regex_string } => {
                self.highlight(&regex_string, buffer, output)?;
                Ok(SessionEnd::Highlighted)
            }
        }
    }

    fn write_back(&self, mode: SourceMode, lines: &[String]) -> Result<()> {
        let text = mode.export(lines);
        match &self.target {
            Target::File(path) => {
                std::fs::write(path, text)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::debug!(path = %path.display(), lines = lines.len(), "wrote buffer");
            }
            Target::Clipboard => {
                arboard::Clipboard::new()
                    .and_then(|mut clipboard| clipboard.set_text(text))
                    .context("Failed to write clipboard")?;
                tracing::debug!(lines = lines.len(), "copied buffer to clipboard");
            }
        }
        Ok(())
    }

    fn highlight<W: Write>(&self, regex: &str, buffer: &[String], output: &mut W) -> Result<()> {
        let pattern = match Pattern::compile(regex) {
            Ok(pattern) => pattern,
            Err(err) => {
                tracing::warn!(regex, error = %err, "invalid highlight pattern");
                if !self.json {
                    writeln!(output, "? invalid regex")?;
                }
                return Ok(());
            }
        };
        let last = buffer.len().saturating_sub(1);
        let map = TextMap::new(buffer.iter().enumerate().map(|(idx, line)| {
            if idx < last {
                format!("{line}\n")
            } else {
                line.clone()
            }
        }));
        let spans = plan(&pattern, &map);
        if self.json {
            let groups: Vec<_> = spans
                .iter()
                .rev()
                .map(|span| {
                    serde_json::json!({
                        "group": span.group,
                        "start": span.flat.0,
                        "end": span.flat.1,
                        "from": { "line": span.start.segment + 1, "column": span.start.offset },
                        "to": { "line": span.end.segment + 1, "column": span.end.offset },
                        "className": span.class_name(),
                    })
                })
                .collect();
            writeln!(output, "{}", serde_json::json!({ "highlights": groups }))?;
        } else {
            writeln!(output, "{}", render_ansi(map.text(), &spans))?;
        }
        Ok(())
    }
}
