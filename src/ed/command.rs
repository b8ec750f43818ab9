//! Command-line scanning and the substitute sub-grammar.

use super::error::EdError;

/// Command letter used when an address is given without one.
const DEFAULT_COMMAND: char = 'p';

/// A trimmed, non-empty command line split into its three parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// Everything before the command letter.
    pub address: &'a str,
    /// The command letter, `p` when only an address was typed.
    pub letter: char,
    /// Everything after the command letter. Only `s` reads it.
    pub tail: &'a str,
}

impl<'a> CommandLine<'a> {
    /// Split `input` at the first ASCII letter outside a `/.../` span.
    ///
    /// Returns `None` when there is neither an address nor a command.
    pub fn parse(input: &'a str) -> Option<Self> {
        let mut in_regex = false;
        let mut split = None;
        for (idx, ch) in input.char_indices() {
            if ch == '/' {
                in_regex = !in_regex;
                continue;
            }
            if !in_regex && ch.is_ascii_alphabetic() {
                split = Some((idx, ch));
                break;
            }
        }

        match split {
            Some((idx, letter)) => Some(Self {
                address: &input[..idx],
                letter,
                tail: &input[idx + letter.len_utf8()..],
            }),
            None if input.is_empty() => None,
            None => Some(Self {
                address: input,
                letter: DEFAULT_COMMAND,
                tail: "",
            }),
        }
    }
}

/// The `/pattern/replacement/flags` tail of an `s` command.
///
/// A `/` cannot be escaped, so neither part may contain one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution<'a> {
    pub pattern: &'a str,
    pub replacement: &'a str,
    pub global: bool,
}

impl<'a> Substitution<'a> {
    /// Parse the text that followed the `s`.
    ///
    /// # Errors
    /// [`EdError::InvalidSubstitute`] unless the tail is exactly three
    /// slash-separated fields with an empty or `g` flag field.
    pub fn parse(tail: &'a str) -> Result<Self, EdError> {
        let body = tail.strip_prefix('/').ok_or(EdError::InvalidSubstitute)?;
        let mut fields = body.split('/');
        let (Some(pattern), Some(replacement), Some(flags), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(EdError::InvalidSubstitute);
        };
        let global = match flags {
            "" => false,
            "g" => true,
            _ => return Err(EdError::InvalidSubstitute),
        };
        Ok(Self {
            pattern,
            replacement,
            global,
        })
    }
}
