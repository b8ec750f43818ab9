//! Runtime regex compilation for user-typed patterns.
//!
//! Address searches, substitutions and highlight requests all compile
//! pattern text that arrives at runtime. [`Pattern`] wraps the compiled
//! matcher so callers only see "compiled" or [`PatternError`].

use std::borrow::Cow;

use regex::{Captures, Regex, Replacer};
use thiserror::Error;

/// Pattern text could not be compiled.
#[derive(Debug, Error)]
#[error("invalid pattern: {0}")]
pub struct PatternError(#[from] regex::Error);

/// A compiled, user-supplied regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile pattern text.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the text is not a valid regular expression.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        Ok(Self {
            regex: Regex::new(source)?,
        })
    }

    /// The pattern source text.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub(crate) const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Replace the first match (or every match when `global`) in `line`.
    ///
    /// The replacement template understands `$&`, `$1`..`$99`, `` $` ``,
    /// `$'` and `$$`. Anything else is copied literally.
    pub fn replace<'a>(&self, line: &'a str, template: &str, global: bool) -> Cow<'a, str> {
        let replacer = Template {
            haystack: line,
            template,
        };
        if global {
            self.regex.replace_all(line, replacer)
        } else {
            self.regex.replacen(line, 1, replacer)
        }
    }
}

struct Template<'h, 't> {
    haystack: &'h str,
    template: &'t str,
}

impl Replacer for Template<'_, '_> {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        let Some(whole) = caps.get(0) else {
            return;
        };
        let bytes = self.template.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b'$' || i + 1 >= bytes.len() {
                let ch_len = self.template[i..].chars().next().map_or(1, char::len_utf8);
                dst.push_str(&self.template[i..i + ch_len]);
                i += ch_len;
                continue;
            }
            match bytes[i + 1] {
                b'$' => {
                    dst.push('$');
                    i += 2;
                }
                b'&' => {
                    dst.push_str(whole.as_str());
                    i += 2;
                }
                b'`' => {
                    dst.push_str(&self.haystack[..whole.start()]);
                    i += 2;
                }
                b'\'' => {
                    dst.push_str(&self.haystack[whole.end()..]);
                    i += 2;
                }
                b'0'..=b'9' => {
                    let (group, used) = group_reference(&bytes[i + 1..], caps.len());
                    if let Some(group) = group {
                        if let Some(m) = caps.get(group) {
                            dst.push_str(m.as_str());
                        }
                        i += 1 + used;
                    } else {
                        dst.push('$');
                        i += 1;
                    }
                }
                _ => {
                    dst.push('$');
                    i += 1;
                }
            }
        }
    }
}

/// Resolve `$n` / `$nn` against the number of groups, preferring two digits
/// when that group exists. Returns the group and the digits consumed.
fn group_reference(digits: &[u8], group_count: usize) -> (Option<usize>, usize) {
    let first = usize::from(digits[0] - b'0');
    if let Some(&second) = digits.get(1).filter(|b| b.is_ascii_digit()) {
        let two = first * 10 + usize::from(second - b'0');
        if two >= 1 && two < group_count {
            return (Some(two), 2);
        }
    }
    if first >= 1 && first < group_count {
        (Some(first), 1)
    } else {
        (None, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_rejects_unbalanced_group() {
        assert!(Pattern::compile("(abc").is_err());
    }

    #[test]
    fn test_replace_first_only_without_global() {
        let p = Pattern::compile("o").unwrap();
        assert_eq!(p.replace("foo boo", "0", false), "f0o boo");
    }

    #[test]
    fn test_replace_all_with_global() {
        let p = Pattern::compile("o").unwrap();
        assert_eq!(p.replace("foo boo", "0", true), "f00 b00");
    }

    #[test]
    fn test_replace_expands_group_followed_by_text() {
        let p = Pattern::compile("(w)orld").unwrap();
        assert_eq!(p.replace("world", "$1abc", false), "wabc");
    }

    #[test]
    fn test_replace_whole_match_and_dollar_escape() {
        let p = Pattern::compile("cat").unwrap();
        assert_eq!(p.replace("a cat", "[$&] $$", false), "a [cat] $");
    }

    #[test]
    fn test_replace_prefix_and_suffix() {
        let p = Pattern::compile("b").unwrap();
        assert_eq!(p.replace("abc", "<$`|$'>", false), "a<a|c>c");
    }

    #[test]
    fn test_replace_unknown_group_is_literal() {
        let p = Pattern::compile("x").unwrap();
        assert_eq!(p.replace("x", "$5", false), "$5");
    }

    #[test]
    fn test_replace_without_match_borrows() {
        let p = Pattern::compile("zzz").unwrap();
        assert!(matches!(p.replace("abc", "y", true), Cow::Borrowed("abc")));
    }
}
