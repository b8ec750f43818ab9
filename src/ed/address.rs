//! Address resolution.
//!
//! Addresses resolve to 1-based line numbers without any bounds check;
//! each command validates the final [`LineRange`] itself.

use super::error::EdError;
use crate::pattern::Pattern;

/// Two 1-based line numbers produced by address resolution.
///
/// Values may be zero, negative or past the end until a command checks
/// them with [`LineRange::indices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: i64,
    pub end: i64,
}

impl LineRange {
    /// A range covering exactly one line.
    pub const fn single(line: i64) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    /// Zero-based inclusive indices of this range inside a buffer of `len` lines.
    ///
    /// # Errors
    /// [`EdError::InvalidAddress`] if `start < 1`, `end > len` or `start > end`.
    pub fn indices(self, len: usize) -> Result<(usize, usize), EdError> {
        if self.start < 1 || self.end > line_number(len) || self.start > self.end {
            return Err(EdError::InvalidAddress);
        }
        let first = usize::try_from(self.start - 1).map_err(|_| EdError::InvalidAddress)?;
        let last = usize::try_from(self.end - 1).map_err(|_| EdError::InvalidAddress)?;
        Ok((first, last))
    }
}

/// Whether a regex search may continue from the top of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    Around,
    Stop,
}

/// Resolves address text against a buffer.
pub struct Resolver<'a> {
    lines: &'a [String],
}

impl<'a> Resolver<'a> {
    pub const fn new(lines: &'a [String]) -> Self {
        Self { lines }
    }

    /// Resolve a full address (empty, `,`, `%`, `a,b` or a single address)
    /// relative to the 0-based cursor.
    pub fn range(&self, address: &str, current: usize) -> Result<LineRange, EdError> {
        let current = line_number(current);
        let range = if address.is_empty() {
            LineRange::single(current + 1)
        } else if address == "," || address == "%" {
            LineRange {
                start: 1,
                end: self.last().max(1),
            }
        } else if address.contains(',') {
            let mut sides = address.split(',');
            let left = sides.next().filter(|s| !s.is_empty()).unwrap_or("1");
            let right = sides.next().filter(|s| !s.is_empty()).unwrap_or("$");
            let start = self.single(left, current, Wrap::Around)?;
            let end = self.single(right, start - 1, Wrap::Stop)?;
            if start > end {
                return Err(EdError::InvalidRange);
            }
            LineRange { start, end }
        } else {
            LineRange::single(self.single(address, current, Wrap::Around)?)
        };
        tracing::trace!(address, ?range, "resolved address");
        Ok(range)
    }

    /// Resolve one address relative to a 0-based reference line.
    ///
    /// `reference` may be `-1` when the left side of a range resolved to 0.
    pub fn single(&self, addr: &str, reference: i64, wrap: Wrap) -> Result<i64, EdError> {
        match addr {
            "." | "" => return Ok(reference + 1),
            "$" => return Ok(self.last()),
            _ => {}
        }
        if let Some(n) = leading_integer(addr) {
            return Ok(n);
        }
        if let Some(source) = addr.strip_prefix('/').and_then(|s| s.strip_suffix('/')) {
            return self.search(source, reference, wrap);
        }
        Err(EdError::InvalidAddress)
    }

    /// Find the first line after `reference` matching `source`, optionally
    /// wrapping to the top and ending at `reference` itself.
    fn search(&self, source: &str, reference: i64, wrap: Wrap) -> Result<i64, EdError> {
        let pattern = Pattern::compile(source).map_err(|_| EdError::InvalidAddressRegex)?;
        let len = self.lines.len();
        let after = usize::try_from(reference + 1).unwrap_or(0);
        let wrapped = match wrap {
            Wrap::Around => usize::try_from(reference).map_or(0, |r| r.saturating_add(1).min(len)),
            Wrap::Stop => 0,
        };
        (after..len)
            .chain(0..wrapped)
            .find(|&idx| pattern.is_match(&self.lines[idx]))
            .map(|idx| line_number(idx) + 1)
            .ok_or(EdError::NoMatch)
    }

    fn last(&self) -> i64 {
        line_number(self.lines.len())
    }
}

fn line_number(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Read an optionally signed run of leading digits, ignoring whatever follows.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_empty_address_is_current_line() {
        let buf = lines(&["a", "b", "c"]);
        let r = Resolver::new(&buf).range("", 1).unwrap();
        assert_eq!(r, LineRange::single(2));
    }

    #[test]
    fn test_comma_and_percent_cover_buffer() {
        let buf = lines(&["a", "b", "c"]);
        let resolver = Resolver::new(&buf);
        assert_eq!(resolver.range(",", 0).unwrap(), LineRange { start: 1, end: 3 });
        assert_eq!(resolver.range("%", 2).unwrap(), LineRange { start: 1, end: 3 });
    }

    #[test]
    fn test_full_range_of_empty_buffer_is_line_one() {
        let buf: Vec<String> = Vec::new();
        assert_eq!(
            Resolver::new(&buf).range(",", 0).unwrap(),
            LineRange { start: 1, end: 1 }
        );
    }

    #[test]
    fn test_open_sides_default_to_first_and_last() {
        let buf = lines(&["a", "b", "c", "d"]);
        let resolver = Resolver::new(&buf);
        assert_eq!(resolver.range(",2", 3).unwrap(), LineRange { start: 1, end: 2 });
        assert_eq!(resolver.range("3,", 0).unwrap(), LineRange { start: 3, end: 4 });
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let buf = lines(&["a", "b", "c"]);
        assert_eq!(
            Resolver::new(&buf).range("3,1", 0),
            Err(EdError::InvalidRange)
        );
    }

    #[test]
    fn test_numbers_are_not_bounds_checked() {
        let buf = lines(&["a"]);
        assert_eq!(Resolver::new(&buf).range("9", 0).unwrap(), LineRange::single(9));
    }

    #[test]
    fn test_leading_integer_ignores_trailing_text() {
        assert_eq!(leading_integer("12x"), Some(12));
        assert_eq!(leading_integer(" -3"), Some(-3));
        assert_eq!(leading_integer("+4"), Some(4));
        assert_eq!(leading_integer("x1"), None);
        assert_eq!(leading_integer("-"), None);
    }

    #[test]
    fn test_regex_searches_forward_from_cursor() {
        let buf = lines(&["x one", "two", "x three"]);
        let resolver = Resolver::new(&buf);
        assert_eq!(resolver.single("/x/", 0, Wrap::Around), Ok(3));
    }

    #[test]
    fn test_regex_wraps_to_reference_line() {
        let buf = lines(&["x one", "two", "three"]);
        let resolver = Resolver::new(&buf);
        assert_eq!(resolver.single("/x/", 0, Wrap::Around), Ok(1));
        assert_eq!(resolver.single("/x/", 2, Wrap::Around), Ok(1));
    }

    #[test]
    fn test_regex_without_wrap_fails_past_end() {
        let buf = lines(&["x one", "two", "three"]);
        let resolver = Resolver::new(&buf);
        assert_eq!(resolver.single("/x/", 0, Wrap::Stop), Err(EdError::NoMatch));
    }

    #[test]
    fn test_regex_on_empty_buffer_has_no_match() {
        let buf: Vec<String> = Vec::new();
        assert_eq!(
            Resolver::new(&buf).single("/x/", 0, Wrap::Around),
            Err(EdError::NoMatch)
        );
    }

    #[test]
    fn test_invalid_regex_in_address() {
        let buf = lines(&["a"]);
        assert_eq!(
            Resolver::new(&buf).single("/(/", 0, Wrap::Around),
            Err(EdError::InvalidAddressRegex)
        );
    }

    #[test]
    fn test_unrecognized_address() {
        let buf = lines(&["a"]);
        let resolver = Resolver::new(&buf);
        assert_eq!(resolver.single("?x?", 0, Wrap::Around), Err(EdError::InvalidAddress));
        assert_eq!(resolver.single("/", 0, Wrap::Around), Err(EdError::InvalidAddress));
    }

    #[test]
    fn test_indices_validate_bounds_and_order() {
        assert_eq!(LineRange { start: 1, end: 3 }.indices(3), Ok((0, 2)));
        assert_eq!(LineRange { start: 0, end: 1 }.indices(3), Err(EdError::InvalidAddress));
        assert_eq!(LineRange { start: 2, end: 4 }.indices(3), Err(EdError::InvalidAddress));
        assert_eq!(LineRange { start: 3, end: 2 }.indices(3), Err(EdError::InvalidAddress));
    }
}
