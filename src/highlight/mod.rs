//! Regex highlighting over segmented text.
//!
//! A page's visible text arrives as an ordered list of segments (one per
//! text node). [`TextMap`] flattens them so a pattern can match across
//! segment boundaries, and [`plan`] turns each capture group of each match
//! into a [`HighlightSpan`] whose endpoints point back into the segments.
//!
//! Hosts that work with lines pass one segment per line, so an [`Anchor`]
//! is a line and column.
//!
//! Spans come out last-match-first, highest-group-first. Wrapping them in
//! that order never shifts the offsets of a span that is still pending.

use crossterm::style::{Color, Stylize};

use crate::pattern::Pattern;

/// Base class carried by every highlight element.
pub const HIGHLIGHT_CLASS: &str = "rh-highlight-span";

/// Background colours cycled by capture group.
pub const GROUP_COLORS: [Color; 3] = [
    Color::Yellow,
    Color::Rgb {
        r: 0xAD,
        g: 0xD8,
        b: 0xE6,
    },
    Color::Rgb {
        r: 0x90,
        g: 0xEE,
        b: 0x90,
    },
];

/// A position inside one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub segment: usize,
    pub offset: usize,
}

/// One capture group to wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Capture group index, starting at 1.
    pub group: usize,
    pub start: Anchor,
    pub end: Anchor,
    /// Byte range in the flattened text.
    pub flat: (usize, usize),
}

impl HighlightSpan {
    pub fn class_name(&self) -> String {
        format!("{HIGHLIGHT_CLASS} rh-highlight-g{}", self.group)
    }

    pub const fn color(&self) -> Color {
        GROUP_COLORS[(self.group.saturating_sub(1)) % GROUP_COLORS.len()]
    }
}

/// Flattened text plus the start offset of every segment.
#[derive(Debug, Clone, Default)]
pub struct TextMap {
    text: String,
    segments: Vec<(usize, usize)>,
}

impl TextMap {
    pub fn new<S: AsRef<str>>(segments: impl IntoIterator<Item = S>) -> Self {
        let mut map = Self::default();
        for segment in segments {
            let segment = segment.as_ref();
            map.segments.push((map.text.len(), segment.len()));
            map.text.push_str(segment);
        }
        map
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Map a flat byte range back onto segment anchors.
    ///
    /// The start lands in the first segment ending after `start`; the end in
    /// the first segment ending at or after `end`.
    pub fn locate(&self, start: usize, end: usize) -> Option<(Anchor, Anchor)> {
        let mut from = None;
        for (segment, &(seg_start, len)) in self.segments.iter().enumerate() {
            let seg_end = seg_start + len;
            if from.is_none() && seg_end > start {
                from = Some(Anchor {
                    segment,
                    offset: start - seg_start,
                });
            }
            if seg_end >= end {
                let to = Anchor {
                    segment,
                    offset: end.saturating_sub(seg_start),
                };
                return from.map(|from| (from, to));
            }
        }
        None
    }
}

/// Plan every capture-group span of `pattern` in `map`.
///
/// Group 0 is never highlighted; a pattern without groups yields nothing.
/// Groups that did not participate or matched empty text are skipped.
pub fn plan(pattern: &Pattern, map: &TextMap) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();
    if map.text.is_empty() {
        return spans;
    }
    let matches: Vec<_> = pattern.regex().captures_iter(&map.text).collect();
    for caps in matches.iter().rev() {
        for group in (1..caps.len()).rev() {
            let Some(m) = caps.get(group) else {
                continue;
            };
            if m.is_empty() {
                continue;
            }
            match map.locate(m.start(), m.end()) {
                Some((start, end)) => spans.push(HighlightSpan {
                    group,
                    start,
                    end,
                    flat: (m.start(), m.end()),
                }),
                None => tracing::warn!(
                    group,
                    start = m.start(),
                    end = m.end(),
                    "could not map highlight onto text segments"
                ),
            }
        }
    }
    tracing::debug!(
        pattern = pattern.as_str(),
        segments = map.segment_count(),
        spans = spans.len(),
        "planned highlights"
    );
    spans
}

/// Paint the spans onto `text` with terminal background colours.
///
/// Where groups nest, the innermost (highest numbered) group wins.
pub fn render_ansi(text: &str, spans: &[HighlightSpan]) -> String {
    let mut cuts: Vec<usize> = spans
        .iter()
        .flat_map(|span| [span.flat.0, span.flat.1])
        .chain([0, text.len()])
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut out = String::with_capacity(text.len());
    for window in cuts.windows(2) {
        let (from, to) = (window[0], window[1]);
        let piece = &text[from..to];
        let owner = spans
            .iter()
            .filter(|span| span.flat.0 <= from && to <= span.flat.1)
            .max_by_key(|span| span.group);
        match owner {
            Some(span) => out.push_str(&piece.on(span.color()).with(Color::Black).to_string()),
            None => out.push_str(piece),
        }
    }
    out
}
