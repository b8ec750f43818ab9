//! Content-editable markup to lines and back.

/// Elements whose end starts a new line.
const BLOCK_TAGS: &[&str] = &["p", "div", "pre", "h1", "h2", "h3", "h4", "h5", "h6"];

const ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", "\u{a0}"),
    ("&amp;", "&"),
];

/// Convert editable markup into the lines a reader sees.
///
/// `<br>` and the end of each block element become line breaks, other tags
/// are dropped, and surrounding whitespace is trimmed before splitting.
pub fn lines_from_markup(markup: &str) -> Vec<String> {
    let mut text = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('>') else {
            text.push_str(&rest[open..]);
            rest = "";
            break;
        };
        if let Some(tag) = Tag::parse(&after[..close]) {
            if tag.name == "br" || (tag.closing && BLOCK_TAGS.contains(&tag.name.as_str())) {
                text.push('\n');
            }
        }
        rest = &after[close + 1..];
    }
    text.push_str(rest);

    decode_entities(&text)
        .trim()
        .split('\n')
        .map(ToOwned::to_owned)
        .collect()
}

/// Escape each line and join them with `<br>`.
pub fn markup_from_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| escape(line))
        .collect::<Vec<_>>()
        .join("<br>")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        for (entity, replacement) in ENTITIES {
            if candidate.starts_with(entity) {
                out.push_str(replacement);
                rest = &candidate[entity.len()..];
                continue 'scan;
            }
        }
        out.push('&');
        rest = &candidate[1..];
    }
    out.push_str(rest);
    out
}

struct Tag {
    name: String,
    closing: bool,
}

impl Tag {
    fn parse(inner: &str) -> Option<Self> {
        let inner = inner.trim();
        let (closing, body) = match inner.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, inner),
        };
        let name: String = body
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        if name.is_empty() {
            return None;
        }
        Some(Self { name, closing })
    }
}
