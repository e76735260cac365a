//! Structured view of an `#EXTINF:` metadata line
//!
//! A metadata line is split into the duration token, an ordered list of
//! `key="value"` attributes and the title that follows the separator comma.
//! Whitespace around attributes is kept so that an untouched line renders back
//! to exactly the input text, and editing one attribute leaves every other
//! byte of the line alone.

use std::fmt;

/// Directive that opens a channel entry
pub const EXTINF_PREFIX: &str = "#EXTINF:";

/// Attribute carrying the player-side category
pub const GROUP_TITLE: &str = "group-title";

/// One attribute token of an EXTINF line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtinfAttribute {
    /// Whitespace preceding the token
    leading: String,
    key: String,
    /// `None` for bare tokens without `=`
    value: Option<String>,
    quoted: bool,
    /// False when the closing quote is missing from the source line
    closed: bool,
}

impl ExtinfAttribute {
    fn quoted(key: &str, value: &str) -> Self {
        Self {
            leading: " ".to_string(),
            key: key.to_string(),
            value: Some(value.to_string()),
            quoted: true,
            closed: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for ExtinfAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.leading)?;
        f.write_str(&self.key)?;
        match (&self.value, self.quoted) {
            (Some(value), true) if self.closed => write!(f, "=\"{value}\""),
            (Some(value), true) => write!(f, "=\"{value}"),
            (Some(value), false) => write!(f, "={value}"),
            (None, _) => Ok(()),
        }
    }
}

/// Parsed `#EXTINF:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtinfLine {
    duration: String,
    attributes: Vec<ExtinfAttribute>,
    /// Whitespace between the last attribute and the separator comma
    trailing: String,
    /// Everything after the separator comma, verbatim
    title: Option<String>,
}

impl ExtinfLine {
    /// Start a canonical line with the given duration and no attributes
    pub fn new(duration: &str) -> Self {
        Self {
            duration: duration.to_string(),
            attributes: Vec::new(),
            trailing: String::new(),
            title: None,
        }
    }

    /// Parse a metadata line. Returns `None` when the line does not start with
    /// `#EXTINF:`.
    ///
    /// The separator is the first comma outside a quoted value, so attribute
    /// values may themselves contain commas. On a line with an unbalanced quote
    /// the first comma is used instead.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix(EXTINF_PREFIX)?;

        let (head, title) = match find_separator(rest) {
            Some(pos) => (&rest[..pos], Some(rest[pos + 1..].to_string())),
            None => (rest, None),
        };

        let duration_end = token_end(head, skip_whitespace(head, 0));
        let duration = head[..duration_end].to_string();

        let mut attributes = Vec::new();
        let mut cursor = duration_end;
        loop {
            let start = skip_whitespace(head, cursor);
            if start >= head.len() {
                break;
            }
            let (attribute, end) = parse_attribute(head, cursor, start);
            attributes.push(attribute);
            cursor = end;
        }

        Some(Self {
            duration,
            attributes,
            trailing: head[cursor..].to_string(),
            title,
        })
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn attributes(&self) -> &[ExtinfAttribute] {
        &self.attributes
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Value of the first attribute named `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key)
            .and_then(ExtinfAttribute::value)
    }

    /// Number of attributes named `key`
    pub fn attribute_count(&self, key: &str) -> usize {
        self.attributes.iter().filter(|attr| attr.key == key).count()
    }

    /// Copy of this line with `key` set to `value`.
    ///
    /// The first occurrence keeps its position and spacing and gets the new
    /// value; later occurrences are removed. When the key is absent it is
    /// appended after the last attribute, i.e. right before the separator
    /// comma.
    pub fn with_attribute(&self, key: &str, value: &str) -> Self {
        let mut updated = self.clone();
        let mut seen = false;
        updated.attributes.retain_mut(|attr| {
            if attr.key != key {
                return true;
            }
            if seen {
                return false;
            }
            seen = true;
            attr.value = Some(value.to_string());
            attr.quoted = true;
            attr.closed = true;
            true
        });
        if !seen {
            updated.attributes.push(ExtinfAttribute::quoted(key, value));
        }
        updated
    }

    /// Copy of this line with the title replaced
    pub fn with_title(&self, title: &str) -> Self {
        let mut updated = self.clone();
        updated.title = Some(title.to_string());
        updated
    }
}

impl fmt::Display for ExtinfLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(EXTINF_PREFIX)?;
        f.write_str(&self.duration)?;
        for attribute in &self.attributes {
            write!(f, "{attribute}")?;
        }
        f.write_str(&self.trailing)?;
        if let Some(title) = &self.title {
            write!(f, ",{title}")?;
        }
        Ok(())
    }
}

/// Channel display name: text after the last comma, trimmed.
///
/// Names that themselves contain a comma are cut at their last comma. Lines
/// without any comma have no display name.
pub fn display_name(metadata_line: &str) -> Option<&str> {
    metadata_line
        .rfind(',')
        .map(|pos| metadata_line[pos + 1..].trim())
}

fn find_separator(text: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (pos, ch) in text.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some(pos),
            _ => {}
        }
    }
    if in_quotes {
        text.find(',')
    } else {
        None
    }
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    text[from..]
        .find(|ch: char| !ch.is_whitespace())
        .map_or(text.len(), |offset| from + offset)
}

fn token_end(text: &str, from: usize) -> usize {
    text[from..]
        .find(char::is_whitespace)
        .map_or(text.len(), |offset| from + offset)
}

/// Parse one attribute whose leading whitespace spans `cursor..start`.
/// Returns the attribute and the byte offset just past it.
fn parse_attribute(head: &str, cursor: usize, start: usize) -> (ExtinfAttribute, usize) {
    let leading = head[cursor..start].to_string();
    let key_end = head[start..]
        .find(|ch: char| ch == '=' || ch.is_whitespace())
        .map_or(head.len(), |offset| start + offset);
    let key = head[start..key_end].to_string();

    if !head[key_end..].starts_with('=') {
        let attribute = ExtinfAttribute {
            leading,
            key,
            value: None,
            quoted: false,
            closed: true,
        };
        return (attribute, key_end);
    }

    let value_start = key_end + 1;
    if head[value_start..].starts_with('"') {
        let inner_start = value_start + 1;
        let (value, end, closed) = match head[inner_start..].find('"') {
            Some(offset) => (
                &head[inner_start..inner_start + offset],
                inner_start + offset + 1,
                true,
            ),
            // Unterminated quote swallows the rest of the attribute section
            None => (&head[inner_start..], head.len(), false),
        };
        let attribute = ExtinfAttribute {
            leading,
            key,
            value: Some(value.to_string()),
            quoted: true,
            closed,
        };
        (attribute, end)
    } else {
        let end = token_end(head, value_start);
        let attribute = ExtinfAttribute {
            leading,
            key,
            value: Some(head[value_start..end].to_string()),
            quoted: false,
            closed: true,
        };
        (attribute, end)
    }
}
