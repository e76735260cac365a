//! Two-line M3U entry scanner
//!
//! A channel entry is an `#EXTINF:` line immediately followed by a line that
//! starts with `http`. Everything else (header, comments, blank lines, orphan
//! metadata or URLs) is skipped one line at a time. Lines end at `\n`, `\r\n`
//! or a lone `\r`.

use tracing::trace;

use crate::models::{RawEntry, EXTINF_PREFIX};

/// Prefix a stream line must carry to pair with the preceding metadata line
pub const URL_PREFIX: &str = "http";

/// Lazy, single-pass iterator over the entries of a playlist
#[derive(Debug)]
pub struct M3uEntries<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
    skipped: usize,
}

impl<'a> M3uEntries<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: split_lines(content),
            cursor: 0,
            skipped: 0,
        }
    }

    /// Total number of lines in the playlist
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lines stepped over so far without producing an entry
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    fn is_entry_at(&self, index: usize) -> bool {
        match (self.lines.get(index), self.lines.get(index + 1)) {
            (Some(metadata), Some(url)) => {
                metadata.starts_with(EXTINF_PREFIX) && url.starts_with(URL_PREFIX)
            }
            _ => false,
        }
    }
}

impl<'a> Iterator for M3uEntries<'a> {
    type Item = RawEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.lines.len() {
            let index = self.cursor;
            if self.is_entry_at(index) {
                self.cursor += 2;
                return Some(RawEntry {
                    metadata_line: self.lines[index],
                    url_line: self.lines[index + 1],
                    line_number: index + 1,
                });
            }
            trace!("Skipping line {}: not the start of an entry", index + 1);
            self.skipped += 1;
            self.cursor += 1;
        }
        None
    }
}

/// Split on `\n`, `\r\n` and bare `\r`. A final terminator does not produce
/// an extra empty line.
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = content;
    while !rest.is_empty() {
        match rest.find(|ch: char| ch == '\n' || ch == '\r') {
            Some(pos) => {
                lines.push(&rest[..pos]);
                let terminator = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + terminator..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }
    lines
}

/// Scan playlist text into entries
pub fn parse_entries(content: &str) -> M3uEntries<'_> {
    M3uEntries::new(content)
}
