//! Inline markup for assistant replies.
//!
//! Replies use a small asterisk grammar:
//!
//! - `*text*` is italic, `**text**` is bold, `***text***` is bold italic
//! - a line whose first non-blank characters are asterisks followed by
//!   whitespace is a bullet item
//!
//! Bullet lines are emitted whole; emphasis inside them is left as literal
//! asterisks. Asterisks that do not close a run pass through as plain text.
//! Parsing never fails.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Prefix placed in front of every bullet item
pub const BULLET_MARKER: &str = "• ";

/// Text of the segment emitted between two lines
pub const LINE_BREAK: &str = "\n";

/// Emphasis run: 1-3 asterisks, star-free content, 1-3 asterisks
const EMPHASIS_PATTERN: &str = r"\*{1,3}[^*]+\*{1,3}";

/// One atomically styled run of display text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormattedSegment {
    /// Display text with delimiters stripped
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bullet: bool,
}

impl FormattedSegment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Default::default()
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            italic: true,
            ..Default::default()
        }
    }

    pub fn bold_italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            italic: true,
            ..Default::default()
        }
    }

    /// A bullet item; `content` is given without the marker.
    pub fn bullet(content: &str) -> Self {
        Self {
            text: format!("{BULLET_MARKER}{content}"),
            bullet: true,
            ..Default::default()
        }
    }

    pub fn line_break() -> Self {
        Self::plain(LINE_BREAK)
    }

    /// True for the separator emitted between lines
    pub fn is_line_break(&self) -> bool {
        self.text == LINE_BREAK && !self.bold && !self.italic && !self.bullet
    }
}

fn emphasis_regex() -> Option<&'static Regex> {
    static EMPHASIS: OnceLock<Option<Regex>> = OnceLock::new();
    EMPHASIS
        .get_or_init(|| Regex::new(EMPHASIS_PATTERN).ok())
        .as_ref()
}

/// Parse raw reply text into styled segments.
///
/// Lines are separated by a [`FormattedSegment::line_break`] segment; no
/// separator follows the last line.
pub fn parse(raw: &str) -> Vec<FormattedSegment> {
    let lines: Vec<&str> = raw.split('\n').collect();
    let mut segments = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        match bullet_content(line) {
            Some(content) => segments.push(FormattedSegment::bullet(content)),
            None => scan_emphasis(line, &mut segments),
        }

        if index + 1 < lines.len() {
            segments.push(FormattedSegment::line_break());
        }
    }

    segments
}

/// Concatenate the display text of `segments`.
pub fn plain_text(segments: &[FormattedSegment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// Returns the item text when `line` is a bullet line.
fn bullet_content(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let after_stars = trimmed.trim_start_matches('*');

    if after_stars.len() == trimmed.len() {
        return None;
    }

    // `*word*` opens an emphasis run, not a bullet
    match after_stars.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(after_stars.trim_start()),
        Some(_) => None,
    }
}

fn scan_emphasis(line: &str, segments: &mut Vec<FormattedSegment>) {
    let Some(regex) = emphasis_regex() else {
        push_plain(line, segments);
        return;
    };

    let mut last_end = 0;
    for run in regex.find_iter(line) {
        push_plain(&line[last_end..run.start()], segments);
        push_emphasis(run.as_str(), segments);
        last_end = run.end();
    }
    push_plain(&line[last_end..], segments);
}

fn push_plain(piece: &str, segments: &mut Vec<FormattedSegment>) {
    if !piece.trim().is_empty() {
        segments.push(FormattedSegment::plain(piece));
    }
}

fn push_emphasis(run: &str, segments: &mut Vec<FormattedSegment>) {
    let opening = run.len() - run.trim_start_matches('*').len();
    let closing = run.len() - run.trim_end_matches('*').len();
    let content = run.trim_matches('*');

    if content.trim().is_empty() {
        return;
    }

    let segment = match opening.min(closing) {
        3 => FormattedSegment::bold_italic(content),
        2 => FormattedSegment::bold(content),
        _ => FormattedSegment::italic(content),
    };
    segments.push(segment);
}
