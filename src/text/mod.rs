//! # Text Wrapping
//!
//! Greedy word wrapping with real glyph advances. Mandatory breaks (LF, CR,
//! CRLF, VT, FF, NEL, LS, PS) start a new paragraph, lines break at UAX#14 opportunities, and a word that is
//! wider than the whole line is split between characters. Trailing spaces
//! never count towards a line's width.

use unicode_linebreak::linebreaks;

use crate::font::FontMetrics;

/// UAX#14 mandatory break characters. CRLF is folded to LF first.
const MANDATORY_BREAKS: [char; 7] = [
    '\n', '\r', '\u{000B}', '\u{000C}', '\u{0085}', '\u{2028}', '\u{2029}',
];

/// A line of text after wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    /// Width in points, excluding trailing whitespace.
    pub width: f64,
}

pub struct TextWrapper<'a> {
    metrics: &'a FontMetrics,
    font_size: f64,
}

impl<'a> TextWrapper<'a> {
    pub fn new(metrics: &'a FontMetrics, font_size: f64) -> Self {
        Self { metrics, font_size }
    }

    pub fn measure(&self, text: &str) -> f64 {
        self.metrics.measure_string(text, self.font_size)
    }

    /// Wrap `text` into lines no wider than `max_width` points.
    pub fn wrap(&self, text: &str, max_width: f64) -> Vec<WrappedLine> {
        let mut lines = Vec::new();
        let text = text.replace("\r\n", "\n");
        for paragraph in text.split(MANDATORY_BREAKS) {
            self.wrap_paragraph(paragraph, max_width, &mut lines);
        }
        lines
    }

    fn wrap_paragraph(&self, paragraph: &str, max_width: f64, lines: &mut Vec<WrappedLine>) {
        if paragraph.trim().is_empty() {
            lines.push(WrappedLine {
                text: String::new(),
                width: 0.0,
            });
            return;
        }

        let mut current = String::new();
        let mut start = 0;

        for (end, _) in linebreaks(paragraph) {
            let segment = &paragraph[start..end];
            start = end;

            let candidate = format!("{}{}", current, segment);
            if self.fits(candidate.trim_end(), max_width) {
                current = candidate;
                continue;
            }

            if !current.trim_end().is_empty() {
                self.push_line(&current, lines);
                current.clear();
            }

            if self.fits(segment.trim_end(), max_width) {
                current.push_str(segment);
            } else {
                current = self.split_long_word(segment, max_width, lines);
            }
        }

        if !current.trim_end().is_empty() {
            self.push_line(&current, lines);
        }
    }

    /// Emit full-width chunks of an over-long word, returning the remainder.
    fn split_long_word(&self, word: &str, max_width: f64, lines: &mut Vec<WrappedLine>) -> String {
        let mut chunk = String::new();
        for ch in word.chars() {
            chunk.push(ch);
            if !self.fits(chunk.trim_end(), max_width) && chunk.chars().count() > 1 {
                chunk.pop();
                self.push_line(&chunk, lines);
                chunk.clear();
                chunk.push(ch);
            }
        }
        chunk
    }

    fn fits(&self, text: &str, max_width: f64) -> bool {
        self.measure(text) <= max_width + 1e-9
    }

    fn push_line(&self, text: &str, lines: &mut Vec<WrappedLine>) {
        let text = text.trim_end().to_string();
        let width = self.measure(&text);
        lines.push(WrappedLine { text, width });
    }
}
