//! Excerpt highlighting for answer text.
//!
//! Each theme attributes an excerpt (a literal substring) of an answer to itself.
//! This module locates those excerpts in the answer text and splits the text into
//! plain and marked segments, one color per theme, without nesting or overlap.
//!
//! Conflict resolution is leftmost-wins: candidate spans are ordered by start offset
//! and a span is kept only if it starts at or after the end of the last kept span.
//! An excerpt that no longer occurs in the text is dropped silently.
//!
//! [`segments`] works on raw text for the terminal renderer; [`annotate`] escapes
//! first and emits `<mark>` markup, computing every offset against the escaped text.

use crate::color::{theme_color, Rgb};
use crate::ids::AnswerId;
use crate::types::TopicResult;

/// One excerpt to mark and the color to mark it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub excerpt: String,
    pub color: Rgb,
}

impl Highlight {
    pub fn new(excerpt: impl Into<String>, color: Rgb) -> Self {
        Self { excerpt: excerpt.into(), color }
    }
}

/// A slice of the source text, either untouched or marked with a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Marked { text: &'a str, color: Rgb },
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Plain(text) | Segment::Marked { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    color: Rgb,
}

/// Escapes `&`, `<` and `>` so the text can be embedded in markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Byte range of the first case-insensitive occurrence of `needle` in `haystack`.
///
/// Characters are compared by their lowercase forms one at a time, so the returned
/// offsets always fall on character boundaries of `haystack`.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return None;
    }
    'outer: for (start, _) in haystack.char_indices() {
        let mut rest = haystack[start..].char_indices();
        let mut end = start;
        for &n in &needle {
            match rest.next() {
                Some((offset, h)) if chars_eq_ignore_case(h, n) => {
                    end = start + offset + h.len_utf8();
                }
                _ => continue 'outer,
            }
        }
        return Some((start, end));
    }
    None
}

fn kept_spans(text: &str, highlights: &[Highlight]) -> Vec<Span> {
    let mut candidates: Vec<Span> = highlights
        .iter()
        .filter(|h| !h.excerpt.trim().is_empty())
        .filter_map(|h| {
            find_ignore_case(text, &h.excerpt).map(|(start, end)| Span { start, end, color: h.color })
        })
        .collect();
    // Stable: equal starts keep their input order, so the earlier highlight wins.
    candidates.sort_by_key(|s| s.start);

    let mut kept: Vec<Span> = Vec::with_capacity(candidates.len());
    for span in candidates {
        if kept.last().is_none_or(|last| span.start >= last.end) {
            kept.push(span);
        }
    }
    kept
}

/// Splits `text` into plain and marked segments.
///
/// Concatenating the returned segments reproduces `text` exactly. Empty plain
/// segments are omitted.
pub fn segments<'a>(text: &'a str, highlights: &[Highlight]) -> Vec<Segment<'a>> {
    let mut out = Vec::new();
    let mut pos = 0;
    for span in kept_spans(text, highlights) {
        if span.start > pos {
            out.push(Segment::Plain(&text[pos..span.start]));
        }
        out.push(Segment::Marked { text: &text[span.start..span.end], color: span.color });
        pos = span.end;
    }
    if pos < text.len() {
        out.push(Segment::Plain(&text[pos..]));
    }
    out
}

/// Escapes `text` and wraps every kept excerpt match in a colored `<mark>`.
///
/// With no highlights (or none found) this is exactly [`escape_markup`].
pub fn annotate(text: &str, highlights: &[Highlight]) -> String {
    let escaped = escape_markup(text);
    let escaped_highlights: Vec<Highlight> = highlights
        .iter()
        .map(|h| Highlight { excerpt: escape_markup(&h.excerpt), color: h.color })
        .collect();

    let mut out = String::with_capacity(escaped.len());
    for segment in segments(&escaped, &escaped_highlights) {
        match segment {
            Segment::Plain(text) => out.push_str(text),
            Segment::Marked { text, color } => {
                out.push_str("<mark style=\"background-color:");
                out.push_str(&color.to_string());
                out.push_str(";border-radius:2px;padding:0 1px;\">");
                out.push_str(text);
                out.push_str("</mark>");
            }
        }
    }
    out
}

/// Collects `(excerpt, theme color)` for every theme that quotes `answer`,
/// in theme display order.
pub fn answer_highlights(result: &TopicResult, answer: &AnswerId) -> Vec<Highlight> {
    let sorted = result.sorted_themes();
    sorted
        .iter()
        .filter_map(|theme| {
            theme
                .excerpt_for(answer)
                .map(|excerpt| Highlight::new(excerpt, theme_color(theme, &sorted, result)))
        })
        .collect()
}

/// Highlight for one theme's sample answer: its own excerpt in the theme's color.
pub fn sample_highlight(excerpt: &str, color: Rgb) -> Vec<Highlight> {
    if excerpt.trim().is_empty() {
        return Vec::new();
    }
    vec![Highlight::new(excerpt, color)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::categorical_color;
    use crate::types::Theme;

    const C1: Rgb = Rgb::new(0x11, 0x11, 0x11);
    const C2: Rgb = Rgb::new(0x22, 0x22, 0x22);

    #[test]
    fn no_highlights_is_plain_escaping() {
        assert_eq!(annotate("a < b & c", &[]), "a &lt; b &amp; c");
    }

    #[test]
    fn leftmost_overlapping_excerpt_wins() {
        let out = annotate(
            "The food was great",
            &[Highlight::new("food was", C1), Highlight::new("was great", C2)],
        );
        assert_eq!(
            out,
            "The <mark style=\"background-color:#111111;border-radius:2px;padding:0 1px;\">food was</mark> great"
        );
    }

    #[test]
    fn later_listed_excerpt_that_starts_earlier_still_wins() {
        let parts = segments("The food was great", &[Highlight::new("was great", C2), Highlight::new("food", C1)]);
        let marked: Vec<&str> = parts
            .iter()
            .filter_map(|s| match s {
                Segment::Marked { text, .. } => Some(*text),
                Segment::Plain(_) => None,
            })
            .collect();
        assert_eq!(marked, ["food", "was great"]);
    }

    #[test]
    fn matching_ignores_case_and_keeps_source_casing() {
        let parts = segments("Parking is AWFUL here", &[Highlight::new("awful", C1)]);
        assert_eq!(parts[1], Segment::Marked { text: "AWFUL", color: C1 });
    }

    #[test]
    fn blank_and_missing_excerpts_are_dropped() {
        let text = "nothing to see";
        let parts = segments(text, &[Highlight::new("   ", C1), Highlight::new("absent", C2)]);
        assert_eq!(parts, vec![Segment::Plain(text)]);
    }

    #[test]
    fn excerpts_are_matched_against_escaped_text() {
        let out = annotate("salary < expectations", &[Highlight::new("< expect", C1)]);
        assert!(out.contains(">&lt; expect</mark>"), "{out}");
    }

    #[test]
    fn segments_concatenate_back_to_the_input() {
        let text = "Ünïcode wait times; long WAIT times, wait";
        let parts = segments(
            text,
            &[Highlight::new("wait times", C1), Highlight::new("times; long", C2), Highlight::new("ünïcode", C2)],
        );
        let joined: String = parts.iter().map(Segment::text).collect();
        assert_eq!(joined, text);
        assert!(parts.windows(2).all(|w| !matches!(
            (w[0], w[1]),
            (Segment::Plain(_), Segment::Plain(_))
        )));
    }

    #[test]
    fn annotate_is_deterministic() {
        let hl = [Highlight::new("a", C1), Highlight::new("b", C2)];
        assert_eq!(annotate("a b a b", &hl), annotate("a b a b", &hl));
    }

    #[test]
    fn answer_highlights_follow_theme_order_and_colors() {
        let answer = AnswerId::from(5);
        let mut small = Theme { name: "Small".into(), count: 1, ..Theme::default() };
        small.answer_ids.push(answer.clone());
        small.excerpts.insert(answer.clone(), "late".into());
        let mut big = Theme { name: "Big".into(), count: 8, ..Theme::default() };
        big.answer_ids.push(answer.clone());
        big.excerpts.insert(answer.clone(), "bus".into());
        let result = TopicResult { themes: vec![small, big], ..TopicResult::default() };

        let hl = answer_highlights(&result, &answer);
        assert_eq!(
            hl,
            vec![Highlight::new("bus", categorical_color(0)), Highlight::new("late", categorical_color(1))]
        );
    }

    #[test]
    fn sample_highlight_marks_only_its_excerpt() {
        let marked = sample_highlight("pay is low", C1);
        assert_eq!(
            segments("Honestly the Pay is low here", &marked),
            vec![
                Segment::Plain("Honestly the "),
                Segment::Marked { text: "Pay is low", color: C1 },
                Segment::Plain(" here"),
            ]
        );
        assert!(sample_highlight("  ", C1).is_empty());
    }
}
