//! Derived colors for themes, answers and the proportional chart.
//!
//! All functions here are pure. Colors are plain `Rgb` triples so the same values
//! feed both the terminal renderer and the `<mark>` markup of [`crate::highlight`].
//!
//! # Sentiment scale
//!
//! A score in `1..=10` is normalised to `n = (score - 1) / 9` and interpolated in
//! two linear segments that meet at `n = 0.5`:
//!
//! | n   | color                       |
//! |-----|-----------------------------|
//! | 0.0 | `SENTIMENT_LOW`  (red)      |
//! | 0.5 | `SENTIMENT_MID`  (yellow)   |
//! | 1.0 | `SENTIMENT_HIGH` (green)    |
//!
//! The breakpoint at 0.5 is part of the contract: both segments evaluate to
//! `SENTIMENT_MID` there, so the scale is continuous.

use std::fmt;

use crate::ids::AnswerId;
use crate::types::{sort_themes, Theme, TopicResult};

/// An opaque 24-bit display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn hex(v: u32) -> Self {
        Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fixed color for the "Other" theme and for absent sentiment.
pub const NEUTRAL: Rgb = Rgb::hex(0xd1d5db);
/// Background for an empty chart or an answer that belongs to no theme.
pub const EMPTY: Rgb = Rgb::hex(0xe5e7eb);

pub const SENTIMENT_LOW: Rgb = Rgb::new(254, 202, 202);
pub const SENTIMENT_MID: Rgb = Rgb::new(254, 240, 180);
pub const SENTIMENT_HIGH: Rgb = Rgb::new(187, 247, 208);

/// Categorical palette used when a theme has no sentiment data.
pub const PALETTE: [Rgb; 12] = [
    Rgb::hex(0xc7d2fe), // indigo-200
    Rgb::hex(0xa5b4fc), // indigo-300
    Rgb::hex(0xbfdbfe), // blue-200
    Rgb::hex(0x93c5fd), // blue-300
    Rgb::hex(0xc4b5fd), // violet-300
    Rgb::hex(0xd8b4fe), // purple-300
    Rgb::hex(0xa5f3fc), // cyan-200
    Rgb::hex(0x99f6e4), // teal-200
    Rgb::hex(0xbbf7d0), // green-200
    Rgb::hex(0xfde68a), // amber-200
    Rgb::hex(0xfed7aa), // orange-200
    Rgb::hex(0xfecaca), // red-200
];

fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let v = f64::from(from) + (f64::from(to) - f64::from(from)) * t;
    // Half-up rounding; inputs are already within 0..=255.
    (v + 0.5).floor().clamp(0.0, 255.0) as u8
}

fn lerp(from: Rgb, to: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp_channel(from.r, to.r, t),
        lerp_channel(from.g, to.g, t),
        lerp_channel(from.b, to.b, t),
    )
}

/// Maps a 1..=10 sentiment score onto the red → yellow → green scale.
///
/// `None` maps to [`NEUTRAL`]. Scores outside the range are clamped.
pub fn sentiment_color(score: Option<f64>) -> Rgb {
    let Some(score) = score.filter(|s| s.is_finite()) else {
        return NEUTRAL;
    };
    let n = ((score - 1.0) / 9.0).clamp(0.0, 1.0);
    if n <= 0.5 {
        lerp(SENTIMENT_LOW, SENTIMENT_MID, n * 2.0)
    } else {
        lerp(SENTIMENT_MID, SENTIMENT_HIGH, (n - 0.5) * 2.0)
    }
}

/// Cycles through [`PALETTE`].
pub fn categorical_color(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

/// Display color of `theme` given the display ordering of its siblings.
///
/// "Other" is always [`NEUTRAL`]. Otherwise the theme's mean sentiment wins when
/// `result` has any scored member answers, and the categorical color of the theme's
/// position in `sorted` is the fallback.
pub fn theme_color(theme: &Theme, sorted: &[&Theme], result: &TopicResult) -> Rgb {
    if theme.is_other() {
        return NEUTRAL;
    }
    if let Some(mean) = result.theme_sentiment(theme) {
        return sentiment_color(Some(mean));
    }
    let position = sorted.iter().position(|t| t.name == theme.name).unwrap_or(0);
    categorical_color(position)
}

/// Categorical color of the first displayed theme that contains `answer`.
///
/// Ignores sentiment so an answer keeps the color of its theme's row marker.
pub fn answer_theme_color(result: &TopicResult, answer: &AnswerId) -> Rgb {
    for (i, theme) in result.sorted_themes().iter().enumerate() {
        if theme.contains(answer) {
            return if theme.is_other() { NEUTRAL } else { categorical_color(i) };
        }
    }
    EMPTY
}

/// Coarse sentiment bucket used for badges and answer borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBand {
    Positive,
    Neutral,
    Negative,
}

pub fn sentiment_band(score: Option<f64>) -> Option<SentimentBand> {
    let score = score?;
    Some(if score >= 7.0 {
        SentimentBand::Positive
    } else if score >= 4.0 {
        SentimentBand::Neutral
    } else {
        SentimentBand::Negative
    })
}

pub fn sentiment_emoji(score: Option<f64>) -> &'static str {
    match sentiment_band(score) {
        Some(SentimentBand::Positive) => "😊",
        Some(SentimentBand::Neutral) => "😐",
        Some(SentimentBand::Negative) => "😟",
        None => "",
    }
}

/// One angular slice of the proportional chart, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonutSegment {
    pub color: Rgb,
    pub start: f64,
    pub end: f64,
}

impl DonutSegment {
    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }
}

/// Partitions 360° among the result's themes in display order.
///
/// Boundaries are computed from the running count total, so they are monotone and
/// the last one is exactly 360. With no themes or a zero total the chart is a single
/// [`EMPTY`] segment.
pub fn donut_segments(result: &TopicResult) -> Vec<DonutSegment> {
    let sorted = sort_themes(&result.themes);
    let total: u64 = sorted.iter().map(|t| u64::from(t.count)).sum();
    if total == 0 {
        return vec![DonutSegment { color: EMPTY, start: 0.0, end: 360.0 }];
    }

    let mut segments = Vec::with_capacity(sorted.len());
    let mut running: u64 = 0;
    let mut start = 0.0;
    for (i, theme) in sorted.iter().enumerate() {
        running += u64::from(theme.count);
        let end = if i + 1 == sorted.len() {
            360.0
        } else {
            running as f64 / total as f64 * 360.0
        };
        segments.push(DonutSegment { color: theme_color(theme, &sorted, result), start, end });
        start = end;
    }
    segments
}
