//! Chart metrics for the results view: theme shares, bar widths and the
//! sentiment histogram.

use crate::types::{ScoredAnswer, Theme};

/// Height (in chart units) of the tallest histogram bar.
pub const HISTOGRAM_HEIGHT: f64 = 80.0;
/// Minimum height of a non-empty histogram bar so single answers stay visible.
pub const HISTOGRAM_MIN_BAR: f64 = 4.0;

/// Share of `answer_count` that the theme covers, in percent. Zero when nothing was answered.
pub fn theme_percent(theme: &Theme, answer_count: u32) -> f64 {
    if answer_count == 0 {
        return 0.0;
    }
    f64::from(theme.count) / f64::from(answer_count) * 100.0
}

pub fn max_theme_count(themes: &[Theme]) -> u32 {
    themes.iter().map(|t| t.count).max().unwrap_or(0)
}

/// Width of a theme bar as a percentage of the largest theme.
pub fn bar_width(count: u32, themes: &[Theme]) -> f64 {
    let max = max_theme_count(themes).max(1);
    f64::from(count) / f64::from(max) * 100.0
}

fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// Number of answers per rounded score; index 0 holds score 1, index 9 score 10.
///
/// Unscored answers and scores that round outside 1..=10 are not counted.
pub fn score_histogram(answers: &[ScoredAnswer]) -> [usize; 10] {
    let mut buckets = [0usize; 10];
    for score in answers.iter().filter_map(|a| a.score) {
        let rounded = round_half_up(score);
        if (1..=10).contains(&rounded) {
            buckets[(rounded - 1) as usize] += 1;
        }
    }
    buckets
}

/// Bar height for `score` (1..=10) relative to the fullest bucket.
pub fn score_bar_height(score: u8, answers: &[ScoredAnswer]) -> f64 {
    if !(1..=10).contains(&score) {
        return 0.0;
    }
    let buckets = score_histogram(answers);
    let count = buckets[usize::from(score - 1)];
    if count == 0 {
        return 0.0;
    }
    let max = buckets.iter().copied().max().unwrap_or(1).max(1);
    (count as f64 / max as f64 * HISTOGRAM_HEIGHT).max(HISTOGRAM_MIN_BAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::AnswerId;

    fn scored(id: i64, score: Option<f64>) -> ScoredAnswer {
        ScoredAnswer { id: AnswerId::from(id), score }
    }

    fn theme(count: u32) -> Theme {
        Theme { name: format!("t{count}"), count, ..Theme::default() }
    }

    #[test]
    fn percent_is_zero_without_answers() {
        assert_eq!(theme_percent(&theme(3), 0), 0.0);
        assert_eq!(format!("{:.1}", theme_percent(&theme(1), 3)), "33.3");
    }

    #[test]
    fn bar_width_is_relative_to_the_largest_theme() {
        let themes = vec![theme(4), theme(2)];
        assert_eq!(bar_width(2, &themes), 50.0);
        assert_eq!(bar_width(0, &[theme(0)]), 0.0);
    }

    #[test]
    fn histogram_rounds_half_up_and_skips_unscored() {
        let answers = vec![scored(1, Some(6.5)), scored(2, Some(7.0)), scored(3, None), scored(4, Some(1.2))];
        let buckets = score_histogram(&answers);
        assert_eq!(buckets[6], 2);
        assert_eq!(buckets[0], 1);
        assert_eq!(buckets.iter().sum::<usize>(), 3);
    }

    #[test]
    fn bar_height_has_a_visible_floor() {
        let mut answers: Vec<ScoredAnswer> = (0..40).map(|i| scored(i, Some(8.0))).collect();
        answers.push(scored(99, Some(2.0)));
        assert_eq!(score_bar_height(8, &answers), HISTOGRAM_HEIGHT);
        assert_eq!(score_bar_height(2, &answers), HISTOGRAM_MIN_BAR);
        assert_eq!(score_bar_height(5, &answers), 0.0);
    }
}
