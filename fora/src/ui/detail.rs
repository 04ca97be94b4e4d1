//! Detail panel renderer for fora.
//!
//! Shows one of three views for the selected topic, chosen by its phase:
//! - **Setup**: status and the run/discover actions.
//! - **Editor**: the draft theme list and the re-discover prompt.
//! - **Results**: summary, proportional strip, theme bars and the sentiment
//!   histogram.

use fora_core::chart::{bar_width, score_bar_height, theme_percent, HISTOGRAM_HEIGHT};
use fora_core::color::{donut_segments, sentiment_emoji, theme_color, DonutSegment};
use fora_core::highlight::{sample_highlight, segments, Segment};
use fora_core::phase::Phase;
use fora_core::tracker::OpKind;
use fora_core::types::{Status, ThemeAnswer, TopicResult};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::app::{AppState, InputTarget, Mode, PanelFocus};
use crate::theme::{rgb, Theme};
use crate::ui::layout::{inner_rect, panel_block};

/// Rows used by the sentiment histogram.
const HISTOGRAM_ROWS: u16 = 6;
/// Widest bar drawn for the largest theme.
const MAX_BAR_CELLS: usize = 24;
/// Sample answers listed under an explored theme.
const MAX_SAMPLES: usize = 8;

pub fn render_detail(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Detail;
    let phase = state.phase();
    let title = match phase {
        Phase::None => "Detail",
        Phase::Setup => "Setup",
        Phase::Editor => "Theme editor",
        Phase::Results => "Results",
    };
    let block = panel_block(title, is_focused, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let Some(result) = state.dashboard.store().selected() else {
        let msg = if state.dashboard.store().is_loading() { "Loading..." } else { "No topic selected" };
        frame.render_widget(Paragraph::new(msg), inner);
        return;
    };

    let mut lines = header_lines(result, theme);
    match phase {
        Phase::Setup => lines.extend(setup_lines(result, state, theme)),
        Phase::Editor => lines.extend(editor_lines(result, state, theme)),
        Phase::Results => lines.extend(results_lines(result, state, inner.width, theme)),
        Phase::None => {}
    }

    let max_scroll = u16::try_from(lines.len().saturating_sub(1)).unwrap_or(u16::MAX);
    let scroll = if phase.is_editor() { 0 } else { state.detail_scroll.min(max_scroll) };
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .style(Style::default().fg(theme.text))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        inner,
    );
}

fn header_lines(result: &TopicResult, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(result.topic_text.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(vec![
            Span::styled(result.status.as_str(), Style::default().fg(theme.status_color(result.status))),
            Span::styled(format!("  {} answers", result.answer_count), Style::default().fg(theme.muted)),
        ]),
    ];
    if let Some(at) = &result.analyzed_at {
        lines.push(Line::styled(format!("analyzed {at}"), Style::default().fg(theme.muted)));
    }
    lines.push(Line::raw(""));
    lines
}

fn hint(text: &str, theme: &Theme) -> Line<'static> {
    Line::styled(text.to_owned(), Style::default().fg(theme.muted))
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn setup_lines(result: &TopicResult, state: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    let running = result.status == Status::Running
        || state.dashboard.tracker().is_busy(OpKind::Run, &result.topic_id);
    if running {
        return vec![Line::from(format!("{} Running full analysis...", state.spinner()))];
    }
    let headline = match result.status {
        Status::Failed => Line::styled("Analysis failed.", Style::default().fg(theme.status_failed)),
        _ => Line::raw("Not analyzed yet."),
    };
    vec![
        headline,
        Line::raw(""),
        hint("r  run full analysis", theme),
        hint("d  discover themes, then edit them before classifying", theme),
    ]
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

fn editor_lines(result: &TopicResult, state: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    let tracker = state.dashboard.tracker();
    if result.status == Status::Discovering || tracker.is_busy(OpKind::Discover, &result.topic_id) {
        return vec![Line::from(format!("{} Discovering themes...", state.spinner()))];
    }

    let editor = state.dashboard.editor();
    let mut lines = Vec::new();
    if tracker.is_busy(OpKind::Classify, &result.topic_id) {
        lines.push(Line::styled(
            format!("{} Classifying answers...", state.spinner()),
            Style::default().fg(theme.status_busy),
        ));
        lines.push(Line::raw(""));
    }

    if !editor.is_open() {
        lines.push(Line::raw("Themes are ready for review."));
        lines.push(hint("e  open the editor    r  re-run analysis", theme));
        return lines;
    }

    if editor.drafts().is_empty() {
        lines.push(hint("No themes. Press a to add one.", theme));
    }
    for (i, draft) in editor.drafts().iter().enumerate() {
        let selected = i == state.draft_cursor;
        let marker = if selected { "▸ " } else { "  " };
        let name_style = if selected {
            Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let name = match state.mode {
            Mode::Insert(InputTarget::DraftName(j)) if j == i => format!("{}_", state.input),
            _ => draft.name.clone(),
        };
        lines.push(Line::from(vec![Span::raw(marker), Span::styled(name, name_style)]));

        let description = match state.mode {
            Mode::Insert(InputTarget::DraftDescription(j)) if j == i => Some(format!("{}_", state.input)),
            _ => (!draft.description.is_empty()).then(|| draft.description.clone()),
        };
        if let Some(description) = description {
            lines.push(Line::styled(format!("    {description}"), Style::default().fg(theme.muted)));
        }
    }

    if editor.is_rediscover_open() {
        let prompt = match state.mode {
            Mode::Insert(InputTarget::RediscoverPrompt) => format!("{}_", state.input),
            _ => editor.prompt().to_owned(),
        };
        lines.push(Line::raw(""));
        lines.push(Line::styled("Re-discover with instructions:", Style::default().add_modifier(Modifier::BOLD)));
        lines.push(Line::from(format!("> {prompt}")));
    }

    lines.push(Line::raw(""));
    lines.push(hint("a add  x delete  i rename  I describe", theme));
    lines.push(hint("d re-discover  c classify  b back to results", theme));
    lines
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

fn results_lines(result: &TopicResult, state: &AppState, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if !result.summary.is_empty() {
        lines.push(Line::raw(result.summary.clone()));
        lines.push(Line::raw(""));
    }

    lines.push(proportion_strip(&donut_segments(result), usize::from(width)));
    lines.push(Line::raw(""));

    let sorted = result.sorted_themes();
    for (i, theme_row) in sorted.iter().enumerate() {
        let selected = i == state.theme_cursor;
        let theme_rgb = theme_color(theme_row, &sorted, result);
        let color = rgb(theme_rgb);
        let cells = (bar_width(theme_row.count, &result.themes) / 100.0 * MAX_BAR_CELLS as f64).round() as usize;
        let emoji = sentiment_emoji(result.theme_sentiment(theme_row));
        let marker = if selected { "▸ " } else { "  " };
        let name_style = if selected {
            Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(theme_row.name.clone(), name_style),
            Span::raw(format!("  {emoji}")),
        ]));
        lines.push(Line::from(vec![
            Span::styled("█".repeat(cells.max(1)), Style::default().fg(color)),
            Span::styled(
                format!(" {} ({:.1}%)", theme_row.count, theme_percent(theme_row, result.answer_count)),
                Style::default().fg(theme.muted),
            ),
        ]));
        if !theme_row.description.is_empty() {
            lines.push(Line::styled(theme_row.description.clone(), Style::default().fg(theme.muted)));
        }
        if selected && state.exploring {
            lines.extend(sample_lines(&theme_row.answers, theme_rgb, theme));
        }
    }
    if sorted.is_empty() {
        lines.push(hint("No themes classified.", theme));
    }

    if result.has_sentiment() {
        lines.push(Line::raw(""));
        lines.extend(histogram_lines(result, theme));
    }

    lines.push(Line::raw(""));
    lines.push(hint("t/T pick theme  Enter sample answers", theme));
    lines.push(hint("e edit themes  d re-discover  r re-run analysis", theme));
    lines
}

/// Sample answers of one theme, each with its own excerpt marked in the theme's color.
fn sample_lines(samples: &[ThemeAnswer], color: fora_core::color::Rgb, theme: &Theme) -> Vec<Line<'static>> {
    if samples.is_empty() {
        return vec![hint("    No sample answers.", theme)];
    }
    let mut lines = Vec::new();
    for sample in samples.iter().take(MAX_SAMPLES) {
        let highlight = sample_highlight(&sample.excerpt, color);
        let mut spans = vec![Span::styled("    │ ", Style::default().fg(rgb(color)))];
        spans.extend(segments(&sample.text, &highlight).into_iter().map(|segment| match segment {
            Segment::Plain(text) => Span::raw(text.to_owned()),
            Segment::Marked { text, color } => {
                Span::styled(text.to_owned(), Style::default().bg(rgb(color)).fg(theme.on_highlight))
            }
        }));
        lines.push(Line::from(spans));
    }
    lines
}

/// Flattens the angular partition onto one row: cell `i` takes the color of the
/// segment containing its midpoint angle.
fn proportion_strip(segments: &[DonutSegment], width: usize) -> Line<'static> {
    let width = width.max(1);
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = 0usize;
    let mut run_color = None;
    for cell in 0..width {
        let angle = (cell as f64 + 0.5) / width as f64 * 360.0;
        let color = segments
            .iter()
            .find(|s| angle >= s.start && angle < s.end)
            .or(segments.last())
            .map(|s| s.color);
        if color != run_color && run > 0 {
            spans.push(strip_span(run, run_color));
            run = 0;
        }
        run_color = color;
        run += 1;
    }
    spans.push(strip_span(run, run_color));
    Line::from(spans)
}

fn strip_span(cells: usize, color: Option<fora_core::color::Rgb>) -> Span<'static> {
    let style = color.map(|c| Style::default().fg(rgb(c))).unwrap_or_default();
    Span::styled("▀".repeat(cells), style)
}

fn histogram_lines(result: &TopicResult, theme: &Theme) -> Vec<Line<'static>> {
    let answers = result.sentiment.as_ref().map(|s| s.answers.as_slice()).unwrap_or_default();
    let rows: Vec<u16> = (1..=10u8)
        .map(|score| {
            let height = score_bar_height(score, answers);
            (height / HISTOGRAM_HEIGHT * f64::from(HISTOGRAM_ROWS)).ceil() as u16
        })
        .collect();

    let average = result.sentiment.as_ref().and_then(|s| s.average);
    let mut lines = vec![Line::from(vec![
        Span::styled("Sentiment", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            average.map(|a| format!("  avg {a:.1} {}", sentiment_emoji(Some(a)))).unwrap_or_default(),
            Style::default().fg(theme.muted),
        ),
    ])];
    for level in (1..=HISTOGRAM_ROWS).rev() {
        let spans: Vec<Span<'static>> = rows
            .iter()
            .zip(1..=10u8)
            .map(|(&height, score)| {
                let color = rgb(fora_core::color::sentiment_color(Some(f64::from(score))));
                let cell = if height >= level { "██ " } else { "   " };
                Span::styled(cell, Style::default().fg(color))
            })
            .collect();
        lines.push(Line::from(spans));
    }
    lines.push(Line::styled(
        (1..=10).map(|s| format!("{s:<3}")).collect::<String>(),
        Style::default().fg(theme.muted),
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use fora_core::color::{Rgb, EMPTY};

    #[test]
    fn strip_covers_the_full_width() {
        let segments = [
            DonutSegment { color: Rgb::new(1, 1, 1), start: 0.0, end: 90.0 },
            DonutSegment { color: Rgb::new(2, 2, 2), start: 90.0, end: 360.0 },
        ];
        let line = proportion_strip(&segments, 20);
        assert_eq!(line.width(), 20);
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0].content.chars().count(), 5);
    }

    #[test]
    fn samples_mark_their_excerpt_and_stop_at_eight() {
        let samples: Vec<ThemeAnswer> = (0..10i64)
            .map(|i| ThemeAnswer {
                id: fora_core::ids::AnswerId::from(i),
                text: format!("answer {i} mentions pay"),
                excerpt: "pay".to_owned(),
            })
            .collect();
        let color = Rgb::new(9, 9, 9);
        let lines = sample_lines(&samples, color, &Theme::dark());
        assert_eq!(lines.len(), 8);
        let marked = &lines[0].spans[2];
        assert_eq!(marked.content, "pay");
        assert_eq!(marked.style.bg, Some(rgb(color)));
    }

    #[test]
    fn empty_chart_is_one_run() {
        let segments = [DonutSegment { color: EMPTY, start: 0.0, end: 360.0 }];
        assert_eq!(proportion_strip(&segments, 7).spans.len(), 1);
    }
}
