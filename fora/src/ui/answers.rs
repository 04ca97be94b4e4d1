//! Answers panel renderer for fora.
//!
//! Every answer of the selected topic is drawn with its theme excerpts
//! highlighted: the text is split with `fora_core::highlight::segments` and each
//! marked slice gets its theme color as background. A colored gutter shows the
//! answer's first theme and, when scored, its sentiment.

use fora_core::color::{answer_theme_color, sentiment_emoji};
use fora_core::highlight::{answer_highlights, segments, Segment};
use fora_core::types::{Answer, TopicResult};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::app::{AppState, PanelFocus};
use crate::theme::{rgb, Theme};
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_answers(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Answers;
    let answers = state.dashboard.store().answers();
    let title = if answers.is_empty() { "Answers".to_owned() } else { format!("Answers ({})", answers.len()) };
    let block = panel_block(title, is_focused, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let Some(result) = state.dashboard.store().selected() else {
        return;
    };
    if answers.is_empty() {
        frame.render_widget(Paragraph::new(Line::styled("No answers loaded", Style::default().fg(theme.muted))), inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for answer in answers {
        lines.push(answer_line(result, answer, theme));
        lines.push(Line::raw(""));
    }

    let max_scroll = u16::try_from(lines.len().saturating_sub(1)).unwrap_or(u16::MAX);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .scroll((state.answers_scroll.min(max_scroll), 0)),
        inner,
    );
}

/// One answer as a single (wrapped) line: gutter, optional sentiment, highlighted text.
fn answer_line<'a>(result: &TopicResult, answer: &'a Answer, theme: &Theme) -> Line<'a> {
    let gutter = Span::styled("▌ ", Style::default().fg(rgb(answer_theme_color(result, &answer.id))));
    let mut spans = vec![gutter];

    if let Some(score) = result.score_of(&answer.id) {
        spans.push(Span::styled(
            format!("{score:.0} {} ", sentiment_emoji(Some(score))),
            Style::default().fg(theme.muted),
        ));
    }

    let highlights = answer_highlights(result, &answer.id);
    spans.extend(segments(&answer.text, &highlights).into_iter().map(|segment| match segment {
        Segment::Plain(text) => Span::raw(text),
        Segment::Marked { text, color } => {
            Span::styled(text, Style::default().bg(rgb(color)).fg(theme.on_highlight))
        }
    }));
    Line::from(spans)
}
