//! Topic list panel renderer for fora.
//!
//! Each entry shows a status badge, a busy marker while any operation is in
//! flight for the topic, the question text and its answer count.

use fora_core::tracker::RequestTracker;
use fora_core::types::TopicResult;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

const MAX_TEXT_CHARS: usize = 40;

/// Renders the topic list with `render_stateful_widget` so the selection
/// highlight follows `state.topic_list_state`.
pub fn render_topic_list(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Topics;
    let store = state.dashboard.store();
    let title = if store.results().is_empty() {
        "Topics".to_owned()
    } else {
        format!("Topics ({})", store.results().len())
    };
    let block = panel_block(title, is_focused, theme);

    let items: Vec<ListItem> = if store.results().is_empty() {
        let msg = if store.is_loading() { "Loading..." } else { "No topics" };
        vec![ListItem::new(Line::raw(msg))]
    } else {
        store
            .results()
            .iter()
            .map(|r| topic_item(r, state.dashboard.tracker(), state.spinner(), theme))
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD))
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut state.topic_list_state);
}

/// Truncates on a character boundary, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn topic_item(
    result: &TopicResult,
    tracker: &RequestTracker,
    spinner: &'static str,
    theme: &Theme,
) -> ListItem<'static> {
    let badge = Span::styled(
        format!("{:<11} ", result.status.as_str()),
        Style::default().fg(theme.status_color(result.status)),
    );
    let busy = if tracker.is_topic_busy(&result.topic_id) {
        Span::styled(format!("{spinner} "), Style::default().fg(theme.status_busy))
    } else {
        Span::raw("  ")
    };
    let text = if result.topic_text.is_empty() {
        format!("Topic {}", result.topic_id)
    } else {
        truncate(&result.topic_text, MAX_TEXT_CHARS)
    };
    let count = Span::styled(format!("  ({})", result.answer_count), Style::default().fg(theme.muted));
    ListItem::new(Line::from(vec![busy, badge, Span::raw(text), count]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_character_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Qué opinas del café", 8), "Qué opi…");
    }
}
