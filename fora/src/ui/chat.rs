//! Chat panel renderer for fora.
//!
//! Replaces the answers panel while the chat is open: the message log on top and
//! a one-row input line underneath.

use fora_core::types::Role;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::app::{AppState, InputTarget, Mode, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_chat(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Answers;
    let block = panel_block("Chat", is_focused, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let [log_area, input_area] = inner.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let chat = state.dashboard.chat();
    let mut lines: Vec<Line> = Vec::new();
    if chat.messages().is_empty() {
        lines.push(Line::styled(
            "Ask about this interview's answers. Press / to type.",
            Style::default().fg(theme.muted),
        ));
    }
    for message in chat.messages() {
        let (who, color) = match message.role {
            Role::User => ("You", theme.chat_user),
            Role::Assistant => ("Assistant", theme.chat_assistant),
        };
        lines.push(Line::from(Span::styled(who, Style::default().fg(color).add_modifier(Modifier::BOLD))));
        lines.extend(message.content.lines().map(|l| Line::styled(l.to_owned(), Style::default().fg(color))));
        lines.push(Line::raw(""));
    }
    if chat.is_loading() {
        lines.push(Line::styled(format!("{} thinking...", state.spinner()), Style::default().fg(theme.muted)));
    }

    // Keep the newest messages in view unless the operator scrolled up.
    let overflow = lines.len().saturating_sub(usize::from(log_area.height));
    let bottom = u16::try_from(overflow).unwrap_or(u16::MAX);
    let scroll = bottom.saturating_sub(state.answers_scroll);
    frame.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }).scroll((scroll, 0)),
        log_area,
    );

    let input = if state.mode == Mode::Insert(InputTarget::Chat) {
        Line::from(vec![Span::raw("> "), Span::raw(format!("{}_", state.input))])
    } else {
        Line::styled("> / to type, C to close", Style::default().fg(theme.muted))
    };
    frame.render_widget(Paragraph::new(input), input_area);
}
