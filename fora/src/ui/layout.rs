//! Responsive 3-panel layout engine for fora.
//!
//! Pure layout arithmetic plus the shared panel chrome (bordered blocks and the
//! status bar). Called inside `terminal.draw()` on every render so each frame
//! reflects the current terminal size.
//!
//! # Panel geometry
//!
//! At `>= 120` columns all three panels are visible with widths driven by
//! `AppState.left_pct / center_pct / right_pct`. Between 80 and 119 columns two
//! panels share the width: topics and detail, or detail and the answers/chat
//! panel once it has focus or the chat is open. Below 80 columns only the focused
//! panel is drawn. The focused panel is always visible.
//!
//! `Spacing::Overlap(1)` combined with `Block::merge_borders(MergeStrategy::Fuzzy)`
//! makes adjacent panel borders share a single column.

use fora_core::phase::Phase;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;

/// Returns `[left, center, right, status_bar]` panel `Rect`s for the current frame.
pub fn compute_layout(frame: &Frame, state: &AppState) -> [Rect; 4] {
    let term_width = frame.area().width;

    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let columns = column_constraints(term_width, state);
    let horizontal = Layout::horizontal(columns).spacing(Spacing::Overlap(1));

    let [left, center, right] = main_area.layout(&horizontal);

    [left, center, right, status_bar]
}

/// Width constraints of `[left, center, right]` for a terminal `width` columns wide.
fn column_constraints(width: u16, state: &AppState) -> [Constraint; 3] {
    const HIDDEN: Constraint = Constraint::Length(0);
    if width >= 120 {
        return [
            Constraint::Percentage(state.left_pct),
            Constraint::Percentage(state.center_pct),
            Constraint::Percentage(state.right_pct),
        ];
    }
    let focus = state.focus;
    let chat_open = state.dashboard.is_chat_open();
    if width >= 80 {
        let show_right = focus == PanelFocus::Answers || (chat_open && focus != PanelFocus::Topics);
        return if show_right {
            [HIDDEN, Constraint::Percentage(55), Constraint::Fill(1)]
        } else {
            [Constraint::Percentage(30), Constraint::Fill(1), HIDDEN]
        };
    }
    match focus {
        PanelFocus::Topics => [Constraint::Fill(1), HIDDEN, HIDDEN],
        PanelFocus::Detail => [HIDDEN, Constraint::Fill(1), HIDDEN],
        PanelFocus::Answers => [HIDDEN, HIDDEN, Constraint::Fill(1)],
    }
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border on each side.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel: thick border when focused, plain otherwise.
///
/// `MergeStrategy::Fuzzy` is required because `Exact` produces incorrect
/// junctions when mixing `Thick` and `Plain` borders.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::None => "no topic",
        Phase::Setup => "setup",
        Phase::Editor => "editor",
        Phase::Results => "results",
    }
}

/// Renders the 1-row status bar: mode, interview, phase, activity and the last
/// load diagnostic.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert(_) => (" INSERT ", theme.status_mode_insert),
        Mode::Normal | Mode::ConfirmQuit | Mode::HelpOverlay | Mode::Notice => {
            (" NORMAL ", theme.status_mode_normal)
        }
    };

    let dashboard = &state.dashboard;
    let mut spans = vec![
        Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" interview {} ", dashboard.interview())),
        Span::raw(format!("│ {} ", phase_label(state.phase()))),
    ];

    let in_flight = dashboard.tracker().in_flight();
    if dashboard.store().is_loading() {
        spans.push(Span::raw(format!("│ {} loading ", state.spinner())));
    } else if in_flight > 0 {
        spans.push(Span::raw(format!("│ {} {in_flight} in flight ", state.spinner())));
    }
    if let Some(diagnostic) = dashboard.store().diagnostic() {
        spans.push(Span::styled(format!("│ {diagnostic} "), Style::default().fg(theme.status_failed)));
    }
    spans.push(Span::raw("│ ? help"));

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use fora_core::ids::InterviewId;

    const HIDDEN: Constraint = Constraint::Length(0);

    fn state(focus: PanelFocus, chat_open: bool) -> AppState {
        let mut state = AppState::new(InterviewId::from(1));
        state.focus = focus;
        if chat_open {
            state.dashboard.toggle_chat();
        }
        state
    }

    #[test]
    fn medium_width_shows_the_chat_once_open() {
        let closed = column_constraints(100, &state(PanelFocus::Detail, false));
        assert_eq!(closed[2], HIDDEN);
        let open = column_constraints(100, &state(PanelFocus::Answers, true));
        assert_eq!(open[0], HIDDEN);
        assert_ne!(open[2], HIDDEN);
        let detail_with_chat = column_constraints(100, &state(PanelFocus::Detail, true));
        assert_ne!(detail_with_chat[2], HIDDEN);
    }

    #[test]
    fn narrow_width_shows_only_the_focused_panel() {
        assert_eq!(
            column_constraints(60, &state(PanelFocus::Answers, true)),
            [HIDDEN, HIDDEN, Constraint::Fill(1)]
        );
        assert_eq!(
            column_constraints(60, &state(PanelFocus::Topics, false)),
            [Constraint::Fill(1), HIDDEN, HIDDEN]
        );
    }

    #[test]
    fn wide_terminals_use_the_configured_split() {
        assert_eq!(
            column_constraints(160, &state(PanelFocus::Answers, true)),
            [Constraint::Percentage(22), Constraint::Percentage(43), Constraint::Percentage(35)]
        );
    }
}
