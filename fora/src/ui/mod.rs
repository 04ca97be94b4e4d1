//! UI rendering module for fora.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each panel
//! has its own module.

mod layout;
pub mod answers;
pub mod chat;
pub mod detail;
pub mod help;
pub mod keybindings;
pub mod topic_list;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame: topics, detail, answers (or chat), status bar and
/// any modal overlay.
///
/// Viewport heights and panel rects are written back into `state` so scrolling
/// and click-to-focus on the next event use this frame's geometry.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [left, center, right, status_bar] = compute_layout(frame, state);

    state.topics_viewport_height = inner_rect(left).height;
    state.detail_viewport_height = inner_rect(center).height;
    state.answers_viewport_height = inner_rect(right).height;
    state.panel_rects = [left, center, right];

    if left.width > 0 {
        topic_list::render_topic_list(frame, left, state, theme);
    }

    if center.width > 0 {
        detail::render_detail(frame, center, state, theme);
    }

    if right.width > 0 {
        if state.dashboard.is_chat_open() {
            chat::render_chat(frame, right, state, theme);
        } else {
            answers::render_answers(frame, right, state, theme);
        }
    }

    render_status_bar(frame, status_bar, state, theme);

    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::Notice => {
            if let Some(message) = &state.notice {
                help::render_notice(frame, theme, message);
            }
        }
        Mode::ConfirmQuit => help::render_confirm_quit(frame, theme),
        Mode::Normal | Mode::Insert(_) => {}
    }
}
