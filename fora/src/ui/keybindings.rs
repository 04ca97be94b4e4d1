//! Keybinding dispatcher for fora.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop whether to continue or quit. The dispatcher
//! branches first on `state.mode` so that every mode has an isolated handler.
//! Normal-mode action keys then depend on the phase of the selected topic.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use fora_core::phase::Phase;
use ratatui::layout::Position;

use crate::app::{AppState, InputTarget, Mode, PanelFocus};

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Continue the event loop normally.
    Continue,
    /// Exit cleanly.
    Quit,
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
        Mode::Notice => handle_notice(key, state),
        Mode::Normal => handle_normal(key, state),
        Mode::Insert(_) => handle_insert(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }
    if let Some(action) = handle_phase_key(key, state) {
        return action;
    }

    match key.code {
        // Panel focus
        KeyCode::Char('H') | KeyCode::BackTab => {
            state.focus = state.focus.prev();
        }
        KeyCode::Char('L') | KeyCode::Tab => {
            state.focus = state.focus.next();
        }
        KeyCode::Enter | KeyCode::Char('l') if state.focus == PanelFocus::Topics => {
            state.focus = PanelFocus::Detail;
        }

        // Topic navigation from any panel
        KeyCode::Char('{') => state.prev_topic(1),
        KeyCode::Char('}') => state.next_topic(1),

        KeyCode::Char('R') => state.reload(),

        // Chat
        KeyCode::Char('C') => state.toggle_chat(),
        KeyCode::Char('/') => {
            state.focus = PanelFocus::Answers;
            state.begin_insert(InputTarget::Chat);
        }

        // Detail panel resize
        KeyCode::Char('<') => state.shrink_detail_panel(),
        KeyCode::Char('>') => state.grow_detail_panel(),

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }

        KeyCode::Char('q') | KeyCode::Esc => {
            if state.has_unsaved_drafts() {
                state.mode = Mode::ConfirmQuit;
            } else {
                return KeyAction::Quit;
            }
        }

        _ => {}
    }
    KeyAction::Continue
}

/// Handles the action keys of the selected topic's phase.
///
/// Returns `Some(KeyAction)` when the key was consumed, `None` when it should
/// fall through to the general Normal handler.
fn handle_phase_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let editor_open = state.dashboard.editor().is_open();
    match (state.phase(), key.code) {
        (Phase::Setup | Phase::Results, KeyCode::Char('r')) => state.run_selected(),
        (Phase::Setup | Phase::Results, KeyCode::Char('d')) => state.discover_selected(),
        (Phase::Results, KeyCode::Char('e')) => state.open_editor(),
        (Phase::Results, KeyCode::Char('t')) => state.next_theme(),
        (Phase::Results, KeyCode::Char('T')) => state.prev_theme(),
        (Phase::Results, KeyCode::Enter) if state.focus == PanelFocus::Detail => state.toggle_explore(),

        // Awaiting classification with the editor closed (e.g. after a restart).
        (Phase::Editor, KeyCode::Char('e')) if !editor_open => state.open_editor(),
        (Phase::Editor, KeyCode::Char('r')) if !editor_open => state.run_selected(),
        (Phase::Editor, _) if !editor_open => return None,

        (Phase::Editor, KeyCode::Char('a')) => {
            state.focus = PanelFocus::Detail;
            state.add_draft();
        }
        (Phase::Editor, KeyCode::Char('x')) => state.delete_draft(),
        (Phase::Editor, KeyCode::Char('i') | KeyCode::Enter) if state.focus == PanelFocus::Detail => {
            state.begin_insert(InputTarget::DraftName(state.draft_cursor));
        }
        (Phase::Editor, KeyCode::Char('I')) => {
            state.begin_insert(InputTarget::DraftDescription(state.draft_cursor));
        }
        (Phase::Editor, KeyCode::Char('d')) => state.begin_insert(InputTarget::RediscoverPrompt),
        (Phase::Editor, KeyCode::Char('c')) => state.classify(),
        (Phase::Editor, KeyCode::Char('b') | KeyCode::Esc) => {
            state.back_to_results();
        }
        _ => return None,
    }
    Some(KeyAction::Continue)
}

/// Handles scroll-related keys in Normal mode: j / k / g / G and Ctrl combos.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') => state.scroll_top(),
        KeyCode::Char('G') => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        KeyCode::Char('f') if ctrl => state.full_page_down(),
        KeyCode::Char('b') if ctrl => state.full_page_up(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// Modal modes
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('G') => state.help_scroll = u16::MAX,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

/// `y` confirms the quit; `n` / `Esc` cancels.
fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn handle_notice(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('q')) {
        state.dismiss_notice();
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

/// `Enter` applies the buffer, `Esc` discards it; other keys edit it.
fn handle_insert(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Esc => state.cancel_input(),
        KeyCode::Enter => state.commit_input(),
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => state.input.clear(),
        KeyCode::Char(c) => state.input.push(c),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click focuses a panel; the wheel scrolls the focused panel (or the help
/// overlay) by 3 lines.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => handle_mouse_click(mouse.column, mouse.row, state),
        MouseEventKind::ScrollUp if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_sub(3);
        }
        MouseEventKind::ScrollDown if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp if state.mode == Mode::Normal => state.scroll_up(3),
        MouseEventKind::ScrollDown if state.mode == Mode::Normal => state.scroll_down(3),
        _ => {}
    }
    KeyAction::Continue
}

/// Panels with zero width are skipped so collapsed panels cannot take focus.
fn handle_mouse_click(col: u16, row: u16, state: &mut AppState) {
    if state.mode != Mode::Normal {
        return;
    }
    let pos = Position { x: col, y: row };
    let [left, center, right] = state.panel_rects;

    if left.width > 0 && left.contains(pos) {
        state.focus = PanelFocus::Topics;
    } else if center.contains(pos) {
        state.focus = PanelFocus::Detail;
    } else if right.width > 0 && right.contains(pos) {
        state.focus = PanelFocus::Answers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use fora_core::controller::{Outcome, Request};
    use fora_core::ids::{InterviewId, TopicId};
    use fora_core::types::{Status, Theme, ThemeDraft, TopicResult};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn loaded(status: Status) -> AppState {
        let mut state = AppState::new(InterviewId::from(1));
        state.take_requests();
        let topic = TopicResult { topic_id: TopicId::from(5), status, ..TopicResult::default() };
        state.apply_outcome(Outcome::Results { focus: None, result: Ok(vec![topic]) });
        state.take_requests();
        state
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(press(KeyCode::Char(c)), state);
        }
    }

    #[test]
    fn run_key_queues_a_run_in_setup() {
        let mut state = loaded(Status::Failed);
        handle_key(press(KeyCode::Char('r')), &mut state);
        assert_eq!(state.take_requests(), vec![Request::Run { topic: TopicId::from(5) }]);
        assert_eq!(state.phase(), Phase::Setup);
    }

    #[test]
    fn renaming_a_draft_goes_through_insert_mode() {
        let mut state = loaded(Status::Completed);
        state.apply_outcome(Outcome::Discover {
            topic: TopicId::from(5),
            previous: Status::Completed,
            result: Ok(vec![ThemeDraft::new("Pay", "")]),
        });
        assert_eq!(state.phase(), Phase::Editor);
        state.focus = PanelFocus::Detail;

        handle_key(press(KeyCode::Char('i')), &mut state);
        assert_eq!(state.mode, Mode::Insert(InputTarget::DraftName(0)));
        assert_eq!(state.input, "Pay");
        handle_key(press(KeyCode::Backspace), &mut state);
        type_text(&mut state, "ck ");
        handle_key(press(KeyCode::Enter), &mut state);

        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.dashboard.editor().drafts()[0].name, "Pack");
    }

    #[test]
    fn failure_notice_blocks_until_dismissed() {
        let mut state = loaded(Status::Failed);
        handle_key(press(KeyCode::Char('r')), &mut state);
        assert_eq!(state.take_requests(), vec![Request::Run { topic: TopicId::from(5) }]);
        state.apply_outcome(Outcome::Run {
            topic: TopicId::from(5),
            result: Err(fora_core::error::ApiError::rejected(None)),
        });
        assert_eq!(state.mode, Mode::Notice);
        assert_eq!(state.notice.as_deref(), Some("Analysis failed: Unknown error"));

        handle_key(press(KeyCode::Char('r')), &mut state);
        assert!(state.take_requests().is_empty());
        handle_key(press(KeyCode::Enter), &mut state);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn enter_on_results_lists_the_selected_themes_answers() {
        let mut state = AppState::new(InterviewId::from(1));
        state.take_requests();
        let themes = vec![
            Theme { name: "Pay".into(), count: 4, ..Theme::default() },
            Theme { name: "Hours".into(), count: 2, ..Theme::default() },
        ];
        let topic = TopicResult { topic_id: TopicId::from(5), status: Status::Completed, themes, ..TopicResult::default() };
        state.apply_outcome(Outcome::Results { focus: None, result: Ok(vec![topic]) });
        state.focus = PanelFocus::Detail;

        handle_key(press(KeyCode::Char('t')), &mut state);
        assert_eq!(state.theme_cursor, 1);
        handle_key(press(KeyCode::Enter), &mut state);
        assert!(state.exploring);
        handle_key(press(KeyCode::Enter), &mut state);
        assert!(!state.exploring);
    }

    #[test]
    fn quitting_with_open_drafts_asks_first() {
        let mut state = loaded(Status::Completed);
        state.apply_outcome(Outcome::Discover {
            topic: TopicId::from(5),
            previous: Status::Completed,
            result: Ok(vec![ThemeDraft::new("Pay", "")]),
        });
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut state), KeyAction::Continue);
        assert_eq!(state.mode, Mode::ConfirmQuit);
        assert_eq!(handle_key(press(KeyCode::Char('y')), &mut state), KeyAction::Quit);
    }

    #[test]
    fn chat_input_stays_open_between_messages() {
        let mut state = loaded(Status::Completed);
        handle_key(press(KeyCode::Char('/')), &mut state);
        assert!(state.dashboard.is_chat_open());
        type_text(&mut state, "why?");
        handle_key(press(KeyCode::Enter), &mut state);
        assert!(matches!(state.take_requests().as_slice(), [Request::Chat(_)]));
        assert_eq!(state.mode, Mode::Insert(InputTarget::Chat));
        assert!(state.input.is_empty());
    }
}
