//! Central application state for fora.
//!
//! `AppState` wraps the core `Dashboard` with everything that only matters to the
//! terminal: the current mode, which panel has focus, scroll offsets, panel
//! geometry, the text input buffer and the blocking notice. No ratatui rendering
//! logic lives here; the render module reads it and the keybinding dispatcher
//! mutates it.
//!
//! Dashboard actions return `Request`s. They are collected in an outbox that the
//! event loop drains after every event and spawns as background tasks.

use fora_core::controller::{Dashboard, Outcome, Request};
use fora_core::ids::InterviewId;
use fora_core::phase::Phase;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

/// What the text input buffer is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    DraftName(usize),
    DraftDescription(usize),
    RediscoverPrompt,
    Chat,
}

/// Mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Navigation and single-key actions (default).
    #[default]
    Normal,
    /// Typing into the input buffer.
    Insert(InputTarget),
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
    /// A failed operation is reported in a modal until dismissed.
    Notice,
    /// Quit-confirmation dialog shown when the editor holds drafts.
    ConfirmQuit,
}

/// Which panel currently has keyboard focus.
///
/// Navigation cycles Topics → Detail → Answers → Topics via `next()` and in
/// reverse via `prev()`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Left panel listing the interview's topics.
    #[default]
    Topics,
    /// Centre panel showing the current phase view.
    Detail,
    /// Right panel showing highlighted answers, or the chat while it is open.
    Answers,
}

impl PanelFocus {
    pub fn prev(self) -> Self {
        match self {
            PanelFocus::Topics => PanelFocus::Answers,
            PanelFocus::Detail => PanelFocus::Topics,
            PanelFocus::Answers => PanelFocus::Detail,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PanelFocus::Topics => PanelFocus::Detail,
            PanelFocus::Detail => PanelFocus::Answers,
            PanelFocus::Answers => PanelFocus::Topics,
        }
    }
}

/// Frames of the busy indicator shown next to in-flight topics.
pub const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub dashboard: Dashboard,
    pub mode: Mode,
    pub focus: PanelFocus,

    /// Stateful list widget backing the topic panel (left).
    pub topic_list_state: ListState,
    /// Selected draft while the theme editor is shown.
    pub draft_cursor: usize,
    /// Selected theme row in the results view, in display order.
    pub theme_cursor: usize,
    /// Whether the selected theme's sample answers are listed under it.
    pub exploring: bool,

    pub detail_scroll: u16,
    pub answers_scroll: u16,
    pub help_scroll: u16,

    /// Inner panel heights cached after each render for page-wise scrolling.
    pub topics_viewport_height: u16,
    pub detail_viewport_height: u16,
    pub answers_viewport_height: u16,

    /// Width percentages of the three panels. Default: 22 / 43 / 35.
    pub left_pct: u16,
    pub center_pct: u16,
    pub right_pct: u16,
    /// Outer panel rects from the last render, for click-to-focus.
    pub panel_rects: [Rect; 3],

    /// Text being typed in Insert mode.
    pub input: String,
    /// Notice currently shown in the modal.
    pub notice: Option<String>,
    pub spinner_frame: usize,

    outbox: Vec<Request>,
}

impl AppState {
    /// Creates the state and queues the initial results load.
    pub fn new(interview: InterviewId) -> Self {
        let mut dashboard = Dashboard::new(interview);
        let outbox = vec![dashboard.load()];
        Self {
            dashboard,
            mode: Mode::default(),
            focus: PanelFocus::default(),
            topic_list_state: ListState::default(),
            draft_cursor: 0,
            theme_cursor: 0,
            exploring: false,
            detail_scroll: 0,
            answers_scroll: 0,
            help_scroll: 0,
            topics_viewport_height: 0,
            detail_viewport_height: 0,
            answers_viewport_height: 0,
            left_pct: 22,
            center_pct: 43,
            right_pct: 35,
            panel_rects: [Rect::default(); 3],
            input: String::new(),
            notice: None,
            spinner_frame: 0,
            outbox,
        }
    }

    /// Drains the requests queued since the last call.
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outbox)
    }

    fn queue(&mut self, request: Option<Request>) {
        self.outbox.extend(request);
    }

    pub fn phase(&self) -> Phase {
        self.dashboard.phase()
    }

    /// Folds a finished service call into the dashboard.
    pub fn apply_outcome(&mut self, outcome: Outcome) {
        let follow_up = self.dashboard.apply(outcome);
        self.outbox.extend(follow_up);
        self.sync_selection();
        self.show_next_notice();
    }

    /// Advances the spinner and surfaces notices that arrived while typing.
    pub fn tick(&mut self) {
        let store = self.dashboard.store();
        if self.dashboard.tracker().in_flight() > 0 || store.is_loading() || self.dashboard.chat().is_loading() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
        }
        self.show_next_notice();
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER[self.spinner_frame]
    }

    fn sync_selection(&mut self) {
        self.topic_list_state.select(self.dashboard.store().selected_index());
        let drafts = self.dashboard.editor().drafts().len();
        self.draft_cursor = self.draft_cursor.min(drafts.saturating_sub(1));
        let themes = self.theme_count();
        self.theme_cursor = self.theme_cursor.min(themes.saturating_sub(1));
        if themes == 0 {
            self.exploring = false;
        }
    }

    fn theme_count(&self) -> usize {
        self.dashboard.store().selected().map_or(0, |r| r.themes.len())
    }

    /// Opens the notice modal for the oldest pending notice, unless the operator
    /// is typing or another modal is up.
    fn show_next_notice(&mut self) {
        if self.notice.is_some() || !matches!(self.mode, Mode::Normal | Mode::HelpOverlay) {
            return;
        }
        if let Some(notice) = self.dashboard.pop_notice() {
            self.notice = Some(notice);
            self.mode = Mode::Notice;
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
        self.mode = Mode::Normal;
        self.show_next_notice();
    }

    // -----------------------------------------------------------------------
    // Topic selection
    // -----------------------------------------------------------------------

    pub fn select_topic(&mut self, index: usize) {
        let request = self.dashboard.select(index);
        if request.is_some() {
            self.detail_scroll = 0;
            self.answers_scroll = 0;
            self.draft_cursor = 0;
            self.theme_cursor = 0;
            self.exploring = false;
        }
        self.queue(request);
        self.sync_selection();
    }

    pub fn next_topic(&mut self, by: usize) {
        let len = self.dashboard.store().results().len();
        if len == 0 {
            return;
        }
        let current = self.dashboard.store().selected_index().unwrap_or(0);
        self.select_topic((current + by).min(len - 1));
    }

    pub fn prev_topic(&mut self, by: usize) {
        let current = self.dashboard.store().selected_index().unwrap_or(0);
        self.select_topic(current.saturating_sub(by));
    }

    // -----------------------------------------------------------------------
    // Dashboard actions
    // -----------------------------------------------------------------------

    pub fn reload(&mut self) {
        let request = self.dashboard.load();
        self.outbox.push(request);
    }

    pub fn run_selected(&mut self) {
        if let Some(index) = self.dashboard.store().selected_index() {
            let request = self.dashboard.run(index);
            self.queue(request);
        }
    }

    pub fn discover_selected(&mut self) {
        if let Some(index) = self.dashboard.store().selected_index() {
            let request = self.dashboard.discover(index, "");
            self.draft_cursor = 0;
            self.queue(request);
        }
    }

    pub fn open_editor(&mut self) {
        let request = self.dashboard.open_editor();
        self.draft_cursor = 0;
        self.queue(request);
    }

    pub fn back_to_results(&mut self) {
        self.dashboard.back_to_results();
        self.draft_cursor = 0;
    }

    pub fn classify(&mut self) {
        let request = self.dashboard.classify();
        self.queue(request);
    }

    pub fn toggle_chat(&mut self) {
        self.dashboard.toggle_chat();
        self.answers_scroll = 0;
    }

    // -----------------------------------------------------------------------
    // Theme exploration
    // -----------------------------------------------------------------------

    pub fn next_theme(&mut self) {
        let len = self.theme_count();
        self.theme_cursor = (self.theme_cursor + 1).min(len.saturating_sub(1));
    }

    pub fn prev_theme(&mut self) {
        self.theme_cursor = self.theme_cursor.saturating_sub(1);
    }

    /// Shows or hides the sample answers of the theme under the cursor.
    pub fn toggle_explore(&mut self) {
        self.exploring = !self.exploring && self.theme_count() > 0;
    }

    // -----------------------------------------------------------------------
    // Draft editing
    // -----------------------------------------------------------------------

    pub fn next_draft(&mut self) {
        let len = self.dashboard.editor().drafts().len();
        self.draft_cursor = (self.draft_cursor + 1).min(len.saturating_sub(1));
    }

    pub fn prev_draft(&mut self) {
        self.draft_cursor = self.draft_cursor.saturating_sub(1);
    }

    pub fn add_draft(&mut self) {
        self.draft_cursor = self.dashboard.editor_mut().add();
        self.begin_insert(InputTarget::DraftName(self.draft_cursor));
    }

    pub fn delete_draft(&mut self) {
        self.dashboard.editor_mut().delete(self.draft_cursor);
        self.sync_selection();
    }

    // -----------------------------------------------------------------------
    // Insert mode
    // -----------------------------------------------------------------------

    /// Enters Insert mode, pre-filling the buffer with the value being edited.
    pub fn begin_insert(&mut self, target: InputTarget) {
        let editor = self.dashboard.editor();
        self.input = match target {
            InputTarget::DraftName(i) => editor.drafts().get(i).map(|d| d.name.clone()).unwrap_or_default(),
            InputTarget::DraftDescription(i) => {
                editor.drafts().get(i).map(|d| d.description.clone()).unwrap_or_default()
            }
            InputTarget::RediscoverPrompt => editor.prompt().to_owned(),
            InputTarget::Chat => String::new(),
        };
        match target {
            InputTarget::RediscoverPrompt if !self.dashboard.editor().is_rediscover_open() => {
                self.dashboard.editor_mut().toggle_rediscover();
            }
            InputTarget::Chat if !self.dashboard.is_chat_open() => self.toggle_chat(),
            _ => {}
        }
        self.mode = Mode::Insert(target);
    }

    /// Applies the buffer to its target. Chat input stays in Insert mode so the
    /// next message can be typed straight away.
    pub fn commit_input(&mut self) {
        let Mode::Insert(target) = self.mode else {
            return;
        };
        let input = std::mem::take(&mut self.input);
        match target {
            InputTarget::DraftName(i) => self.dashboard.editor_mut().rename(i, &input),
            InputTarget::DraftDescription(i) => self.dashboard.editor_mut().describe(i, &input),
            InputTarget::RediscoverPrompt => {
                self.dashboard.editor_mut().set_prompt(input);
                let request = self.dashboard.rediscover();
                self.draft_cursor = 0;
                self.queue(request);
            }
            InputTarget::Chat => {
                let request = self.dashboard.send_chat(&input);
                self.queue(request);
                return;
            }
        }
        self.mode = Mode::Normal;
        self.show_next_notice();
    }

    /// Leaves Insert mode without applying the buffer. Cancelling the prompt
    /// closes the re-discover panel.
    pub fn cancel_input(&mut self) {
        if self.mode == Mode::Insert(InputTarget::RediscoverPrompt) && self.dashboard.editor().is_rediscover_open() {
            self.dashboard.editor_mut().toggle_rediscover();
        }
        self.input.clear();
        self.mode = Mode::Normal;
        self.show_next_notice();
    }

    /// True when quitting would discard drafts in the open editor.
    pub fn has_unsaved_drafts(&self) -> bool {
        let editor = self.dashboard.editor();
        editor.is_open() && !editor.drafts().is_empty()
    }

    // -----------------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------------

    /// Scrolls the focused panel down by `lines` rows.
    ///
    /// Topics move the selection; the detail panel moves the draft cursor while
    /// the editor is shown.
    pub fn scroll_down(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Topics => self.next_topic(usize::from(lines)),
            PanelFocus::Detail if self.phase().is_editor() => {
                for _ in 0..lines {
                    self.next_draft();
                }
            }
            PanelFocus::Detail => self.detail_scroll = self.detail_scroll.saturating_add(lines),
            // The chat log is anchored at its newest message; the offset counts up from there.
            PanelFocus::Answers if self.dashboard.is_chat_open() => {
                self.answers_scroll = self.answers_scroll.saturating_sub(lines);
            }
            PanelFocus::Answers => self.answers_scroll = self.answers_scroll.saturating_add(lines),
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Topics => self.prev_topic(usize::from(lines)),
            PanelFocus::Detail if self.phase().is_editor() => {
                for _ in 0..lines {
                    self.prev_draft();
                }
            }
            PanelFocus::Detail => self.detail_scroll = self.detail_scroll.saturating_sub(lines),
            PanelFocus::Answers if self.dashboard.is_chat_open() => {
                self.answers_scroll = self.answers_scroll.saturating_add(lines);
            }
            PanelFocus::Answers => self.answers_scroll = self.answers_scroll.saturating_sub(lines),
        }
    }

    pub fn scroll_top(&mut self) {
        match self.focus {
            PanelFocus::Topics => self.select_topic(0),
            PanelFocus::Detail => {
                self.detail_scroll = 0;
                self.draft_cursor = 0;
            }
            PanelFocus::Answers if self.dashboard.is_chat_open() => self.answers_scroll = u16::MAX,
            PanelFocus::Answers => self.answers_scroll = 0,
        }
    }

    /// Scrolls to the bottom. Paragraph offsets are set to `u16::MAX` and clamped
    /// by the renderer.
    pub fn scroll_bottom(&mut self) {
        match self.focus {
            PanelFocus::Topics => {
                let len = self.dashboard.store().results().len();
                if len > 0 {
                    self.select_topic(len - 1);
                }
            }
            PanelFocus::Detail => {
                self.detail_scroll = u16::MAX;
                self.draft_cursor = self.dashboard.editor().drafts().len().saturating_sub(1);
            }
            PanelFocus::Answers if self.dashboard.is_chat_open() => self.answers_scroll = 0,
            PanelFocus::Answers => self.answers_scroll = u16::MAX,
        }
    }

    fn viewport_height(&self) -> u16 {
        match self.focus {
            PanelFocus::Topics => self.topics_viewport_height,
            PanelFocus::Detail => self.detail_viewport_height,
            PanelFocus::Answers => self.answers_viewport_height,
        }
    }

    /// Uses the viewport height cached from the previous render; scrolls by at
    /// least one row on the first frame.
    pub fn half_page_down(&mut self) {
        self.scroll_down((self.viewport_height() / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.viewport_height() / 2).max(1));
    }

    pub fn full_page_down(&mut self) {
        self.scroll_down(self.viewport_height().max(1));
    }

    pub fn full_page_up(&mut self) {
        self.scroll_up(self.viewport_height().max(1));
    }

    // -----------------------------------------------------------------------
    // Panel geometry
    // -----------------------------------------------------------------------

    /// Shrinks the detail (centre) panel by 5%, split between the side panels.
    /// The centre panel will not shrink below 20%.
    pub fn shrink_detail_panel(&mut self) {
        const MIN_CENTER: u16 = 20;
        const STEP: u16 = 5;
        if self.center_pct <= MIN_CENTER {
            return;
        }
        let transfer = STEP.min(self.center_pct - MIN_CENTER);
        self.center_pct -= transfer;
        let left_gain = transfer / 2;
        self.left_pct = self.left_pct.saturating_add(left_gain);
        self.right_pct = self.right_pct.saturating_add(transfer - left_gain);
    }

    /// Grows the detail panel by up to 5%, taken from the side panels.
    /// The centre panel will not grow above 80% and side panels keep 5%.
    pub fn grow_detail_panel(&mut self) {
        const MAX_CENTER: u16 = 80;
        const MIN_SIDE: u16 = 5;
        const STEP: u16 = 5;
        if self.center_pct >= MAX_CENTER {
            return;
        }
        let transfer = STEP.min(MAX_CENTER - self.center_pct);
        let left_give = (transfer / 2).min(self.left_pct.saturating_sub(MIN_SIDE));
        let right_give = (transfer - transfer / 2).min(self.right_pct.saturating_sub(MIN_SIDE));
        self.left_pct -= left_give;
        self.right_pct -= right_give;
        self.center_pct += left_give + right_give;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fora_core::error::ApiError;
    use fora_core::ids::TopicId;
    use fora_core::types::{Status, TopicResult};

    fn loaded() -> AppState {
        let mut state = AppState::new(InterviewId::from(1));
        assert_eq!(state.take_requests(), vec![Request::LoadResults { focus: None }]);
        let topics = (1..=3)
            .map(|id| TopicResult { topic_id: TopicId::from(id), status: Status::Completed, ..TopicResult::default() })
            .collect();
        state.apply_outcome(Outcome::Results { focus: None, result: Ok(topics) });
        state.take_requests();
        state
    }

    #[test]
    fn notice_waits_until_typing_ends() {
        let mut state = loaded();
        state.begin_insert(InputTarget::Chat);
        state.apply_outcome(Outcome::Run { topic: TopicId::from(1), result: Err(ApiError::rejected(None)) });
        assert_eq!(state.mode, Mode::Insert(InputTarget::Chat));
        assert!(state.notice.is_none());

        state.cancel_input();
        assert_eq!(state.mode, Mode::Notice);
        assert_eq!(state.notice.as_deref(), Some("Analysis failed: Unknown error"));
    }

    #[test]
    fn topic_navigation_clamps_and_loads_answers() {
        let mut state = loaded();
        state.next_topic(10);
        assert_eq!(state.topic_list_state.selected(), Some(2));
        assert_eq!(state.take_requests(), vec![Request::LoadAnswers { topic: TopicId::from(3) }]);

        state.next_topic(1);
        assert!(state.take_requests().is_empty());
    }

    #[test]
    fn theme_cursor_clamps_and_resets_on_topic_change() {
        use fora_core::types::Theme;
        let mut state = loaded();
        let themes = vec![
            Theme { name: "Pay".into(), count: 3, ..Theme::default() },
            Theme { name: "Hours".into(), count: 1, ..Theme::default() },
        ];
        let topics = vec![
            TopicResult { topic_id: TopicId::from(1), status: Status::Completed, themes, ..TopicResult::default() },
            TopicResult { topic_id: TopicId::from(2), status: Status::Completed, ..TopicResult::default() },
        ];
        state.apply_outcome(Outcome::Results { focus: None, result: Ok(topics) });

        state.next_theme();
        state.next_theme();
        assert_eq!(state.theme_cursor, 1);
        state.toggle_explore();
        assert!(state.exploring);

        state.select_topic(1);
        assert_eq!(state.theme_cursor, 0);
        assert!(!state.exploring);
        state.toggle_explore();
        assert!(!state.exploring);
    }

    #[test]
    fn detail_scrolling_moves_the_draft_cursor_in_the_editor() {
        use fora_core::types::ThemeDraft;
        let mut state = loaded();
        state.apply_outcome(Outcome::Discover {
            topic: TopicId::from(1),
            previous: Status::Completed,
            result: Ok(vec![ThemeDraft::new("A", ""), ThemeDraft::new("B", ""), ThemeDraft::new("C", "")]),
        });
        state.focus = PanelFocus::Detail;

        state.scroll_down(5);
        assert_eq!(state.draft_cursor, 2);
        state.scroll_up(1);
        assert_eq!(state.draft_cursor, 1);
        state.scroll_up(4);
        assert_eq!(state.draft_cursor, 0);
    }

    #[test]
    fn detail_panel_resizes_within_bounds() {
        let mut state = loaded();
        for _ in 0..20 {
            state.shrink_detail_panel();
        }
        assert_eq!(state.center_pct, 20);
        assert_eq!(state.left_pct + state.center_pct + state.right_pct, 100);

        for _ in 0..20 {
            state.grow_detail_panel();
        }
        assert_eq!(state.center_pct, 80);
        assert!(state.left_pct >= 5 && state.right_pct >= 5);
    }
}
