//! Dashboard state machine.
//!
//! Every operator action is split in two. The synchronous half (the methods on
//! [`Dashboard`]) applies the optimistic update and returns a [`Request`]; the
//! network half runs in [`execute`] and produces an [`Outcome`], which
//! [`Dashboard::apply`] folds back in. The terminal front end spawns `execute`
//! on a task and feeds the outcome through its event channel, so only the event
//! loop ever mutates a `Dashboard`.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::api::AnalysisService;
use crate::chat::{ChatRequest, ChatSession};
use crate::editor::ThemeEditor;
use crate::error::ApiError;
use crate::ids::{InterviewId, TopicId};
use crate::phase::{derive_phase, Phase, TransientFlags};
use crate::store::ResultStore;
use crate::tracker::{OpKind, RequestTracker};
use crate::types::{Answer, Status, ThemeDraft, TopicPatch, TopicResult};

/// A network call the dashboard wants made.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LoadResults { focus: Option<TopicId> },
    LoadAnswers { topic: TopicId },
    Run { topic: TopicId },
    Discover { topic: TopicId, custom_prompt: String, previous: Status },
    Classify { topic: TopicId, themes: Vec<ThemeDraft> },
    Chat(ChatRequest),
}

/// The completed form of a [`Request`].
#[derive(Debug)]
pub enum Outcome {
    Results { focus: Option<TopicId>, result: Result<Vec<TopicResult>, ApiError> },
    Answers { topic: TopicId, result: Result<Vec<Answer>, ApiError> },
    Run { topic: TopicId, result: Result<(), ApiError> },
    Discover { topic: TopicId, previous: Status, result: Result<Vec<ThemeDraft>, ApiError> },
    Classify { topic: TopicId, result: Result<(), ApiError> },
    Chat(Result<String, ApiError>),
}

/// Performs the network half of `request`. Never fails: errors travel inside the outcome.
pub async fn execute(service: &dyn AnalysisService, request: Request) -> Outcome {
    match request {
        Request::LoadResults { focus } => Outcome::Results { focus, result: service.list_results().await },
        Request::LoadAnswers { topic } => {
            let result = service.list_answers(&topic).await;
            Outcome::Answers { topic, result }
        }
        Request::Run { topic } => {
            let result = service.run(&topic).await;
            Outcome::Run { topic, result }
        }
        Request::Discover { topic, custom_prompt, previous } => {
            let result = service.discover(&topic, &custom_prompt).await;
            Outcome::Discover { topic, previous, result }
        }
        Request::Classify { topic, themes } => {
            let result = service.classify(&topic, &themes).await;
            Outcome::Classify { topic, result }
        }
        Request::Chat(ChatRequest { message, history }) => {
            Outcome::Chat(service.chat(&message, &history).await)
        }
    }
}

pub struct Dashboard {
    interview: InterviewId,
    store: ResultStore,
    tracker: RequestTracker,
    editor: ThemeEditor,
    chat: ChatSession,
    chat_open: bool,
    notices: VecDeque<String>,
}

impl Dashboard {
    pub fn new(interview: InterviewId) -> Self {
        Self {
            interview,
            store: ResultStore::new(),
            tracker: RequestTracker::new(),
            editor: ThemeEditor::new(),
            chat: ChatSession::new(),
            chat_open: false,
            notices: VecDeque::new(),
        }
    }

    pub fn interview(&self) -> &InterviewId {
        &self.interview
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    pub fn editor(&self) -> &ThemeEditor {
        &self.editor
    }

    /// Draft edits (rename, describe, add, delete, prompt text) need no network call.
    pub fn editor_mut(&mut self) -> &mut ThemeEditor {
        &mut self.editor
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn is_chat_open(&self) -> bool {
        self.chat_open
    }

    pub fn phase(&self) -> Phase {
        let flags = TransientFlags {
            editor_open: self.editor.is_open(),
            rediscover_open: self.editor.is_rediscover_open(),
        };
        derive_phase(self.store.selected(), flags, &self.tracker)
    }

    /// Next operator notice (a failed operation), oldest first.
    pub fn pop_notice(&mut self) -> Option<String> {
        self.notices.pop_front()
    }

    pub fn has_notice(&self) -> bool {
        !self.notices.is_empty()
    }

    /// Initial (or manual) load of every topic result.
    pub fn load(&mut self) -> Request {
        self.store.begin_reload();
        Request::LoadResults { focus: None }
    }

    /// Selects the topic at `index`. Switching topics closes the editor and the
    /// chat panel and fetches the new topic's answers.
    pub fn select(&mut self, index: usize) -> Option<Request> {
        let previous = self.store.selected_topic().cloned();
        let topic = self.store.select(index)?;
        if previous.as_ref() == Some(&topic) {
            return None;
        }
        self.editor.close();
        self.chat_open = false;
        Some(Request::LoadAnswers { topic })
    }

    /// Starts a full pipeline run for the topic at `index`.
    pub fn run(&mut self, index: usize) -> Option<Request> {
        let topic = self.store.get(index)?.topic_id.clone();
        if !self.tracker.begin(OpKind::Run, &topic) {
            debug!(%topic, "run already in flight");
            return None;
        }
        self.store.patch(&topic, TopicPatch::status(Status::Running));
        info!(%topic, "starting analysis run");
        Some(Request::Run { topic })
    }

    /// Starts theme discovery for the topic at `index` with an optional steering prompt.
    pub fn discover(&mut self, index: usize, custom_prompt: &str) -> Option<Request> {
        let result = self.store.get(index)?;
        let topic = result.topic_id.clone();
        let previous = result.status;
        if !self.tracker.begin(OpKind::Discover, &topic) {
            debug!(%topic, "discovery already in flight");
            return None;
        }
        self.store.patch(&topic, TopicPatch::status(Status::Discovering));
        info!(%topic, "starting theme discovery");
        Some(Request::Discover { topic, custom_prompt: custom_prompt.to_owned(), previous })
    }

    /// Re-runs discovery for the selected topic using the editor's prompt panel.
    pub fn rediscover(&mut self) -> Option<Request> {
        let index = self.store.selected_index()?;
        let prompt = self.editor.take_prompt();
        self.discover(index, &prompt)
    }

    /// Opens the editor on the selected topic's stored drafts.
    pub fn open_editor(&mut self) -> Option<Request> {
        let result = self.store.selected()?;
        self.editor.open_from(result);
        Some(Request::LoadAnswers { topic: result.topic_id.clone() })
    }

    /// Leaves the editor without classifying; drafts are discarded.
    pub fn back_to_results(&mut self) {
        self.editor.close();
    }

    /// Sends the current drafts for classification. Refused when there are none.
    pub fn classify(&mut self) -> Option<Request> {
        if self.editor.drafts().is_empty() {
            return None;
        }
        let topic = self.store.selected_topic()?.clone();
        if !self.tracker.begin(OpKind::Classify, &topic) {
            debug!(%topic, "classification already in flight");
            return None;
        }
        self.store.patch(&topic, TopicPatch::status(Status::Classifying));
        info!(%topic, themes = self.editor.drafts().len(), "starting classification");
        Some(Request::Classify { topic, themes: self.editor.drafts().to_vec() })
    }

    pub fn send_chat(&mut self, input: &str) -> Option<Request> {
        self.chat.submit(input).map(Request::Chat)
    }

    pub fn toggle_chat(&mut self) {
        self.chat_open = !self.chat_open;
    }

    fn notify(&mut self, message: String) {
        warn!("{message}");
        self.notices.push_back(message);
    }

    fn reload_focused(&mut self, topic: TopicId) -> Vec<Request> {
        self.store.begin_reload();
        vec![Request::LoadResults { focus: Some(topic) }]
    }

    /// Folds a completed request back into the dashboard and returns the
    /// follow-up requests it triggers.
    pub fn apply(&mut self, outcome: Outcome) -> Vec<Request> {
        match outcome {
            Outcome::Results { focus, result } => match result {
                Ok(results) => {
                    let previous = self.store.selected_topic().cloned();
                    let selected = self.store.replace_all(results, focus.as_ref());
                    if previous != selected {
                        self.editor.close();
                        self.chat_open = false;
                    }
                    selected.map(|topic| Request::LoadAnswers { topic }).into_iter().collect()
                }
                Err(err) => {
                    self.store.record_load_failure("results", &err);
                    Vec::new()
                }
            },
            Outcome::Answers { topic, result } => {
                match result {
                    Ok(answers) => {
                        self.store.set_answers(&topic, answers);
                    }
                    Err(err) => self.store.record_load_failure("answers", &err),
                }
                Vec::new()
            }
            Outcome::Run { topic, result } => {
                self.tracker.end(OpKind::Run, &topic);
                match result {
                    Ok(()) => self.reload_focused(topic),
                    Err(err) => {
                        self.store.patch(&topic, TopicPatch::status(Status::Failed));
                        self.notify(err.describe("Analysis"));
                        Vec::new()
                    }
                }
            }
            Outcome::Discover { topic, previous, result } => {
                self.tracker.end(OpKind::Discover, &topic);
                match result {
                    Ok(drafts) => {
                        let patch = TopicPatch {
                            status: Some(Status::Editing),
                            proposed_themes: Some(drafts.clone()),
                            ..TopicPatch::default()
                        };
                        self.store.patch(&topic, patch);
                        if self.store.selected_topic() != Some(&topic) {
                            return Vec::new();
                        }
                        self.editor.open_with(drafts);
                        vec![Request::LoadAnswers { topic }]
                    }
                    Err(err) => {
                        self.store.patch(&topic, TopicPatch::status(previous));
                        self.notify(err.describe("Discovery"));
                        Vec::new()
                    }
                }
            }
            Outcome::Classify { topic, result } => {
                self.tracker.end(OpKind::Classify, &topic);
                match result {
                    Ok(()) => {
                        if self.store.selected_topic() == Some(&topic) {
                            self.editor.close();
                        }
                        self.reload_focused(topic)
                    }
                    Err(err) => {
                        self.store.patch(&topic, TopicPatch::status(Status::Editing));
                        self.notify(err.describe("Classification"));
                        Vec::new()
                    }
                }
            }
            Outcome::Chat(result) => {
                self.chat.complete(result);
                Vec::new()
            }
        }
    }

    /// Runs `request` and every follow-up it triggers, one at a time.
    pub async fn drive(&mut self, service: &dyn AnalysisService, request: Request) {
        let mut queue = VecDeque::from([request]);
        while let Some(next) = queue.pop_front() {
            let outcome = execute(service, next).await;
            queue.extend(self.apply(outcome));
        }
    }
}
