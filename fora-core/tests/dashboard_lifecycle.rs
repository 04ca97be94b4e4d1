//! End-to-end dashboard flows against an in-memory analysis service.
//!
//! Exercises: load, run, discover, draft editing, classify, chat, and the
//! revert-and-notify path of every mutating operation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fora_core::api::AnalysisService;
use fora_core::controller::{Dashboard, Request};
use fora_core::error::ApiError;
use fora_core::ids::{AnswerId, InterviewId, TopicId};
use fora_core::phase::Phase;
use fora_core::tracker::OpKind;
use fora_core::types::{Answer, ChatMessage, Role, Status, Theme, ThemeDraft, TopicResult};

/// Scripted service. Mutating calls update the stored results the way the real
/// service would, so follow-up reloads observe their effect.
#[derive(Default)]
struct FakeService {
    results: Mutex<Vec<TopicResult>>,
    answers: HashMap<TopicId, Vec<Answer>>,
    discovered: Vec<ThemeDraft>,
    fail_with: Mutex<Option<String>>,
    classify_bodies: Mutex<Vec<Vec<ThemeDraft>>>,
    prompts: Mutex<Vec<String>>,
    chat_histories: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeService {
    fn failure(&self) -> Result<(), ApiError> {
        match self.fail_with.lock().unwrap().take() {
            Some(message) => Err(ApiError::rejected(Some(message))),
            None => Ok(()),
        }
    }

    fn set_status(&self, topic: &TopicId, status: Status) {
        let mut results = self.results.lock().unwrap();
        if let Some(r) = results.iter_mut().find(|r| &r.topic_id == topic) {
            r.status = status;
        }
    }
}

#[async_trait]
impl AnalysisService for FakeService {
    async fn list_results(&self) -> Result<Vec<TopicResult>, ApiError> {
        Ok(self.results.lock().unwrap().clone())
    }

    async fn list_answers(&self, topic: &TopicId) -> Result<Vec<Answer>, ApiError> {
        Ok(self.answers.get(topic).cloned().unwrap_or_default())
    }

    async fn run(&self, topic: &TopicId) -> Result<(), ApiError> {
        self.failure()?;
        self.set_status(topic, Status::Completed);
        Ok(())
    }

    async fn discover(&self, topic: &TopicId, custom_prompt: &str) -> Result<Vec<ThemeDraft>, ApiError> {
        self.prompts.lock().unwrap().push(custom_prompt.to_owned());
        self.failure()?;
        self.set_status(topic, Status::Editing);
        Ok(self.discovered.clone())
    }

    async fn classify(&self, topic: &TopicId, themes: &[ThemeDraft]) -> Result<(), ApiError> {
        self.classify_bodies.lock().unwrap().push(themes.to_vec());
        self.failure()?;
        let mut results = self.results.lock().unwrap();
        if let Some(r) = results.iter_mut().find(|r| &r.topic_id == topic) {
            r.status = Status::Completed;
            r.proposed_themes = themes.to_vec();
            r.themes = themes
                .iter()
                .map(|d| Theme { name: d.name.clone(), description: d.description.clone(), count: 1, ..Theme::default() })
                .collect();
        }
        Ok(())
    }

    async fn chat(&self, _message: &str, history: &[ChatMessage]) -> Result<String, ApiError> {
        self.chat_histories.lock().unwrap().push(history.to_vec());
        self.failure()?;
        Ok("Most answers mention commute times.".to_owned())
    }
}

fn topic(id: i64, status: Status) -> TopicResult {
    TopicResult {
        topic_id: TopicId::from(id),
        topic_text: format!("Question {id}"),
        status,
        ..TopicResult::default()
    }
}

fn service() -> FakeService {
    let mut answers = HashMap::new();
    answers.insert(
        TopicId::from(1),
        vec![Answer { id: AnswerId::from(10), text: "The food was great".to_owned() }],
    );
    FakeService {
        results: Mutex::new(vec![topic(1, Status::Failed), topic(2, Status::Pending)]),
        answers,
        discovered: vec![
            ThemeDraft::new("A", ""),
            ThemeDraft::new("B", "second"),
            ThemeDraft::new("C", ""),
        ],
        ..FakeService::default()
    }
}

async fn loaded(svc: &FakeService) -> Dashboard {
    let mut dash = Dashboard::new(InterviewId::from(7));
    let request = dash.load();
    dash.drive(svc, request).await;
    dash
}

#[tokio::test]
async fn initial_load_falls_back_to_first_topic_and_loads_answers() {
    let svc = service();
    let dash = loaded(&svc).await;
    assert_eq!(dash.store().selected_topic(), Some(&TopicId::from(1)));
    assert_eq!(dash.store().answers().len(), 1);
    assert_eq!(dash.phase(), Phase::Setup);
}

#[tokio::test]
async fn run_then_reload_lands_in_results() {
    let svc = service();
    let mut dash = loaded(&svc).await;

    let request = dash.run(0).unwrap();
    assert_eq!(dash.phase(), Phase::Setup);
    dash.drive(&svc, request).await;

    assert!(!dash.tracker().is_busy(OpKind::Run, &TopicId::from(1)));
    assert_eq!(dash.store().selected().unwrap().status, Status::Completed);
    assert_eq!(dash.phase(), Phase::Results);
}

#[tokio::test]
async fn classify_sends_remaining_drafts_in_order() {
    let svc = service();
    let mut dash = loaded(&svc).await;

    let request = dash.discover(0, "").unwrap();
    dash.drive(&svc, request).await;
    assert_eq!(dash.phase(), Phase::Editor);
    assert_eq!(dash.editor().drafts().len(), 3);
    assert_eq!(dash.store().selected().unwrap().status, Status::Editing);

    dash.editor_mut().delete(1);
    let request = dash.classify().unwrap();
    dash.drive(&svc, request).await;

    let bodies = svc.classify_bodies.lock().unwrap();
    assert_eq!(bodies.as_slice(), &[vec![ThemeDraft::new("A", ""), ThemeDraft::new("C", "")]]);
    assert_eq!(dash.phase(), Phase::Results);
    assert!(!dash.editor().is_open());
    assert_eq!(dash.store().selected().unwrap().themes.len(), 2);
}

#[tokio::test]
async fn rediscover_forwards_the_prompt_and_closes_the_panel() {
    let svc = service();
    let mut dash = loaded(&svc).await;
    let request = dash.discover(0, "").unwrap();
    dash.drive(&svc, request).await;

    dash.editor_mut().toggle_rediscover();
    dash.editor_mut().set_prompt("split pay from benefits");
    let request = dash.rediscover().unwrap();
    assert!(!dash.editor().is_rediscover_open());
    dash.drive(&svc, request).await;

    assert_eq!(svc.prompts.lock().unwrap().as_slice(), ["", "split pay from benefits"]);
    assert!(dash.editor().is_open());
}

#[tokio::test]
async fn failures_revert_status_notify_and_clear_busy() {
    let svc = service();
    let mut dash = loaded(&svc).await;

    *svc.fail_with.lock().unwrap() = Some("LLM timeout".to_owned());
    let request = dash.run(0).unwrap();
    dash.drive(&svc, request).await;
    assert_eq!(dash.store().selected().unwrap().status, Status::Failed);
    assert_eq!(dash.pop_notice().as_deref(), Some("Analysis failed: LLM timeout"));
    assert!(!dash.tracker().is_topic_busy(&TopicId::from(1)));

    let request = dash.discover(0, "").unwrap();
    dash.drive(&svc, request).await;
    *svc.fail_with.lock().unwrap() = Some("bad themes".to_owned());
    let request = dash.classify().unwrap();
    dash.drive(&svc, request).await;
    assert_eq!(dash.store().selected().unwrap().status, Status::Editing);
    assert_eq!(dash.phase(), Phase::Editor);
    assert_eq!(dash.pop_notice().as_deref(), Some("Classification failed: bad themes"));
    assert_eq!(dash.tracker().in_flight(), 0);
}

#[tokio::test]
async fn chat_history_grows_and_errors_become_messages() {
    let svc = service();
    let mut dash = loaded(&svc).await;
    dash.toggle_chat();

    let request = dash.send_chat("what do people dislike?").unwrap();
    assert!(dash.send_chat("second").is_none());
    dash.drive(&svc, request).await;

    *svc.fail_with.lock().unwrap() = Some("model offline".to_owned());
    let request = dash.send_chat("and like?").unwrap();
    assert!(matches!(&request, Request::Chat(c) if c.history.len() == 2));
    dash.drive(&svc, request).await;

    let messages = dash.chat().messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[3].content, "Error: model offline");
    assert!(!dash.chat().is_loading());
    assert!(dash.is_chat_open());
}
