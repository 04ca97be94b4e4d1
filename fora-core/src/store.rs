//! In-memory cache of per-topic results and the selected topic's answers.
//!
//! The store only holds state; fetching is issued by [`crate::controller`]. Each
//! method here is one synchronous transition applied when a response arrives or an
//! optimistic update is made, so an event loop can interleave them freely.
//!
//! Failed loads never clear what is already cached: the previous results and
//! answers stay on screen and the failure is recorded as a diagnostic line.

use tracing::{debug, warn};

use crate::ids::TopicId;
use crate::types::{Answer, Status, TopicPatch, TopicResult};

#[derive(Debug, Default)]
pub struct ResultStore {
    results: Vec<TopicResult>,
    selected: Option<usize>,
    answers: Vec<Answer>,
    answers_for: Option<TopicId>,
    loading: bool,
    diagnostic: Option<String>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[TopicResult] {
        &self.results
    }

    pub fn get(&self, index: usize) -> Option<&TopicResult> {
        self.results.get(index)
    }

    pub fn position(&self, topic: &TopicId) -> Option<usize> {
        self.results.iter().position(|r| &r.topic_id == topic)
    }

    pub fn find(&self, topic: &TopicId) -> Option<&TopicResult> {
        self.results.iter().find(|r| &r.topic_id == topic)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&TopicResult> {
        self.selected.and_then(|i| self.results.get(i))
    }

    pub fn selected_topic(&self) -> Option<&TopicId> {
        self.selected().map(|r| &r.topic_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Answers of the selected topic (possibly stale after a failed reload).
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Last non-blocking load failure, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn begin_reload(&mut self) {
        self.loading = true;
    }

    /// Replaces every cached result with an authoritative list.
    ///
    /// Selection goes to `focus` when it is still present, otherwise to the first
    /// completed topic, otherwise to the first topic; an empty list clears it.
    /// Returns the newly selected topic so the caller can load its answers.
    pub fn replace_all(&mut self, results: Vec<TopicResult>, focus: Option<&TopicId>) -> Option<TopicId> {
        self.loading = false;
        self.diagnostic = None;
        for result in &results {
            for theme in &result.themes {
                let orphans = theme.orphan_excerpts().count();
                if orphans > 0 {
                    warn!(topic = %result.topic_id, theme = %theme.name, orphans, "excerpts reference answers outside the theme");
                }
            }
        }
        self.results = results;
        self.selected = None;

        let index = focus
            .and_then(|t| self.position(t))
            .or_else(|| self.results.iter().position(|r| r.status == Status::Completed))
            .or_else(|| (!self.results.is_empty()).then_some(0));
        debug!(count = self.results.len(), selected = ?index, "results replaced");
        match index {
            Some(i) => self.select(i),
            None => {
                self.answers.clear();
                self.answers_for = None;
                None
            }
        }
    }

    /// Records a failed load without touching cached data.
    pub fn record_load_failure(&mut self, what: &str, error: &impl std::fmt::Display) {
        self.loading = false;
        warn!(%error, "failed to load {what}");
        self.diagnostic = Some(format!("Failed to load {what}: {error}"));
    }

    /// Shallow optimistic update of one topic. Returns `false` if the topic is unknown.
    pub fn patch(&mut self, topic: &TopicId, patch: TopicPatch) -> bool {
        match self.results.iter_mut().find(|r| &r.topic_id == topic) {
            Some(result) => {
                patch.apply_to(result);
                true
            }
            None => false,
        }
    }

    /// Selects the topic at `index`. Cached answers are dropped when the selected
    /// topic changes. Returns the selected topic, or `None` if `index` is out of range.
    pub fn select(&mut self, index: usize) -> Option<TopicId> {
        let topic = self.results.get(index)?.topic_id.clone();
        self.selected = Some(index);
        if self.answers_for.as_ref() != Some(&topic) {
            self.answers.clear();
            self.answers_for = None;
        }
        Some(topic)
    }

    /// Stores answers fetched for `topic`. Ignored when another topic has since
    /// been selected.
    pub fn set_answers(&mut self, topic: &TopicId, answers: Vec<Answer>) -> bool {
        if self.selected_topic() != Some(topic) {
            debug!(%topic, "dropping answers for a topic that is no longer selected");
            return false;
        }
        self.answers = answers;
        self.answers_for = Some(topic.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::AnswerId;

    fn result(id: i64, status: Status) -> TopicResult {
        TopicResult { topic_id: TopicId::from(id), status, ..TopicResult::default() }
    }

    fn answer(id: i64, text: &str) -> Answer {
        Answer { id: AnswerId::from(id), text: text.to_owned() }
    }

    #[test]
    fn default_focus_prefers_first_completed() {
        let mut store = ResultStore::new();
        let selected = store.replace_all(
            vec![result(1, Status::Failed), result(2, Status::Completed), result(3, Status::Completed)],
            None,
        );
        assert_eq!(selected, Some(TopicId::from(2)));
        assert_eq!(store.selected_index(), Some(1));
    }

    #[test]
    fn default_focus_falls_back_to_first_then_none() {
        let mut store = ResultStore::new();
        assert_eq!(store.replace_all(vec![result(1, Status::Pending)], None), Some(TopicId::from(1)));
        assert_eq!(store.replace_all(Vec::new(), None), None);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn explicit_focus_survives_reordering() {
        let mut store = ResultStore::new();
        let focus = TopicId::from(3);
        store.replace_all(
            vec![result(3, Status::Failed), result(1, Status::Completed)],
            Some(&focus),
        );
        assert_eq!(store.selected_topic(), Some(&focus));
    }

    #[test]
    fn failed_load_keeps_previous_answers() {
        let mut store = ResultStore::new();
        let topic = store.replace_all(vec![result(1, Status::Completed)], None).unwrap();
        store.set_answers(&topic, vec![answer(1, "too slow")]);
        store.record_load_failure("answers", &"connection refused");
        assert_eq!(store.answers().len(), 1);
        assert!(store.diagnostic().unwrap().contains("connection refused"));
    }

    #[test]
    fn answers_for_a_deselected_topic_are_dropped() {
        let mut store = ResultStore::new();
        store.replace_all(vec![result(1, Status::Completed), result(2, Status::Completed)], None);
        store.select(1);
        assert!(!store.set_answers(&TopicId::from(1), vec![answer(9, "stale")]));
        assert!(store.answers().is_empty());
    }

    #[test]
    fn patch_touches_only_the_matching_topic() {
        let mut store = ResultStore::new();
        store.replace_all(vec![result(1, Status::Completed), result(2, Status::Completed)], None);
        assert!(store.patch(&TopicId::from(2), TopicPatch::status(Status::Running)));
        assert_eq!(store.results()[0].status, Status::Completed);
        assert_eq!(store.results()[1].status, Status::Running);
        assert!(!store.patch(&TopicId::from(9), TopicPatch::status(Status::Failed)));
    }
}
