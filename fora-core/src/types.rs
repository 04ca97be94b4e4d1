use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::ids::{AnswerId, TopicId};

/// Name of the catch-all theme. Always sorted last and drawn in neutral gray.
pub const OTHER_THEME: &str = "Other";

/// Lifecycle status of one topic's analysis.
///
/// The authoritative copy lives on the analysis service; the client holds a cached
/// or optimistically patched copy. Unknown strings (e.g. `not_analyzed`) decode as
/// `Pending`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Running,
    Failed,
    Discovering,
    Editing,
    Classifying,
    Completed,
    #[default]
    #[serde(other)]
    Pending,
}

/// Decodes an absent or `null` field as `T::default()`.
///
/// The service sends `null` for empty collections on some routes.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Failed => "failed",
            Status::Discovering => "discovering",
            Status::Editing => "editing",
            Status::Classifying => "classifying",
            Status::Completed => "completed",
        }
    }
}

/// A classified theme with its supporting answers.
///
/// Every key of `excerpts` should also appear in `answer_ids`; the service does not
/// guarantee it, so consumers look excerpts up by key and never index by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer_ids: Vec<AnswerId>, // set semantics; order kept for display
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpts: BTreeMap<AnswerId, String>,
    /// Sample member answers with their excerpt, at most eight.
    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: Vec<ThemeAnswer>,
}

/// One sample answer listed under a theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeAnswer {
    pub id: AnswerId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,
}

impl Theme {
    pub fn is_other(&self) -> bool {
        self.name == OTHER_THEME
    }

    pub fn contains(&self, answer: &AnswerId) -> bool {
        self.answer_ids.contains(answer)
    }

    /// Returns the excerpt attributed to `answer`, ignoring empty strings.
    pub fn excerpt_for(&self, answer: &AnswerId) -> Option<&str> {
        self.excerpts
            .get(answer)
            .map(String::as_str)
            .filter(|e| !e.is_empty())
    }

    /// Excerpt keys that do not name a member answer (upstream inconsistency).
    pub fn orphan_excerpts(&self) -> impl Iterator<Item = &AnswerId> {
        self.excerpts.keys().filter(|id| !self.answer_ids.contains(id))
    }
}

/// The user-editable part of a theme before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDraft {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

impl ThemeDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into() }
    }
}

/// Sentiment score of one answer, 1..=10, absent when the answer was not scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    pub id: AnswerId,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: Vec<ScoredAnswer>,
}

/// Analysis result for one topic, as served by the results endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicResult {
    #[serde(alias = "interview_id")]
    pub topic_id: TopicId,
    #[serde(default, alias = "interview_text", deserialize_with = "null_as_default")]
    pub topic_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_default")]
    pub themes: Vec<Theme>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub proposed_themes: Vec<ThemeDraft>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default)]
    pub analyzed_at: Option<String>, // ISO-8601, display only
}

impl TopicResult {
    /// Themes in display order: "Other" last, the rest by count descending.
    ///
    /// The sort is stable, so equal counts keep the service's order.
    pub fn sorted_themes(&self) -> Vec<&Theme> {
        sort_themes(&self.themes)
    }

    /// True when at least one answer carries sentiment data.
    pub fn has_sentiment(&self) -> bool {
        self.sentiment.as_ref().is_some_and(|s| !s.answers.is_empty())
    }

    /// Score of `answer`, or `None` when unscored or unknown.
    pub fn score_of(&self, answer: &AnswerId) -> Option<f64> {
        self.sentiment
            .as_ref()?
            .answers
            .iter()
            .find(|a| &a.id == answer)
            .and_then(|a| a.score)
    }

    /// Mean score of the theme's scored member answers.
    ///
    /// Unscored members are ignored; `None` when no member is scored.
    pub fn theme_sentiment(&self, theme: &Theme) -> Option<f64> {
        let scores: Vec<f64> = theme.answer_ids.iter().filter_map(|id| self.score_of(id)).collect();
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Sorts themes for display: "Other" forced last, then count descending (stable).
pub fn sort_themes(themes: &[Theme]) -> Vec<&Theme> {
    let mut sorted: Vec<&Theme> = themes.iter().collect();
    sorted.sort_by(|a, b| {
        a.is_other()
            .cmp(&b.is_other())
            .then_with(|| b.count.cmp(&a.count))
    });
    sorted
}

/// Raw text of one answer, as served by the answers endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the append-only chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Shallow optimistic update for one `TopicResult`. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicPatch {
    pub status: Option<Status>,
    pub themes: Option<Vec<Theme>>,
    pub proposed_themes: Option<Vec<ThemeDraft>>,
}

impl TopicPatch {
    pub fn status(status: Status) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn apply_to(self, result: &mut TopicResult) {
        if let Some(status) = self.status {
            result.status = status;
        }
        if let Some(themes) = self.themes {
            result.themes = themes;
        }
        if let Some(drafts) = self.proposed_themes {
            result.proposed_themes = drafts;
        }
    }
}
