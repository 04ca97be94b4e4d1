//! Editable list of proposed themes, plus the inline re-discover prompt.
//!
//! Drafts live only while the editor is open. They are seeded from a discovery
//! response or from the topic's stored `proposed_themes`, and discarded on close.

use std::collections::HashMap;

use crate::types::{ThemeDraft, TopicResult};

/// Name given to a theme added by the operator.
pub const NEW_THEME_NAME: &str = "New theme";

#[derive(Debug, Default, Clone)]
pub struct ThemeEditor {
    drafts: Vec<ThemeDraft>,
    open: bool,
    rediscover_open: bool,
    prompt: String,
}

impl ThemeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_rediscover_open(&self) -> bool {
        self.rediscover_open
    }

    pub fn drafts(&self) -> &[ThemeDraft] {
        &self.drafts
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn open_with(&mut self, drafts: Vec<ThemeDraft>) {
        self.drafts = drafts;
        self.open = true;
    }

    /// Opens the editor on the topic's stored drafts, ordered like the results view:
    /// by the count of the classified theme with the same name, descending.
    pub fn open_from(&mut self, result: &TopicResult) {
        let counts: HashMap<&str, u32> =
            result.themes.iter().map(|t| (t.name.as_str(), t.count)).collect();
        let mut drafts = result.proposed_themes.clone();
        drafts.sort_by_key(|d| std::cmp::Reverse(counts.get(d.name.as_str()).copied().unwrap_or(0)));
        self.open_with(drafts);
    }

    /// Closes the editor, dropping drafts and the re-discover prompt.
    pub fn close(&mut self) {
        self.drafts.clear();
        self.open = false;
        self.rediscover_open = false;
        self.prompt.clear();
    }

    pub fn rename(&mut self, index: usize, name: &str) {
        if let Some(draft) = self.drafts.get_mut(index) {
            draft.name = name.trim().to_owned();
        }
    }

    pub fn describe(&mut self, index: usize, description: &str) {
        if let Some(draft) = self.drafts.get_mut(index) {
            draft.description = description.trim().to_owned();
        }
    }

    pub fn delete(&mut self, index: usize) {
        if index < self.drafts.len() {
            self.drafts.remove(index);
        }
    }

    /// Appends a placeholder draft and returns its index.
    pub fn add(&mut self) -> usize {
        self.drafts.push(ThemeDraft::new(NEW_THEME_NAME, ""));
        self.drafts.len() - 1
    }

    /// Opens or closes the re-discover prompt panel; closing clears the prompt.
    pub fn toggle_rediscover(&mut self) {
        self.rediscover_open = !self.rediscover_open;
        if !self.rediscover_open {
            self.prompt.clear();
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Closes the prompt panel and hands back its text.
    pub fn take_prompt(&mut self) -> String {
        self.rediscover_open = false;
        std::mem::take(&mut self.prompt)
    }
}
