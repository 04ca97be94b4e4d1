//! Advisory in-flight markers for mutating operations.
//!
//! A flag is keyed by `(OpKind, TopicId)`. Flags disable competing actions in the
//! UI and let [`crate::phase`] show the setup view while a pipeline run is in
//! flight. They are not a lock: nothing stops a stale response from another flow
//! writing the same topic, and the three kinds are not mutually exclusive.

use std::collections::HashSet;

use crate::ids::TopicId;

/// The mutating operations that can be in flight for a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Full pipeline run (discovery + classification + sentiment).
    Run,
    /// Theme re-discovery.
    Discover,
    /// Classification against the edited themes.
    Classify,
}

#[derive(Debug, Default, Clone)]
pub struct RequestTracker {
    busy: HashSet<(OpKind, TopicId)>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `topic` busy for `kind`. Returns `false` if it already was.
    pub fn begin(&mut self, kind: OpKind, topic: &TopicId) -> bool {
        self.busy.insert((kind, topic.clone()))
    }

    /// Clears the flag. Clearing an already-clear flag is a no-op.
    pub fn end(&mut self, kind: OpKind, topic: &TopicId) {
        self.busy.remove(&(kind, topic.clone()));
    }

    pub fn is_busy(&self, kind: OpKind, topic: &TopicId) -> bool {
        self.busy.contains(&(kind, topic.clone()))
    }

    /// True when any kind of operation is in flight for `topic`.
    pub fn is_topic_busy(&self, topic: &TopicId) -> bool {
        self.busy.iter().any(|(_, t)| t == topic)
    }

    pub fn in_flight(&self) -> usize {
        self.busy.len()
    }
}
