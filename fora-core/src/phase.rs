//! View phase derivation.
//!
//! The dashboard shows one of three views for the selected topic. The phase is
//! never stored; it is recomputed from the topic's status, the in-flight run flag
//! and the editor flag on every read.
//!
//! Precedence when several rules match: `None` > `Setup` > `Editor` > `Results`.
//! `Editor` deliberately overrides `Results` so a completed topic can be re-edited.

use crate::tracker::{OpKind, RequestTracker};
use crate::types::{Status, TopicResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No topic selected.
    None,
    /// Not analysed yet, failed, or a pipeline run is in flight.
    Setup,
    /// Theme editor: discovery in flight, drafts awaiting classification, or
    /// opened by the operator.
    Editor,
    /// Classified themes and charts.
    Results,
}

impl Phase {
    pub fn is_setup(self) -> bool {
        self == Phase::Setup
    }

    pub fn is_editor(self) -> bool {
        self == Phase::Editor
    }

    pub fn is_results(self) -> bool {
        self == Phase::Results
    }
}

/// Local, never-persisted view flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransientFlags {
    pub editor_open: bool,
    pub rediscover_open: bool,
}

pub fn derive_phase(
    result: Option<&TopicResult>,
    flags: TransientFlags,
    tracker: &RequestTracker,
) -> Phase {
    let Some(result) = result else {
        return Phase::None;
    };
    let running = tracker.is_busy(OpKind::Run, &result.topic_id);
    match result.status {
        Status::Pending | Status::Failed | Status::Running => Phase::Setup,
        _ if running => Phase::Setup,
        _ if flags.editor_open => Phase::Editor,
        Status::Discovering | Status::Editing => Phase::Editor,
        Status::Classifying | Status::Completed => Phase::Results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TopicId;

    const ALL: [Status; 7] = [
        Status::Pending,
        Status::Running,
        Status::Failed,
        Status::Discovering,
        Status::Editing,
        Status::Classifying,
        Status::Completed,
    ];

    fn result(status: Status) -> TopicResult {
        TopicResult { topic_id: TopicId::from("T"), status, ..TopicResult::default() }
    }

    #[test]
    fn no_selection_is_none_and_every_predicate_is_false() {
        let phase = derive_phase(None, TransientFlags { editor_open: true, ..Default::default() }, &RequestTracker::new());
        assert_eq!(phase, Phase::None);
        assert!(!phase.is_setup() && !phase.is_editor() && !phase.is_results());
    }

    #[test]
    fn exactly_one_predicate_holds_for_every_input() {
        let topic = TopicId::from("T");
        for status in ALL {
            for editor_open in [false, true] {
                for running in [false, true] {
                    let mut tracker = RequestTracker::new();
                    if running {
                        tracker.begin(OpKind::Run, &topic);
                    }
                    let flags = TransientFlags { editor_open, rediscover_open: false };
                    let phase = derive_phase(Some(&result(status)), flags, &tracker);
                    let held = [phase.is_setup(), phase.is_editor(), phase.is_results()];
                    assert_eq!(held.iter().filter(|b| **b).count(), 1, "{status:?} {flags:?} {running}");
                    if running {
                        assert_eq!(phase, Phase::Setup);
                    }
                }
            }
        }
    }

    #[test]
    fn run_flag_overrides_a_completed_status() {
        let topic = TopicId::from("T");
        let mut tracker = RequestTracker::new();
        let flags = TransientFlags::default();

        assert_eq!(derive_phase(Some(&result(Status::Failed)), flags, &tracker), Phase::Setup);
        tracker.begin(OpKind::Run, &topic);
        assert_eq!(derive_phase(Some(&result(Status::Failed)), flags, &tracker), Phase::Setup);
        assert_eq!(derive_phase(Some(&result(Status::Completed)), flags, &tracker), Phase::Setup);
        tracker.end(OpKind::Run, &topic);
        assert_eq!(derive_phase(Some(&result(Status::Completed)), flags, &tracker), Phase::Results);
    }

    #[test]
    fn editor_wins_over_results_and_discovery_forces_it() {
        let tracker = RequestTracker::new();
        let open = TransientFlags { editor_open: true, rediscover_open: false };
        assert_eq!(derive_phase(Some(&result(Status::Completed)), open, &tracker), Phase::Editor);
        assert_eq!(
            derive_phase(Some(&result(Status::Discovering)), TransientFlags::default(), &tracker),
            Phase::Editor
        );
        assert_eq!(
            derive_phase(Some(&result(Status::Classifying)), TransientFlags::default(), &tracker),
            Phase::Results
        );
    }
}
