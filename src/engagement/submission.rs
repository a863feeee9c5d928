// Per-node submission tracking: idle -> submitting -> (resolved | failed)
use std::collections::HashMap;

use crate::engagement::intent::NodeKey;
use crate::error::{CatalogError, CatalogResult};
use crate::models::OutfitId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Resolved,
    Failed(String),
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u64,
    state: SubmissionState,
}

/// Tracks which controls have a request in flight.
///
/// Locking is per node: a submission on one comment never blocks another.
/// Entries remember the view generation they were started under so that a
/// late completion cannot overwrite state for a reopened view.
#[derive(Debug, Default)]
pub struct SubmissionTracker {
    entries: HashMap<NodeKey, Entry>,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &NodeKey) -> SubmissionState {
        self.entries
            .get(key)
            .map(|e| e.state.clone())
            .unwrap_or_default()
    }

    pub fn is_submitting(&self, key: &NodeKey) -> bool {
        self.state(key).is_submitting()
    }

    /// Idle/resolved/failed -> submitting. Rejects a second submission on the same node.
    pub fn begin(&mut self, key: NodeKey, generation: u64) -> CatalogResult<()> {
        if self.is_submitting(&key) {
            return Err(CatalogError::Busy(key.to_string()));
        }
        self.entries.insert(
            key,
            Entry {
                generation,
                state: SubmissionState::Submitting,
            },
        );
        Ok(())
    }

    pub fn resolve(&mut self, key: &NodeKey, generation: u64) -> bool {
        self.finish(key, generation, SubmissionState::Resolved)
    }

    pub fn fail(&mut self, key: &NodeKey, generation: u64, reason: impl Into<String>) -> bool {
        self.finish(key, generation, SubmissionState::Failed(reason.into()))
    }

    /// Forget every entry belonging to an outfit whose view was closed.
    pub fn clear_outfit(&mut self, outfit_id: &OutfitId) {
        self.entries.retain(|key, _| key.outfit_id() != outfit_id);
    }

    fn finish(&mut self, key: &NodeKey, generation: u64, state: SubmissionState) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if entry.generation == generation && entry.state.is_submitting() => {
                entry.state = state;
                true
            }
            _ => {
                tracing::debug!("Ignoring completion for {} (generation {})", key, generation);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommentId;

    fn comment_key(c: &str) -> NodeKey {
        NodeKey::Comment(OutfitId::new("o1"), CommentId::new(c))
    }

    #[test]
    fn unknown_nodes_are_idle() {
        let tracker = SubmissionTracker::new();
        assert_eq!(tracker.state(&comment_key("c1")), SubmissionState::Idle);
    }

    #[test]
    fn full_lifecycle() {
        let mut tracker = SubmissionTracker::new();
        let key = comment_key("c1");

        tracker.begin(key.clone(), 0).unwrap();
        assert!(tracker.is_submitting(&key));

        assert!(tracker.resolve(&key, 0));
        assert_eq!(tracker.state(&key), SubmissionState::Resolved);

        tracker.begin(key.clone(), 0).unwrap();
        assert!(tracker.fail(&key, 0, "offline"));
        assert_eq!(tracker.state(&key), SubmissionState::Failed("offline".into()));
    }

    #[test]
    fn same_node_cannot_submit_twice() {
        let mut tracker = SubmissionTracker::new();
        let key = comment_key("c1");
        tracker.begin(key.clone(), 0).unwrap();
        assert!(matches!(
            tracker.begin(key, 0),
            Err(CatalogError::Busy(_))
        ));
    }

    #[test]
    fn different_nodes_are_independent() {
        let mut tracker = SubmissionTracker::new();
        tracker.begin(comment_key("c1"), 0).unwrap();
        tracker.begin(comment_key("c2"), 0).unwrap();
        assert!(tracker.resolve(&comment_key("c2"), 0));
        assert!(tracker.is_submitting(&comment_key("c1")));
    }

    #[test]
    fn completion_from_an_older_generation_is_ignored() {
        let mut tracker = SubmissionTracker::new();
        let key = comment_key("c1");
        tracker.begin(key.clone(), 0).unwrap();
        tracker.clear_outfit(&OutfitId::new("o1"));
        tracker.begin(key.clone(), 1).unwrap();

        assert!(!tracker.resolve(&key, 0));
        assert!(tracker.is_submitting(&key));
        assert!(tracker.resolve(&key, 1));
    }

    #[test]
    fn clear_outfit_only_touches_that_outfit() {
        let mut tracker = SubmissionTracker::new();
        let other = NodeKey::Outfit(OutfitId::new("o2"));
        tracker.begin(comment_key("c1"), 0).unwrap();
        tracker.begin(other.clone(), 0).unwrap();

        tracker.clear_outfit(&OutfitId::new("o1"));
        assert_eq!(tracker.state(&comment_key("c1")), SubmissionState::Idle);
        assert!(tracker.is_submitting(&other));
    }
}
