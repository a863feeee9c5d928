// Comments, replies and reactions attached to an outfit
pub mod intent;
pub mod reactions;
pub mod service;
pub mod submission;
pub mod tree;

pub use intent::{Intent, NodeKey, ReactionTarget};
pub use reactions::{ReactionKind, ReactionSet};
pub use service::{EngagementService, MutationOutcome};
pub use submission::{SubmissionState, SubmissionTracker};
pub use tree::{validate_text, EngagementTree, MAX_TEXT_LEN};
