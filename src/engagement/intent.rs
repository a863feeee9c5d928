use std::fmt;

use crate::engagement::reactions::ReactionKind;
use crate::models::{CommentId, OutfitId, ReplyId};

/// Where a reaction toggle lands in the two-level tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReactionTarget {
    Outfit,
    Comment(CommentId),
    Reply(CommentId, ReplyId),
}

/// A validated request to change an outfit's engagement.
///
/// Intents never touch local state; the catalog API resolves them and
/// answers with the full outfit document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddComment {
        text: String,
    },
    RemoveComment {
        comment_id: CommentId,
    },
    AddReply {
        comment_id: CommentId,
        text: String,
    },
    RemoveReply {
        comment_id: CommentId,
        reply_id: ReplyId,
    },
    ToggleReaction {
        target: ReactionTarget,
        kind: ReactionKind,
    },
}

/// A control on screen that can have one submission in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Outfit(OutfitId),
    CommentComposer(OutfitId),
    Comment(OutfitId, CommentId),
    ReplyComposer(OutfitId, CommentId),
    Reply(OutfitId, CommentId, ReplyId),
}

impl NodeKey {
    pub fn outfit_id(&self) -> &OutfitId {
        match self {
            Self::Outfit(id)
            | Self::CommentComposer(id)
            | Self::Comment(id, _)
            | Self::ReplyComposer(id, _)
            | Self::Reply(id, _, _) => id,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outfit(o) => write!(f, "outfit {o}"),
            Self::CommentComposer(o) => write!(f, "new comment on outfit {o}"),
            Self::Comment(o, c) => write!(f, "comment {c} on outfit {o}"),
            Self::ReplyComposer(o, c) => write!(f, "new reply to comment {c} on outfit {o}"),
            Self::Reply(o, c, r) => write!(f, "reply {r} to comment {c} on outfit {o}"),
        }
    }
}

impl Intent {
    pub fn node_key(&self, outfit_id: &OutfitId) -> NodeKey {
        let outfit_id = outfit_id.clone();
        match self {
            Self::AddComment { .. } => NodeKey::CommentComposer(outfit_id),
            Self::RemoveComment { comment_id } => NodeKey::Comment(outfit_id, comment_id.clone()),
            Self::AddReply { comment_id, .. } => {
                NodeKey::ReplyComposer(outfit_id, comment_id.clone())
            }
            Self::RemoveReply {
                comment_id,
                reply_id,
            } => NodeKey::Reply(outfit_id, comment_id.clone(), reply_id.clone()),
            Self::ToggleReaction { target, .. } => match target {
                ReactionTarget::Outfit => NodeKey::Outfit(outfit_id),
                ReactionTarget::Comment(c) => NodeKey::Comment(outfit_id, c.clone()),
                ReactionTarget::Reply(c, r) => NodeKey::Reply(outfit_id, c.clone(), r.clone()),
            },
        }
    }

    /// Short name for logs
    pub fn action(&self) -> &'static str {
        match self {
            Self::AddComment { .. } => "add_comment",
            Self::RemoveComment { .. } => "remove_comment",
            Self::AddReply { .. } => "add_reply",
            Self::RemoveReply { .. } => "remove_reply",
            Self::ToggleReaction {
                kind: ReactionKind::Like,
                ..
            } => "toggle_like",
            Self::ToggleReaction {
                kind: ReactionKind::Dislike,
                ..
            } => "toggle_dislike",
        }
    }
}
