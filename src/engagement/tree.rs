// Two-level engagement tree (outfit -> comment -> reply), arena + id index
use std::collections::HashMap;

use crate::engagement::intent::{Intent, ReactionTarget};
use crate::engagement::reactions::{self, ReactionKind, ReactionSet};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Comment, CommentId, Outfit, OutfitId, Reply, ReplyId, UserId};
use crate::session::{can_moderate, ActingUser};

/// Upper bound on comment and reply text, in characters.
pub const MAX_TEXT_LEN: usize = 500;

#[derive(Debug, Clone)]
struct CommentNode {
    comment: Comment,
    reply_index: HashMap<ReplyId, usize>,
}

/// Read-only view over one outfit's comments and replies.
///
/// Rebuilt from the outfit document after every applied mutation; it has
/// no mutation path of its own. Operations validate locally and hand back
/// an [`Intent`] for the catalog API to resolve.
#[derive(Debug, Clone)]
pub struct EngagementTree {
    outfit_id: OutfitId,
    likes: ReactionSet,
    dislikes: ReactionSet,
    comments: Vec<CommentNode>,
    comment_index: HashMap<CommentId, usize>,
}

impl EngagementTree {
    pub fn from_outfit(outfit: &Outfit) -> Self {
        let comments: Vec<CommentNode> = outfit
            .comments
            .iter()
            .map(|comment| CommentNode {
                reply_index: comment
                    .replies
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (r.id.clone(), i))
                    .collect(),
                comment: comment.clone(),
            })
            .collect();

        let comment_index = comments
            .iter()
            .enumerate()
            .map(|(i, node)| (node.comment.id.clone(), i))
            .collect();

        Self {
            outfit_id: outfit.id.clone(),
            likes: outfit.likes.clone(),
            dislikes: outfit.dislikes.clone(),
            comments,
            comment_index,
        }
    }

    pub fn outfit_id(&self) -> &OutfitId {
        &self.outfit_id
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Comments in insertion order
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().map(|node| &node.comment)
    }

    pub fn comment(&self, id: &CommentId) -> Option<&Comment> {
        self.comment_index
            .get(id)
            .and_then(|&i| self.comments.get(i))
            .map(|node| &node.comment)
    }

    pub fn reply(&self, comment_id: &CommentId, reply_id: &ReplyId) -> Option<&Reply> {
        let node = self
            .comment_index
            .get(comment_id)
            .and_then(|&i| self.comments.get(i))?;
        node.reply_index
            .get(reply_id)
            .and_then(|&i| node.comment.replies.get(i))
    }

    pub fn contains_comment(&self, id: &CommentId) -> bool {
        self.comment_index.contains_key(id)
    }

    /// Reaction the user currently holds on the addressed node.
    pub fn reaction_of(&self, user: &UserId, target: &ReactionTarget) -> Option<ReactionKind> {
        match target {
            ReactionTarget::Outfit => reactions::reaction_of(&self.likes, &self.dislikes, user),
            ReactionTarget::Comment(c) => self
                .comment(c)
                .and_then(|c| reactions::reaction_of(&c.likes, &c.dislikes, user)),
            ReactionTarget::Reply(c, r) => self
                .reply(c, r)
                .and_then(|r| reactions::reaction_of(&r.likes, &r.dislikes, user)),
        }
    }

    /// Whether to offer a delete control for this comment.
    pub fn can_remove_comment(&self, user: &ActingUser, id: &CommentId) -> bool {
        self.comment(id)
            .is_some_and(|c| can_moderate(user, &c.author_id))
    }

    /// Whether to offer a delete control for this reply.
    pub fn can_remove_reply(
        &self,
        user: &ActingUser,
        comment_id: &CommentId,
        reply_id: &ReplyId,
    ) -> bool {
        self.reply(comment_id, reply_id)
            .is_some_and(|r| can_moderate(user, &r.author_id))
    }

    pub fn add_comment(&self, text: &str) -> CatalogResult<Intent> {
        let text = validate_text(text)?;
        Ok(Intent::AddComment { text })
    }

    /// Removal is not blocked for non-authors here; the API decides.
    pub fn remove_comment(&self, comment_id: &CommentId) -> CatalogResult<Intent> {
        self.require_comment(comment_id)?;
        Ok(Intent::RemoveComment {
            comment_id: comment_id.clone(),
        })
    }

    pub fn add_reply(&self, comment_id: &CommentId, text: &str) -> CatalogResult<Intent> {
        let text = validate_text(text)?;
        self.require_comment(comment_id)?;
        Ok(Intent::AddReply {
            comment_id: comment_id.clone(),
            text,
        })
    }

    pub fn remove_reply(
        &self,
        comment_id: &CommentId,
        reply_id: &ReplyId,
    ) -> CatalogResult<Intent> {
        self.require_reply(comment_id, reply_id)?;
        Ok(Intent::RemoveReply {
            comment_id: comment_id.clone(),
            reply_id: reply_id.clone(),
        })
    }

    pub fn toggle_reaction(
        &self,
        target: ReactionTarget,
        kind: ReactionKind,
    ) -> CatalogResult<Intent> {
        match &target {
            ReactionTarget::Outfit => {}
            ReactionTarget::Comment(c) => self.require_comment(c)?,
            ReactionTarget::Reply(c, r) => self.require_reply(c, r)?,
        }
        Ok(Intent::ToggleReaction { target, kind })
    }

    fn require_comment(&self, id: &CommentId) -> CatalogResult<()> {
        if self.contains_comment(id) {
            Ok(())
        } else {
            Err(CatalogError::NotFound(format!(
                "comment {id} on outfit {}",
                self.outfit_id
            )))
        }
    }

    fn require_reply(&self, comment_id: &CommentId, reply_id: &ReplyId) -> CatalogResult<()> {
        self.require_comment(comment_id)?;
        if self.reply(comment_id, reply_id).is_some() {
            Ok(())
        } else {
            Err(CatalogError::NotFound(format!("reply {reply_id} to comment {comment_id}")))
        }
    }
}

/// Trim and bound-check comment/reply text.
pub fn validate_text(text: &str) -> CatalogResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CatalogError::Validation("Text cannot be empty".into()));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(CatalogError::Validation(format!(
            "Text must be {MAX_TEXT_LEN} characters or less"
        )));
    }
    Ok(text.to_string())
}
