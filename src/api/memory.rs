// In-process catalog service with the same rules the remote API enforces
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::api::{ImageUpload, OutfitApi, OutfitFields};
use crate::engagement::reactions::{self, ReactionKind, ReactionSet};
use crate::engagement::tree::validate_text;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Comment, CommentId, Item, Outfit, OutfitId, Reply, ReplyId, UserId};
use crate::session::{can_moderate, ActingUser};

#[derive(Debug, Default)]
struct MemoryState {
    outfits: Vec<Outfit>,
    users: HashMap<String, ActingUser>,
    fail_next: Option<(StatusCode, String)>,
    delay: Option<std::time::Duration>,
}

/// Catalog API backed by process memory.
///
/// Assigns ids, checks bearer tokens against registered users, enforces
/// author-or-admin on removals and keeps the denormalized counters in step
/// with the document. Every mutation returns the full outfit.
#[derive(Debug, Default)]
pub struct MemoryOutfitApi {
    state: Mutex<MemoryState>,
}

impl MemoryOutfitApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outfits(outfits: Vec<Outfit>) -> Self {
        let mut outfits = outfits;
        outfits.iter_mut().for_each(recount);
        Self {
            state: Mutex::new(MemoryState {
                outfits,
                ..MemoryState::default()
            }),
        }
    }

    /// Demo catalog: a mix of categories, sections and statuses with some chatter.
    pub fn seeded() -> Self {
        const CATEGORIES: [&str; 4] = ["Casual", "Formal", "Sport", "Party"];
        const SECTIONS: [&str; 3] = ["Men", "Women", "Kids"];

        let now = Utc::now();
        let outfits = (0..24)
            .map(|i| {
                let category = CATEGORIES[i % CATEGORIES.len()];
                let section = SECTIONS[i % SECTIONS.len()];
                let mut outfit = Outfit::new(format!("outfit-{:02}", i + 1), category, section);
                outfit.kind = if i % 2 == 0 { "summer" } else { "winter" }.to_string();
                outfit.description = (i % 5 != 0).then(|| {
                    format!("{category} look for {} no. {}", section.to_lowercase(), i + 1)
                });
                outfit.active = i % 4 != 3;
                outfit.rating = (i % 6) as f64 * 0.8;
                outfit.created_at = now - Duration::days(i as i64);
                outfit.items = vec![Item {
                    source_name: "Atelier".into(),
                    item_name: format!("{category} piece"),
                    item_price: 19.99 + i as f64,
                    item_link: format!("https://shop.example.com/items/{}", i + 1),
                }];
                if i % 3 == 0 {
                    outfit.comments.push(seed_comment(i, now));
                }
                outfit
            })
            .collect();

        Self::with_outfits(outfits)
    }

    /// Make `token` authenticate as `user`.
    pub async fn register_user(&self, token: impl Into<String>, user: ActingUser) {
        self.state.lock().await.users.insert(token.into(), user);
    }

    /// Fail the next call with the given HTTP status, as the remote API would.
    pub async fn fail_next(&self, status: StatusCode, message: impl Into<String>) {
        self.state.lock().await.fail_next = Some((status, message.into()));
    }

    /// Hold every call for `delay` before answering.
    pub async fn set_delay(&self, delay: Option<std::time::Duration>) {
        self.state.lock().await.delay = delay;
    }

    pub async fn snapshot(&self, id: &OutfitId) -> Option<Outfit> {
        let state = self.state.lock().await;
        state.outfits.iter().find(|o| &o.id == id).cloned()
    }

    /// Wait out the configured delay and consume a pending failure, if any.
    async fn enter(&self) -> CatalogResult<()> {
        let delay = {
            let mut state = self.state.lock().await;
            if let Some((status, message)) = state.fail_next.take() {
                return Err(CatalogError::from_status(status, &message));
            }
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn mutate<F>(&self, id: &OutfitId, token: Option<&str>, f: F) -> CatalogResult<Outfit>
    where
        F: FnOnce(&mut Outfit, &ActingUser) -> CatalogResult<()> + Send,
    {
        self.enter().await?;
        let mut state = self.state.lock().await;
        let user = identify(&state, token)?;
        let outfit = find_mut(&mut state.outfits, id)?;
        f(outfit, &user)?;
        recount(outfit);
        Ok(outfit.clone())
    }

    async fn admin(&self, token: Option<&str>) -> CatalogResult<()> {
        let state = self.state.lock().await;
        let user = identify(&state, token)?;
        if user.is_admin {
            Ok(())
        } else {
            Err(CatalogError::Forbidden("admin access required".into()))
        }
    }
}

fn seed_comment(i: usize, now: chrono::DateTime<Utc>) -> Comment {
    let mut comment = Comment {
        id: CommentId::new(format!("seed-comment-{i}")),
        author_id: UserId::new("stylist"),
        author_name: "Stylist".into(),
        text: "Pairs well with white sneakers".into(),
        created_at: now - Duration::hours(i as i64 + 1),
        likes: ReactionSet::new(),
        dislikes: ReactionSet::new(),
        replies: Vec::new(),
    };
    comment.likes.insert(UserId::new("visitor"));
    comment.replies.push(Reply {
        id: ReplyId::new(format!("seed-reply-{i}")),
        author_id: UserId::new("visitor"),
        author_name: "Visitor".into(),
        text: "Agreed!".into(),
        created_at: now - Duration::minutes(30),
        likes: ReactionSet::new(),
        dislikes: ReactionSet::new(),
    });
    comment
}

fn identify(state: &MemoryState, token: Option<&str>) -> CatalogResult<ActingUser> {
    token
        .and_then(|t| state.users.get(t))
        .cloned()
        .ok_or(CatalogError::Unauthenticated)
}

fn find_mut<'a>(outfits: &'a mut [Outfit], id: &OutfitId) -> CatalogResult<&'a mut Outfit> {
    outfits
        .iter_mut()
        .find(|o| &o.id == id)
        .ok_or_else(|| CatalogError::NotFound(format!("outfit {id}")))
}

fn comment_mut<'a>(outfit: &'a mut Outfit, id: &CommentId) -> CatalogResult<&'a mut Comment> {
    outfit
        .comments
        .iter_mut()
        .find(|c| &c.id == id)
        .ok_or_else(|| CatalogError::NotFound(format!("comment {id}")))
}

fn reply_mut<'a>(comment: &'a mut Comment, id: &ReplyId) -> CatalogResult<&'a mut Reply> {
    comment
        .replies
        .iter_mut()
        .find(|r| &r.id == id)
        .ok_or_else(|| CatalogError::NotFound(format!("reply {id}")))
}

fn recount(outfit: &mut Outfit) {
    outfit.number_of_items = outfit.items.len();
    outfit.number_of_likes = outfit.likes.len();
    outfit.number_of_comments = outfit.comments.len();
}

fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

fn apply_fields(outfit: &mut Outfit, fields: &OutfitFields, image: Option<&ImageUpload>) {
    outfit.category = fields.category.clone();
    outfit.section = fields.section.clone();
    outfit.kind = fields.kind.clone();
    outfit.description = fields.description.clone();
    outfit.tags = fields.tags.clone();
    outfit.items = fields.items.clone();
    outfit.rating = fields.rating;
    if let Some(image) = image {
        outfit.image = Some(format!("/uploads/{}", image.file_name));
    }
}

#[async_trait]
impl OutfitApi for MemoryOutfitApi {
    async fn list_outfits(&self, token: Option<&str>) -> CatalogResult<Vec<Outfit>> {
        self.enter().await?;
        self.admin(token).await?;
        Ok(self.state.lock().await.outfits.clone())
    }

    async fn get_outfit(&self, id: &OutfitId) -> CatalogResult<Outfit> {
        self.enter().await?;
        self.snapshot(id)
            .await
            .ok_or_else(|| CatalogError::NotFound(format!("outfit {id}")))
    }

    async fn create_outfit(
        &self,
        fields: &OutfitFields,
        image: Option<&ImageUpload>,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        self.enter().await?;
        self.admin(token).await?;

        let mut outfit = Outfit::new(new_id(), "", "");
        apply_fields(&mut outfit, fields, image);
        recount(&mut outfit);

        self.state.lock().await.outfits.push(outfit.clone());
        Ok(outfit)
    }

    async fn update_outfit(
        &self,
        id: &OutfitId,
        fields: &OutfitFields,
        image: Option<&ImageUpload>,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        self.admin(token).await?;
        self.mutate(id, token, |outfit, _| {
            apply_fields(outfit, fields, image);
            Ok(())
        })
        .await
    }

    async fn delete_outfit(&self, id: &OutfitId, token: Option<&str>) -> CatalogResult<()> {
        self.enter().await?;
        self.admin(token).await?;

        let mut state = self.state.lock().await;
        let before = state.outfits.len();
        state.outfits.retain(|o| &o.id != id);
        if state.outfits.len() == before {
            return Err(CatalogError::NotFound(format!("outfit {id}")));
        }
        Ok(())
    }

    async fn set_active(
        &self,
        id: &OutfitId,
        active: bool,
        token: Option<&str>,
    ) -> CatalogResult<()> {
        self.admin(token).await?;
        self.mutate(id, token, |outfit, _| {
            outfit.active = active;
            Ok(())
        })
        .await
        .map(|_| ())
    }

    async fn toggle_outfit_reaction(
        &self,
        id: &OutfitId,
        kind: ReactionKind,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        self.mutate(id, token, |outfit, user| {
            reactions::apply(&mut outfit.likes, &mut outfit.dislikes, &user.id, kind);
            Ok(())
        })
        .await
    }

    async fn add_comment(
        &self,
        id: &OutfitId,
        text: &str,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let text = validate_text(text)?;
        self.mutate(id, token, |outfit, user| {
            outfit.comments.push(Comment {
                id: CommentId::new(new_id()),
                author_id: user.id.clone(),
                author_name: user.display_name.clone(),
                text,
                created_at: Utc::now(),
                likes: ReactionSet::new(),
                dislikes: ReactionSet::new(),
                replies: Vec::new(),
            });
            Ok(())
        })
        .await
    }

    async fn remove_comment(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        self.mutate(id, token, |outfit, user| {
            let author = comment_mut(outfit, comment_id)?.author_id.clone();
            if !can_moderate(user, &author) {
                return Err(CatalogError::Forbidden(format!(
                    "comment {comment_id} belongs to another user"
                )));
            }
            outfit.comments.retain(|c| &c.id != comment_id);
            Ok(())
        })
        .await
    }

    async fn toggle_comment_reaction(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        kind: ReactionKind,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        self.mutate(id, token, |outfit, user| {
            let comment = comment_mut(outfit, comment_id)?;
            reactions::apply(&mut comment.likes, &mut comment.dislikes, &user.id, kind);
            Ok(())
        })
        .await
    }

    async fn add_reply(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        text: &str,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let text = validate_text(text)?;
        self.mutate(id, token, |outfit, user| {
            let comment = comment_mut(outfit, comment_id)?;
            comment.replies.push(Reply {
                id: ReplyId::new(new_id()),
                author_id: user.id.clone(),
                author_name: user.display_name.clone(),
                text,
                created_at: Utc::now(),
                likes: ReactionSet::new(),
                dislikes: ReactionSet::new(),
            });
            Ok(())
        })
        .await
    }

    async fn remove_reply(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        reply_id: &ReplyId,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        self.mutate(id, token, |outfit, user| {
            let comment = comment_mut(outfit, comment_id)?;
            let author = reply_mut(comment, reply_id)?.author_id.clone();
            if !can_moderate(user, &author) {
                return Err(CatalogError::Forbidden(format!(
                    "reply {reply_id} belongs to another user"
                )));
            }
            comment.replies.retain(|r| &r.id != reply_id);
            Ok(())
        })
        .await
    }

    async fn toggle_reply_reaction(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        reply_id: &ReplyId,
        kind: ReactionKind,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        self.mutate(id, token, |outfit, user| {
            let reply = reply_mut(comment_mut(outfit, comment_id)?, reply_id)?;
            reactions::apply(&mut reply.likes, &mut reply.dislikes, &user.id, kind);
            Ok(())
        })
        .await
    }
}
