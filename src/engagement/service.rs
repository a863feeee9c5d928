use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::OutfitApi;
use crate::engagement::intent::{Intent, NodeKey, ReactionTarget};
use crate::engagement::reactions::ReactionKind;
use crate::engagement::submission::{SubmissionState, SubmissionTracker};
use crate::engagement::tree::EngagementTree;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{CommentId, Outfit, OutfitId, ReplyId};
use crate::session::Session;
use crate::store::SharedStore;

/// What happened to the server's answer to a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The returned document replaced the stored outfit.
    Applied(Outfit),
    /// The view was closed while the request was in flight; the answer was dropped.
    Discarded,
}

impl MutationOutcome {
    pub fn outfit(&self) -> Option<&Outfit> {
        match self {
            Self::Applied(outfit) => Some(outfit),
            Self::Discarded => None,
        }
    }
}

/// Runs engagement intents against the catalog API.
///
/// Each operation validates against the stored snapshot, marks its node as
/// submitting, sends the intent with no lock held and then replaces the whole
/// outfit with the server's answer. Nothing is written locally before the
/// server confirms.
pub struct EngagementService {
    api: Arc<dyn OutfitApi>,
    store: SharedStore,
    session: Session,
    submissions: Mutex<SubmissionTracker>,
}

impl EngagementService {
    pub fn new(api: Arc<dyn OutfitApi>, store: SharedStore, session: Session) -> Self {
        Self {
            api,
            store,
            session,
            submissions: Mutex::new(SubmissionTracker::new()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Load an outfit for the detail view.
    pub async fn open(&self, id: &OutfitId) -> CatalogResult<EngagementTree> {
        let generation = self.store.lock().await.generation(id);
        let outfit = self.api.get_outfit(id).await?;
        let tree = EngagementTree::from_outfit(&outfit);
        let mut store = self.store.lock().await;
        if store.generation(id) == generation {
            store.upsert(outfit);
        }
        Ok(tree)
    }

    /// Tear the detail view down. Responses still in flight for it will be discarded.
    pub async fn close(&self, id: &OutfitId) {
        self.store.lock().await.close_view(id);
        self.submissions.lock().await.clear_outfit(id);
        tracing::debug!("Closed view of outfit {}", id);
    }

    pub async fn tree(&self, id: &OutfitId) -> CatalogResult<EngagementTree> {
        let store = self.store.lock().await;
        store
            .get(id)
            .map(EngagementTree::from_outfit)
            .ok_or_else(|| CatalogError::NotFound(format!("outfit {id}")))
    }

    pub async fn submission_state(&self, key: &NodeKey) -> SubmissionState {
        self.submissions.lock().await.state(key)
    }

    pub async fn add_comment(&self, id: &OutfitId, text: &str) -> CatalogResult<MutationOutcome> {
        self.submit(id, |tree| tree.add_comment(text)).await
    }

    pub async fn remove_comment(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
    ) -> CatalogResult<MutationOutcome> {
        self.submit(id, |tree| tree.remove_comment(comment_id))
            .await
    }

    pub async fn add_reply(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        text: &str,
    ) -> CatalogResult<MutationOutcome> {
        self.submit(id, |tree| tree.add_reply(comment_id, text))
            .await
    }

    pub async fn remove_reply(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        reply_id: &ReplyId,
    ) -> CatalogResult<MutationOutcome> {
        self.submit(id, |tree| tree.remove_reply(comment_id, reply_id))
            .await
    }

    pub async fn toggle_reaction(
        &self,
        id: &OutfitId,
        target: ReactionTarget,
        kind: ReactionKind,
    ) -> CatalogResult<MutationOutcome> {
        self.submit(id, |tree| tree.toggle_reaction(target, kind))
            .await
    }

    pub async fn toggle_outfit_reaction(
        &self,
        id: &OutfitId,
        kind: ReactionKind,
    ) -> CatalogResult<MutationOutcome> {
        self.toggle_reaction(id, ReactionTarget::Outfit, kind).await
    }

    pub async fn toggle_comment_reaction(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        kind: ReactionKind,
    ) -> CatalogResult<MutationOutcome> {
        self.toggle_reaction(id, ReactionTarget::Comment(comment_id.clone()), kind)
            .await
    }

    pub async fn toggle_reply_reaction(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        reply_id: &ReplyId,
        kind: ReactionKind,
    ) -> CatalogResult<MutationOutcome> {
        let target = ReactionTarget::Reply(comment_id.clone(), reply_id.clone());
        self.toggle_reaction(id, target, kind).await
    }

    async fn submit<F>(&self, id: &OutfitId, build: F) -> CatalogResult<MutationOutcome>
    where
        F: FnOnce(&EngagementTree) -> CatalogResult<Intent>,
    {
        let user = self.session.require_user()?;

        let (intent, generation) = {
            let store = self.store.lock().await;
            let outfit = store
                .get(id)
                .ok_or_else(|| CatalogError::NotFound(format!("outfit {id}")))?;
            let intent = build(&EngagementTree::from_outfit(outfit))?;
            (intent, store.generation(id))
        };

        let key = intent.node_key(id);
        self.submissions.lock().await.begin(key.clone(), generation)?;
        tracing::info!("{} on {} by {}", intent.action(), key, user.id);

        match self.dispatch(id, &intent).await {
            Ok(outfit) => {
                let applied = self
                    .store
                    .lock()
                    .await
                    .apply_if_current(generation, outfit.clone());
                self.submissions.lock().await.resolve(&key, generation);
                if applied {
                    Ok(MutationOutcome::Applied(outfit))
                } else {
                    Ok(MutationOutcome::Discarded)
                }
            }
            Err(err) => {
                tracing::warn!("{} on {} rejected: {}", intent.action(), key, err);
                self.submissions
                    .lock()
                    .await
                    .fail(&key, generation, err.notice());
                if matches!(err, CatalogError::NotFound(_)) {
                    self.refresh(id, generation).await;
                }
                Err(err)
            }
        }
    }

    async fn dispatch(&self, id: &OutfitId, intent: &Intent) -> CatalogResult<Outfit> {
        let token = self.session.token();
        match intent {
            Intent::AddComment { text } => self.api.add_comment(id, text, token).await,
            Intent::RemoveComment { comment_id } => {
                self.api.remove_comment(id, comment_id, token).await
            }
            Intent::AddReply { comment_id, text } => {
                self.api.add_reply(id, comment_id, text, token).await
            }
            Intent::RemoveReply {
                comment_id,
                reply_id,
            } => self.api.remove_reply(id, comment_id, reply_id, token).await,
            Intent::ToggleReaction { target, kind } => match target {
                ReactionTarget::Outfit => self.api.toggle_outfit_reaction(id, *kind, token).await,
                ReactionTarget::Comment(c) => {
                    self.api.toggle_comment_reaction(id, c, *kind, token).await
                }
                ReactionTarget::Reply(c, r) => {
                    self.api.toggle_reply_reaction(id, c, r, *kind, token).await
                }
            },
        }
    }

    /// Pull the server's current document after a node vanished under us.
    /// An outfit the server no longer has is dropped from the store.
    async fn refresh(&self, id: &OutfitId, generation: u64) {
        match self.api.get_outfit(id).await {
            Ok(outfit) => {
                self.store.lock().await.apply_if_current(generation, outfit);
            }
            Err(CatalogError::NotFound(_)) => {
                self.store.lock().await.remove_if_current(generation, id);
            }
            Err(e) => tracing::warn!("Could not refresh outfit {}: {}", id, e),
        }
    }
}
