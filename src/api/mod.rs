// Catalog API port - the remote service is the single source of truth
pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engagement::reactions::ReactionKind;
use crate::error::CatalogResult;
use crate::models::{CommentId, Item, Outfit, OutfitId, ReplyId};

pub use http::HttpOutfitApi;
pub use memory::MemoryOutfitApi;

/// Editable outfit attributes sent by the create and update flows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitFields {
    pub category: String,
    pub section: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub items: Vec<Item>,
    pub rating: f64,
}

/// Image file attached to a create or update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> CatalogResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

/// Every engagement mutation answers with the full outfit document.
#[async_trait]
pub trait OutfitApi: Send + Sync {
    /// Full admin-scoped listing
    async fn list_outfits(&self, token: Option<&str>) -> CatalogResult<Vec<Outfit>>;

    /// Public read for the detail view
    async fn get_outfit(&self, id: &OutfitId) -> CatalogResult<Outfit>;

    async fn create_outfit(
        &self,
        fields: &OutfitFields,
        image: Option<&ImageUpload>,
        token: Option<&str>,
    ) -> CatalogResult<Outfit>;

    async fn update_outfit(
        &self,
        id: &OutfitId,
        fields: &OutfitFields,
        image: Option<&ImageUpload>,
        token: Option<&str>,
    ) -> CatalogResult<Outfit>;

    async fn delete_outfit(&self, id: &OutfitId, token: Option<&str>) -> CatalogResult<()>;

    async fn set_active(
        &self,
        id: &OutfitId,
        active: bool,
        token: Option<&str>,
    ) -> CatalogResult<()>;

    async fn toggle_outfit_reaction(
        &self,
        id: &OutfitId,
        kind: ReactionKind,
        token: Option<&str>,
    ) -> CatalogResult<Outfit>;

    async fn add_comment(
        &self,
        id: &OutfitId,
        text: &str,
        token: Option<&str>,
    ) -> CatalogResult<Outfit>;

    async fn remove_comment(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        token: Option<&str>,
    ) -> CatalogResult<Outfit>;

    async fn toggle_comment_reaction(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        kind: ReactionKind,
        token: Option<&str>,
    ) -> CatalogResult<Outfit>;

    async fn add_reply(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        text: &str,
        token: Option<&str>,
    ) -> CatalogResult<Outfit>;

    async fn remove_reply(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        reply_id: &ReplyId,
        token: Option<&str>,
    ) -> CatalogResult<Outfit>;

    async fn toggle_reply_reaction(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        reply_id: &ReplyId,
        kind: ReactionKind,
        token: Option<&str>,
    ) -> CatalogResult<Outfit>;
}
