use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::api::{ImageUpload, OutfitApi, OutfitFields};
use crate::engagement::reactions::ReactionKind;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{CommentId, Outfit, OutfitId, ReplyId};

/// REST/JSON client for the catalog service.
#[derive(Debug, Clone)]
pub struct HttpOutfitApi {
    client: Client,
    base: Url,
}

impl HttpOutfitApi {
    pub fn new(base_url: &str) -> CatalogResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> CatalogResult<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(CatalogError::Validation(format!(
                "API base URL cannot carry paths: {base_url}"
            )));
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn outfit_url(&self, id: &OutfitId, rest: &[&str]) -> Url {
        let mut segments = vec!["outfits", id.as_str()];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
    ) -> CatalogResult<T> {
        let response = authorize(request, token).send().await?;
        let body = read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_empty(&self, request: RequestBuilder, token: Option<&str>) -> CatalogResult<()> {
        let response = authorize(request, token).send().await?;
        read_body(response).await?;
        Ok(())
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn read_body(response: Response) -> CatalogResult<String> {
    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await?;

    if status.is_success() {
        tracing::debug!("{} -> {}", url, status);
        Ok(body)
    } else {
        tracing::warn!("{} -> {}", url, status);
        Err(CatalogError::from_status(status, &body))
    }
}

fn multipart(fields: &OutfitFields, image: Option<&ImageUpload>) -> CatalogResult<Form> {
    let mut form = Form::new().text("fields", serde_json::to_string(fields)?);
    if let Some(image) = image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type())?;
        form = form.part("image", part);
    }
    Ok(form)
}

#[async_trait]
impl OutfitApi for HttpOutfitApi {
    async fn list_outfits(&self, token: Option<&str>) -> CatalogResult<Vec<Outfit>> {
        let url = self.endpoint(&["outfits"]);
        self.send(self.client.get(url), token).await
    }

    async fn get_outfit(&self, id: &OutfitId) -> CatalogResult<Outfit> {
        let url = self.outfit_url(id, &[]);
        self.send(self.client.get(url), None).await
    }

    async fn create_outfit(
        &self,
        fields: &OutfitFields,
        image: Option<&ImageUpload>,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let url = self.endpoint(&["outfits"]);
        let form = multipart(fields, image)?;
        self.send(self.client.post(url).multipart(form), token).await
    }

    async fn update_outfit(
        &self,
        id: &OutfitId,
        fields: &OutfitFields,
        image: Option<&ImageUpload>,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let url = self.outfit_url(id, &[]);
        let form = multipart(fields, image)?;
        self.send(self.client.put(url).multipart(form), token).await
    }

    async fn delete_outfit(&self, id: &OutfitId, token: Option<&str>) -> CatalogResult<()> {
        let url = self.outfit_url(id, &[]);
        self.send_empty(self.client.delete(url), token).await
    }

    async fn set_active(
        &self,
        id: &OutfitId,
        active: bool,
        token: Option<&str>,
    ) -> CatalogResult<()> {
        let url = self.outfit_url(id, &["status"]);
        let request = self.client.patch(url).json(&json!({ "active": active }));
        self.send_empty(request, token).await
    }

    async fn toggle_outfit_reaction(
        &self,
        id: &OutfitId,
        kind: ReactionKind,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let url = self.outfit_url(id, &[kind.as_str()]);
        self.send(self.client.post(url), token).await
    }

    async fn add_comment(
        &self,
        id: &OutfitId,
        text: &str,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let url = self.outfit_url(id, &["comments"]);
        let request = self.client.post(url).json(&json!({ "text": text }));
        self.send(request, token).await
    }

    async fn remove_comment(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let url = self.outfit_url(id, &["comments", comment_id.as_str()]);
        self.send(self.client.delete(url), token).await
    }

    async fn toggle_comment_reaction(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        kind: ReactionKind,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let url = self.outfit_url(id, &["comments", comment_id.as_str(), kind.as_str()]);
        self.send(self.client.post(url), token).await
    }

    async fn add_reply(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        text: &str,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let url = self.outfit_url(id, &["comments", comment_id.as_str(), "replies"]);
        let request = self.client.post(url).json(&json!({ "text": text }));
        self.send(request, token).await
    }

    async fn remove_reply(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        reply_id: &ReplyId,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let url = self.outfit_url(
            id,
            &["comments", comment_id.as_str(), "replies", reply_id.as_str()],
        );
        self.send(self.client.delete(url), token).await
    }

    async fn toggle_reply_reaction(
        &self,
        id: &OutfitId,
        comment_id: &CommentId,
        reply_id: &ReplyId,
        kind: ReactionKind,
        token: Option<&str>,
    ) -> CatalogResult<Outfit> {
        let url = self.outfit_url(
            id,
            &[
                "comments",
                comment_id.as_str(),
                "replies",
                reply_id.as_str(),
                kind.as_str(),
            ],
        );
        self.send(self.client.post(url), token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_onto_base_path() {
        let api = HttpOutfitApi::new("http://localhost:5000/api/").unwrap();
        assert_eq!(
            api.endpoint(&["outfits"]).as_str(),
            "http://localhost:5000/api/outfits"
        );

        let api = HttpOutfitApi::new("http://localhost:5000/api").unwrap();
        let url = api.outfit_url(
            &OutfitId::new("o1"),
            &["comments", "c 1", ReactionKind::Dislike.as_str()],
        );
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/outfits/o1/comments/c%201/dislike"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(
            HttpOutfitApi::new("mailto:someone@example.com"),
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            HttpOutfitApi::new("not a url"),
            Err(CatalogError::Url(_))
        ));
    }
}
