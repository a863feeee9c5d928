// Admin catalog table: listing snapshot, filters, paging and outfit management
use std::sync::Arc;

use crate::api::{ImageUpload, OutfitApi, OutfitFields};
use crate::catalog::{CatalogView, FilterCriteria, PageSnapshot, StatusFilter};
use crate::error::CatalogResult;
use crate::models::{Outfit, OutfitId};
use crate::session::Session;
use crate::store::SharedStore;

pub struct Dashboard {
    api: Arc<dyn OutfitApi>,
    store: SharedStore,
    session: Session,
    view: CatalogView,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn OutfitApi>,
        store: SharedStore,
        session: Session,
        page_size: usize,
    ) -> CatalogResult<Self> {
        Ok(Self {
            api,
            store,
            session,
            view: CatalogView::new(page_size)?,
        })
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Replace the snapshot with a fresh listing and keep the page in range.
    pub async fn refresh(&mut self) -> CatalogResult<usize> {
        let outfits = self.api.list_outfits(self.session.token()).await?;
        let mut store = self.store.lock().await;
        store.replace_all(outfits);
        self.view.rederive_page(store.outfits());
        Ok(store.len())
    }

    pub async fn page(&self) -> CatalogResult<PageSnapshot> {
        let store = self.store.lock().await;
        self.view.snapshot(store.outfits())
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.view.set_criteria(criteria);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.view.set_search(search);
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.view.set_category(category);
    }

    pub fn set_section(&mut self, section: Option<String>) {
        self.view.set_section(section);
    }

    pub fn set_status(&mut self, status: Option<StatusFilter>) {
        self.view.set_status(status);
    }

    pub fn set_page_size(&mut self, page_size: usize) -> CatalogResult<()> {
        self.view.set_page_size(page_size)
    }

    pub async fn go_to_page(&mut self, page_number: usize) -> CatalogResult<()> {
        let store = self.store.lock().await;
        self.view.go_to_page(store.outfits(), page_number)
    }

    pub async fn create_outfit(
        &self,
        fields: &OutfitFields,
        image: Option<&ImageUpload>,
    ) -> CatalogResult<Outfit> {
        let outfit = self
            .api
            .create_outfit(fields, image, self.session.token())
            .await?;
        tracing::info!("Created outfit {}", outfit.id);
        self.store.lock().await.upsert(outfit.clone());
        Ok(outfit)
    }

    pub async fn update_outfit(
        &self,
        id: &OutfitId,
        fields: &OutfitFields,
        image: Option<&ImageUpload>,
    ) -> CatalogResult<Outfit> {
        let outfit = self
            .api
            .update_outfit(id, fields, image, self.session.token())
            .await?;
        tracing::info!("Updated outfit {}", outfit.id);
        self.store.lock().await.upsert(outfit.clone());
        Ok(outfit)
    }

    pub async fn delete_outfit(&mut self, id: &OutfitId) -> CatalogResult<()> {
        self.api.delete_outfit(id, self.session.token()).await?;
        tracing::info!("Deleted outfit {}", id);
        self.refresh().await?;
        Ok(())
    }

    pub async fn set_active(&mut self, id: &OutfitId, active: bool) -> CatalogResult<()> {
        self.api.set_active(id, active, self.session.token()).await?;
        tracing::info!(
            "Outfit {} is now {}",
            id,
            if active { "active" } else { "inactive" }
        );
        self.refresh().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryOutfitApi;
    use crate::catalog::PageMarker;
    use crate::error::CatalogError;
    use crate::models::UserId;
    use crate::session::ActingUser;
    use crate::store::EntityStore;

    fn admin() -> ActingUser {
        ActingUser {
            id: UserId::new("admin"),
            display_name: "Admin".into(),
            is_admin: true,
        }
    }

    async fn dashboard(outfits: usize) -> (Arc<MemoryOutfitApi>, Dashboard) {
        let api = Arc::new(MemoryOutfitApi::with_outfits(
            (0..outfits)
                .map(|i| {
                    let category = if i % 2 == 0 { "Casual" } else { "Formal" };
                    Outfit::new(format!("o{i}"), category, "Men")
                })
                .collect(),
        ));
        api.register_user("admin-token", admin()).await;
        let dashboard = Dashboard::new(
            api.clone(),
            EntityStore::shared(),
            Session::signed_in("admin-token", admin()),
            10,
        )
        .unwrap();
        (api, dashboard)
    }

    #[tokio::test]
    async fn refresh_then_page_through_the_listing() {
        let (_, mut dashboard) = dashboard(23).await;
        assert_eq!(dashboard.refresh().await.unwrap(), 23);

        let page = dashboard.page().await.unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 10);

        dashboard.go_to_page(3).await.unwrap();
        let page = dashboard.page().await.unwrap();
        assert_eq!((page.first_index, page.last_index), (20, 23));
        assert_eq!(
            page.window,
            vec![PageMarker::Page(1), PageMarker::Page(2), PageMarker::Page(3)]
        );

        assert!(matches!(
            dashboard.go_to_page(4).await,
            Err(CatalogError::PageOutOfRange { page: 4, total_pages: 3 })
        ));
    }

    #[tokio::test]
    async fn filter_change_returns_to_first_page() {
        let (_, mut dashboard) = dashboard(23).await;
        dashboard.refresh().await.unwrap();
        dashboard.go_to_page(2).await.unwrap();

        dashboard.set_category(Some("Casual".into()));
        let page = dashboard.page().await.unwrap();
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_matches, 12);
        assert!(page.items.iter().all(|o| o.category == "Casual"));
    }

    #[tokio::test]
    async fn delete_pulls_page_back_into_range() {
        let (_, mut dashboard) = dashboard(11).await;
        dashboard.refresh().await.unwrap();
        dashboard.go_to_page(2).await.unwrap();

        dashboard.delete_outfit(&OutfitId::new("o10")).await.unwrap();
        let page = dashboard.page().await.unwrap();
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page_number, 1);
    }

    #[tokio::test]
    async fn deactivate_is_visible_through_status_filter() {
        let (_, mut dashboard) = dashboard(3).await;
        dashboard.refresh().await.unwrap();
        dashboard
            .set_active(&OutfitId::new("o1"), false)
            .await
            .unwrap();

        dashboard.set_status(Some(StatusFilter::Inactive));
        let page = dashboard.page().await.unwrap();
        let ids: Vec<&str> = page.items.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o1"]);
    }

    #[tokio::test]
    async fn created_outfit_is_upserted() {
        let (_, mut dashboard) = dashboard(0).await;
        dashboard.refresh().await.unwrap();

        let fields = OutfitFields {
            category: "Party".into(),
            section: "Women".into(),
            kind: "summer".into(),
            ..OutfitFields::default()
        };
        let image = ImageUpload::new("look.png", vec![1, 2, 3]);
        let created = dashboard.create_outfit(&fields, Some(&image)).await.unwrap();

        let page = dashboard.page().await.unwrap();
        assert_eq!(page.items, vec![created.clone()]);
        assert_eq!(created.image.as_deref(), Some("/uploads/look.png"));
    }

    #[tokio::test]
    async fn non_admin_listing_is_forbidden() {
        let (api, _) = dashboard(1).await;
        let visitor = ActingUser {
            id: UserId::new("v"),
            display_name: "V".into(),
            is_admin: false,
        };
        api.register_user("v-token", visitor.clone()).await;
        let mut dashboard = Dashboard::new(
            api,
            EntityStore::shared(),
            Session::signed_in("v-token", visitor),
            10,
        )
        .unwrap();

        assert!(matches!(
            dashboard.refresh().await,
            Err(CatalogError::Forbidden(_))
        ));
    }
}
