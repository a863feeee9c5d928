pub mod filter;
pub mod view;

pub use filter::{matches, FilterCriteria, StatusFilter};
pub use view::{
    page_window, paginate, recompute, total_pages, CatalogView, Page, PageMarker, PageSnapshot,
    DEFAULT_PAGE_SIZE,
};
