// Derived catalog view: filtered list plus page slice, recomputed on demand
use serde::Serialize;

use crate::catalog::filter::{self, FilterCriteria, StatusFilter};
use crate::error::{CatalogError, CatalogResult};
use crate::models::Outfit;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of a filtered list.
///
/// `first_index..last_index` is the half-open range of `items` within the
/// filtered list.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page_number: usize,
    pub total_pages: usize,
    pub first_index: usize,
    pub last_index: usize,
}

/// Entry in the pagination control strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "page")]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

/// Filter `all` by `criteria`, keeping the original relative order.
pub fn recompute<'a>(all: &'a [Outfit], criteria: &FilterCriteria) -> Vec<&'a Outfit> {
    all.iter().filter(|o| filter::matches(o, criteria)).collect()
}

/// Number of pages for `len` entries. An empty list is still page 1 of 1.
pub fn total_pages(len: usize, page_size: usize) -> CatalogResult<usize> {
    if page_size == 0 {
        return Err(CatalogError::InvalidPageSize);
    }
    Ok(len.div_ceil(page_size).max(1))
}

/// Slice page `page_number` (1-based) out of `list`.
///
/// Does not clamp: a page number outside `1..=total_pages` is an error and
/// the caller must re-derive a valid one first.
pub fn paginate<T>(list: &[T], page_size: usize, page_number: usize) -> CatalogResult<Page<'_, T>> {
    let total_pages = total_pages(list.len(), page_size)?;
    if page_number == 0 || page_number > total_pages {
        return Err(CatalogError::PageOutOfRange {
            page: page_number,
            total_pages,
        });
    }

    let first_index = ((page_number - 1) * page_size).min(list.len());
    let last_index = (first_index + page_size).min(list.len());

    Ok(Page {
        items: &list[first_index..last_index],
        page_number,
        total_pages,
        first_index,
        last_index,
    })
}

/// First page, last page, and the neighbours of `page_number`, with an
/// ellipsis wherever pages are skipped.
pub fn page_window(page_number: usize, total_pages: usize) -> Vec<PageMarker> {
    if total_pages == 0 {
        return Vec::new();
    }

    let mut pages = vec![1, total_pages];
    for p in [page_number.saturating_sub(1), page_number, page_number + 1] {
        if (1..=total_pages).contains(&p) {
            pages.push(p);
        }
    }
    pages.sort_unstable();
    pages.dedup();

    let mut window = Vec::with_capacity(pages.len() * 2);
    let mut previous = None;
    for page in pages {
        if let Some(prev) = previous {
            if page > prev + 1 {
                window.push(PageMarker::Ellipsis);
            }
        }
        window.push(PageMarker::Page(page));
        previous = Some(page);
    }
    window
}

/// Clamp a page number into `1..=total_pages`.
pub fn rederive_page(page_number: usize, total_pages: usize) -> usize {
    page_number.clamp(1, total_pages.max(1))
}

/// Owned page ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub items: Vec<Outfit>,
    pub page_number: usize,
    pub total_pages: usize,
    pub first_index: usize,
    pub last_index: usize,
    pub total_matches: usize,
    pub window: Vec<PageMarker>,
}

/// Criteria, page number and page size for one catalog table.
///
/// Every criteria change sends the view back to page 1.
#[derive(Debug, Clone)]
pub struct CatalogView {
    criteria: FilterCriteria,
    page_number: usize,
    page_size: usize,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CatalogView {
    pub fn new(page_size: usize) -> CatalogResult<Self> {
        if page_size == 0 {
            return Err(CatalogError::InvalidPageSize);
        }
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.page_number = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.criteria.search = search.into();
        self.page_number = 1;
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.criteria.category = category;
        self.page_number = 1;
    }

    pub fn set_section(&mut self, section: Option<String>) {
        self.criteria.section = section;
        self.page_number = 1;
    }

    pub fn set_status(&mut self, status: Option<StatusFilter>) {
        self.criteria.status = status;
        self.page_number = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) -> CatalogResult<()> {
        if page_size == 0 {
            return Err(CatalogError::InvalidPageSize);
        }
        self.page_size = page_size;
        self.page_number = 1;
        Ok(())
    }

    /// Move to `page_number`, rejecting pages past the end of the current result.
    pub fn go_to_page(&mut self, all: &[Outfit], page_number: usize) -> CatalogResult<()> {
        let filtered = recompute(all, &self.criteria);
        let total = total_pages(filtered.len(), self.page_size)?;
        if page_number == 0 || page_number > total {
            return Err(CatalogError::PageOutOfRange {
                page: page_number,
                total_pages: total,
            });
        }
        self.page_number = page_number;
        Ok(())
    }

    /// Pull the page number back into range after the underlying list shrank.
    pub fn rederive_page(&mut self, all: &[Outfit]) -> usize {
        let filtered = recompute(all, &self.criteria);
        let total = total_pages(filtered.len(), self.page_size).unwrap_or(1);
        self.page_number = rederive_page(self.page_number, total);
        self.page_number
    }

    pub fn snapshot(&self, all: &[Outfit]) -> CatalogResult<PageSnapshot> {
        let filtered = recompute(all, &self.criteria);
        let page = paginate(&filtered, self.page_size, self.page_number)?;

        Ok(PageSnapshot {
            items: page.items.iter().map(|o| (*o).clone()).collect(),
            page_number: page.page_number,
            total_pages: page.total_pages,
            first_index: page.first_index,
            last_index: page.last_index,
            total_matches: filtered.len(),
            window: page_window(page.page_number, page.total_pages),
        })
    }
}
