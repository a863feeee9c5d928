use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CatalogError;
use crate::models::Outfit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Active,
    Inactive,
}

impl StatusFilter {
    fn accepts(self, active: bool) -> bool {
        match self {
            Self::Active => active,
            Self::Inactive => !active,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(CatalogError::Validation(format!("Invalid status: {other}"))),
        }
    }
}

/// Transient filter input from the presentation layer.
///
/// The search term is trimmed before matching, so whitespace-only input
/// behaves like no search at all. Empty category/section strings count as
/// "not set" for the same reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub category: Option<String>,
    pub section: Option<String>,
    pub status: Option<StatusFilter>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search_term().is_none()
            && self.category().is_none()
            && self.section().is_none()
            && self.status.is_none()
    }

    fn search_term(&self) -> Option<&str> {
        non_blank(Some(self.search.as_str()))
    }

    fn category(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }

    fn section(&self) -> Option<&str> {
        non_blank(self.section.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Logical AND of the text, category, section and status sub-predicates.
pub fn matches(outfit: &Outfit, criteria: &FilterCriteria) -> bool {
    matches_search(outfit, criteria.search_term())
        && criteria.category().map_or(true, |c| outfit.category == c)
        && criteria.section().map_or(true, |s| outfit.section == s)
        && criteria.status.map_or(true, |s| s.accepts(outfit.active))
}

fn matches_search(outfit: &Outfit, term: Option<&str>) -> bool {
    let Some(term) = term else {
        return true;
    };
    let needle = term.to_lowercase();

    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

    contains(&outfit.category)
        || contains(&outfit.section)
        || outfit.description.as_deref().is_some_and(contains)
}
