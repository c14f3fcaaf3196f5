//! Space search: matching, sorting and pagination over a validated query.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use mirror_core::{PaginatedSearchQuery, SortDirection, Space, StorageError};

/// Page size used when the query names none.
pub const DEFAULT_PER_PAGE: u64 = 25;

/// Upper bound for `perPage` and `numberOfItems`.
pub const MAX_PER_PAGE: u64 = 100;

/// Attribute matched by the free-text `search` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Name,
    Description,
}

impl SearchField {
    pub const ALL: [SearchField; 2] = [SearchField::Name, SearchField::Description];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::Description => "description",
        }
    }

    pub fn parse(raw: Option<&str>) -> Result<Self, StorageError> {
        match raw {
            None => Ok(Self::default()),
            Some(field) => Self::ALL
                .iter()
                .copied()
                .find(|f| f.as_str() == field)
                .ok_or_else(|| StorageError::UnsupportedSearchField {
                    field: field.to_string(),
                }),
        }
    }

    fn value<'a>(&self, space: &'a Space) -> &'a str {
        match self {
            SearchField::Name => &space.name,
            SearchField::Description => &space.description,
        }
    }
}

/// Sortable attribute. Unknown keys sort by `updatedAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    UpdatedAt,
    CreatedAt,
    Name,
}

impl SortKey {
    pub fn from_key(key: &str) -> Self {
        match key {
            "createdAt" => SortKey::CreatedAt,
            "name" => SortKey::Name,
            _ => SortKey::UpdatedAt,
        }
    }

    fn compare(&self, a: &Space, b: &Space) -> Ordering {
        match self {
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        }
    }
}

/// Slice of the result set to return.
///
/// When either `startItem` or `numberOfItems` is supplied the offset/limit
/// idiom wins; otherwise `page` (1-based) and `perPage` apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageWindow {
    Page { page: u64, per_page: u64 },
    Offset { start_item: u64, number_of_items: u64 },
}

impl PageWindow {
    pub fn resolve(query: &PaginatedSearchQuery) -> Self {
        if query.uses_offset() {
            PageWindow::Offset {
                start_item: query.start_item.unwrap_or(0),
                number_of_items: query
                    .number_of_items
                    .unwrap_or(DEFAULT_PER_PAGE)
                    .min(MAX_PER_PAGE),
            }
        } else {
            PageWindow::Page {
                page: query.page.unwrap_or(1).max(1),
                per_page: query
                    .per_page
                    .unwrap_or(DEFAULT_PER_PAGE)
                    .clamp(1, MAX_PER_PAGE),
            }
        }
    }

    pub fn offset(&self) -> u64 {
        match *self {
            PageWindow::Page { page, per_page } => (page - 1).saturating_mul(per_page),
            PageWindow::Offset { start_item, .. } => start_item,
        }
    }

    pub fn limit(&self) -> u64 {
        match *self {
            PageWindow::Page { per_page, .. } => per_page,
            PageWindow::Offset {
                number_of_items, ..
            } => number_of_items,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SpacePage {
    pub data: Vec<Space>,
    /// Number of matches before pagination
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_item: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_items: Option<u64>,
}

fn matches(space: &Space, query: &PaginatedSearchQuery, field: SearchField) -> bool {
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        if !field
            .value(space)
            .to_lowercase()
            .contains(&term.to_lowercase())
        {
            return false;
        }
    }
    match (&query.tag, query.tag_type) {
        (Some(tags), Some(tag_type)) if !tags.is_empty() => space.tags.contains_all(tag_type, tags),
        _ => true,
    }
}

/// Run a validated query against a set of spaces.
pub fn search_spaces<'a, I>(spaces: I, query: &PaginatedSearchQuery) -> Result<SpacePage, StorageError>
where
    I: IntoIterator<Item = &'a Space>,
{
    let field = SearchField::parse(query.field.as_deref())?;
    let sort_key = SortKey::from_key(&query.sort_key);

    let mut hits: Vec<&Space> = spaces
        .into_iter()
        .filter(|space| matches(space, query, field))
        .collect();
    hits.sort_by(|a, b| {
        let ordering = sort_key.compare(a, b).then_with(|| a.id.cmp(&b.id));
        match query.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let window = PageWindow::resolve(query);
    let total = hits.len() as u64;
    let data = hits
        .into_iter()
        .skip(usize::try_from(window.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(window.limit()).unwrap_or(usize::MAX))
        .cloned()
        .collect();

    let page = match window {
        PageWindow::Page { page, per_page } => SpacePage {
            data,
            total,
            page: Some(page),
            per_page: Some(per_page),
            start_item: None,
            number_of_items: None,
        },
        PageWindow::Offset {
            start_item,
            number_of_items,
        } => SpacePage {
            data,
            total,
            page: None,
            per_page: None,
            start_item: Some(start_item),
            number_of_items: Some(number_of_items),
        },
    };
    Ok(page)
}
