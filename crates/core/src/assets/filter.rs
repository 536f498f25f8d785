//! Filter predicate, sort order and page envelope for asset queries.
//!
//! The same [`AssetFilter`] is applied by the unpaged list and the paged
//! query, in every storage backend, so `serviceId`, `status` and `search`
//! always compose with AND.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use super::{Asset, AssetStatus};
use crate::error::CoreError;
use crate::types::DbId;

/// Query key for the owning-service filter.
pub const FILTER_SERVICE_ID: &str = "serviceId";
/// Query key for the status filter.
pub const FILTER_STATUS: &str = "status";
/// Query key for the name/reference substring filter.
pub const FILTER_SEARCH: &str = "search";

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Recognized filters narrowing an asset query. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    pub service_id: Option<DbId>,
    pub status: Option<AssetStatus>,
    /// Lowercased needle matched against name OR reference.
    pub search: Option<String>,
}

impl AssetFilter {
    /// Build a filter from raw query parameters.
    ///
    /// Unrecognized keys are ignored. A malformed value for a recognized key
    /// fails the whole request rather than silently dropping the filter.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, CoreError> {
        let service_id = params
            .get(FILTER_SERVICE_ID)
            .map(|raw| {
                raw.trim().parse::<DbId>().map_err(|_| {
                    CoreError::Validation(format!(
                        "Filter '{FILTER_SERVICE_ID}' must be a numeric id (got '{raw}')"
                    ))
                })
            })
            .transpose()?;

        let status = params
            .get(FILTER_STATUS)
            .map(|raw| AssetStatus::parse(raw))
            .transpose()?;

        let search = params.get(FILTER_SEARCH).map(|q| q.to_lowercase());

        Ok(Self {
            service_id,
            status,
            search,
        })
    }

    /// Filter that only matches substring search, as used by `search(q)`.
    pub fn text(q: &str) -> Self {
        Self {
            search: Some(q.to_lowercase()),
            ..Default::default()
        }
    }

    /// Filter that only matches one service, as used by `byService`.
    pub fn service(service_id: DbId) -> Self {
        Self {
            service_id: Some(service_id),
            ..Default::default()
        }
    }

    /// Evaluate the predicate against a stored asset.
    pub fn matches(&self, asset: &Asset) -> bool {
        if let Some(service_id) = self.service_id {
            if asset.data.service_id != Some(service_id) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if asset.data.status != status {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            return contains_ignore_case(&asset.data.name, needle)
                || asset
                    .data
                    .reference
                    .as_deref()
                    .is_some_and(|r| contains_ignore_case(r, needle));
        }
        true
    }
}

/// `needle` must already be lowercase.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sortable asset fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    Name,
    Reference,
    Category,
    Status,
    AcquisitionDate,
    Value,
    SerialNumber,
    Location,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Parse a wire field name. Blank means the default (`id`).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let field = match s.trim() {
            "" | "id" => Self::Id,
            "name" => Self::Name,
            "reference" => Self::Reference,
            "category" => Self::Category,
            "status" => Self::Status,
            "acquisitionDate" => Self::AcquisitionDate,
            "value" => Self::Value,
            "serialNumber" => Self::SerialNumber,
            "location" => Self::Location,
            "createdAt" => Self::CreatedAt,
            "updatedAt" => Self::UpdatedAt,
            other => {
                return Err(CoreError::Validation(format!(
                    "Cannot sort assets by unknown field '{other}'"
                )))
            }
        };
        Ok(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` (any case) sorts descending; anything else ascending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Compare two assets on `field`.
///
/// Nulls sort last ascending and first descending, and ties always break on
/// id ascending, matching the `ORDER BY <col> <dir>, id ASC` the Postgres
/// store issues.
pub fn compare_assets(a: &Asset, b: &Asset, field: SortField, direction: SortDirection) -> Ordering {
    let (x, y) = (&a.data, &b.data);
    let primary = match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Name => x.name.cmp(&y.name),
        SortField::Reference => nulls_last(&x.reference, &y.reference),
        SortField::Category => nulls_last(
            &x.category.map(|c| c.as_str()),
            &y.category.map(|c| c.as_str()),
        ),
        SortField::Status => x.status.as_str().cmp(y.status.as_str()),
        SortField::AcquisitionDate => nulls_last(&x.acquisition_date, &y.acquisition_date),
        SortField::Value => nulls_last(&x.value, &y.value),
        SortField::SerialNumber => nulls_last(&x.serial_number, &y.serial_number),
        SortField::Location => nulls_last(&x.location, &y.location),
        SortField::CreatedAt => x.created_at.cmp(&y.created_at),
        SortField::UpdatedAt => nulls_last(&x.updated_at, &y.updated_at),
    };
    let primary = match direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// A validated page request (0-based page index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub sort: SortField,
    pub direction: SortDirection,
}

impl PageRequest {
    /// Validate raw paging parameters.
    ///
    /// `page` must be >= 0 and `size` > 0; `size` is capped at
    /// [`MAX_PAGE_SIZE`].
    pub fn new(
        page: Option<i64>,
        size: Option<i64>,
        sort: Option<&str>,
        direction: Option<&str>,
    ) -> Result<Self, CoreError> {
        let page = page.unwrap_or(0);
        if page < 0 {
            return Err(CoreError::Validation(format!(
                "Page index must be >= 0 (got {page})"
            )));
        }
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size <= 0 {
            return Err(CoreError::Validation(format!(
                "Page size must be > 0 (got {size})"
            )));
        }

        Ok(Self {
            page,
            size: size.min(MAX_PAGE_SIZE),
            sort: sort.map(SortField::parse).transpose()?.unwrap_or_default(),
            direction: direction.map(SortDirection::parse).unwrap_or_default(),
        })
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: SortField::default(),
            direction: SortDirection::default(),
        }
    }
}

/// Page envelope: a bounded slice plus total-count metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub size: i64,
    pub number: i64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: i64, request: &PageRequest) -> Self {
        let total_pages = total_elements / request.size
            + i64::from(total_elements % request.size != 0);
        let empty = content.is_empty();
        Self {
            content,
            total_elements,
            total_pages,
            size: request.size,
            number: request.page,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
            empty,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            size: self.size,
            number: self.number,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
