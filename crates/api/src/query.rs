//! Shared query parameter types for API handlers.
//!
//! Asset list endpoints take the raw query map so that filter keys and paging
//! keys can share one query string; the typed structs below cover the rest.

use std::collections::HashMap;

use gactif_core::assets::filter::PageRequest;
use gactif_core::error::CoreError;
use serde::Deserialize;

pub const PARAM_PAGE: &str = "page";
pub const PARAM_SIZE: &str = "size";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_DIRECTION: &str = "direction";

/// Build a [`PageRequest`] from `?page=&size=&sort=&direction=`.
///
/// Non-numeric `page` or `size` is a validation error, as are the range and
/// sort-field checks done by [`PageRequest::new`].
pub fn page_request(params: &HashMap<String, String>) -> Result<PageRequest, CoreError> {
    PageRequest::new(
        int_param(params, PARAM_PAGE)?,
        int_param(params, PARAM_SIZE)?,
        params.get(PARAM_SORT).map(String::as_str),
        params.get(PARAM_DIRECTION).map(String::as_str),
    )
}

fn int_param(params: &HashMap<String, String>, key: &str) -> Result<Option<i64>, CoreError> {
    params
        .get(key)
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| {
                CoreError::Validation(format!("Parameter '{key}' must be an integer (got '{raw}')"))
            })
        })
        .transpose()
}

/// `?q=` for search endpoints. Missing means the empty needle (match all).
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// `?active=` for the service list.
#[derive(Debug, Deserialize)]
pub struct ActiveParams {
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use gactif_core::assets::filter::{SortDirection, SortField};

    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn paging_keys_are_parsed() {
        let request = page_request(&params(&[
            ("page", "2"),
            ("size", "5"),
            ("sort", "value"),
            ("direction", "desc"),
            ("status", "BROKEN"),
        ]))
        .unwrap();
        assert_eq!(request.page, 2);
        assert_eq!(request.size, 5);
        assert_eq!(request.sort, SortField::Value);
        assert_eq!(request.direction, SortDirection::Desc);
    }

    #[test]
    fn non_numeric_size_is_rejected() {
        assert_matches!(
            page_request(&params(&[("size", "ten")])),
            Err(CoreError::Validation(_))
        );
    }
}
