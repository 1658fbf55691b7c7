use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::listing::{Listing, ListingType};
use crate::property::{Property, PropertyType};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(ModelError::UnknownSortDirection(value.to_string())),
        }
    }
}

/// Pagination and ordering of a search request, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
}

impl PageRequest {
    /// Page size with the default applied; non-positive sizes fall back too.
    pub fn effective_size(&self) -> i64 {
        match self.size {
            Some(size) if size > 0 => size,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// Row offset. Pages are 1-based; page 0 and page 1 both resolve to
    /// offset 0, which existing API clients rely on.
    pub fn offset(&self) -> i64 {
        let size = self.effective_size();
        match self.page {
            Some(page) if page > 0 => (page - 1) * size,
            _ => 0,
        }
    }

    /// Sort column restricted to an allow-list; unknown fields fall back to
    /// the creation timestamp rather than erroring.
    pub fn sort_column(&self) -> &'static str {
        match self.sort.as_deref() {
            Some("price") => "price",
            Some("area") => "area",
            Some("bedrooms") => "bedrooms",
            _ => "created_at",
        }
    }

    pub fn direction(&self) -> SortDirection {
        self.direction.unwrap_or_default()
    }
}

/// Optional filters for the listing search. Absent fields are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSearchCriteria {
    pub listing_type: Option<ListingType>,
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub agent_id: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<i32>,
    pub max_bedrooms: Option<i32>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    #[serde(flatten)]
    pub page: PageRequest,
}

/// One search result row: a listing joined with its property where the
/// property could be resolved. A failed or empty property fetch leaves the
/// field absent without failing the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingWithProperty {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<Property>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: Option<i64>, size: Option<i64>) -> PageRequest {
        PageRequest {
            page,
            size,
            sort: None,
            direction: None,
        }
    }

    #[test]
    fn size_defaults_when_absent_or_non_positive() {
        assert_eq!(page(None, None).effective_size(), 10);
        assert_eq!(page(None, Some(0)).effective_size(), 10);
        assert_eq!(page(None, Some(-5)).effective_size(), 10);
        assert_eq!(page(None, Some(25)).effective_size(), 25);
    }

    #[test]
    fn offset_is_zero_for_page_zero_and_page_one() {
        assert_eq!(page(Some(0), Some(10)).offset(), 0);
        assert_eq!(page(Some(1), Some(10)).offset(), 0);
        assert_eq!(page(Some(2), Some(10)).offset(), 10);
        assert_eq!(page(Some(3), Some(7)).offset(), 14);
    }

    #[test]
    fn sort_field_falls_back_to_created_at() {
        assert_eq!(page(None, None).sort_column(), "created_at");
        let mut request = page(None, None);
        request.sort = Some("price".to_string());
        assert_eq!(request.sort_column(), "price");
        request.sort = Some("password_hash".to_string());
        assert_eq!(request.sort_column(), "created_at");
    }

    #[test]
    fn direction_defaults_to_desc() {
        assert_eq!(page(None, None).direction(), SortDirection::Desc);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
    }
}
