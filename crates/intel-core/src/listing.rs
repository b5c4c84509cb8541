//! Pagination and range rules shared by every listing endpoint.
//!
//! Out-of-bounds paging input is corrected, never rejected. Inverted ranges
//! are rejected with a [`ValidationError`] before any backend is queried.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ValidationError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw paging input as bound from the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Clamped paging window: `page >= 1`, `1 <= size <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    size: u32,
}

impl PageRequest {
    #[must_use]
    pub fn clamp(self) -> Pagination {
        let page = self.page.unwrap_or(1).max(1);
        let size = self
            .size
            .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
            .clamp(1, i64::from(MAX_PAGE_SIZE));

        Pagination {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            // Already within 1..=MAX_PAGE_SIZE.
            size: u32::try_from(size).unwrap_or(MAX_PAGE_SIZE),
        }
    }
}

impl Pagination {
    #[must_use]
    pub fn page(self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn size(self) -> u32 {
        self.size
    }

    /// Number of items to skip: `(page - 1) * size`.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }

    #[must_use]
    pub fn total_pages(self, total_items: u64) -> u64 {
        total_items.div_ceil(u64::from(self.size))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        PageRequest::default().clamp()
    }
}

/// One page of a listing, in the shape callers receive it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> ListingPage<T> {
    #[must_use]
    pub fn new(items: Vec<T>, pagination: Pagination, total_items: u64) -> Self {
        let total_pages = pagination.total_pages(total_items);
        let page = u64::from(pagination.page());

        Self {
            items,
            page_number: pagination.page(),
            page_size: pagination.size(),
            total_items,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}

/// A timestamp accepted from a query string or a search document.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) or a
/// bare `YYYY-MM-DD` (midnight UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryDate(pub DateTime<Utc>);

impl std::str::FromStr for QueryDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_timestamp(s)
            .map(QueryDate)
            .ok_or_else(|| format!("invalid date '{s}'"))
    }
}

impl<'de> Deserialize<'de> for QueryDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Inclusive publish-date window; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvertedDateRange`] when both bounds are set
    /// and `from` is after `to`.
    pub fn new(
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ValidationError::InvertedDateRange);
            }
        }
        Ok(Self { from, to })
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Inclusive numeric window over a monetary value; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueRange {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl ValueRange {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvertedValueRange`] when both bounds are
    /// set and `min` is greater than `max`.
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Result<Self, ValidationError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ValidationError::InvertedValueRange);
            }
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn request(page: Option<i64>, size: Option<i64>) -> Pagination {
        PageRequest { page, size }.clamp()
    }

    #[test]
    fn clamp_applies_defaults() {
        let p = request(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.size(), DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn clamp_corrects_out_of_bounds_input() {
        assert_eq!(request(Some(-3), None).page(), 1);
        assert_eq!(request(Some(0), None).page(), 1);
        assert_eq!(request(None, Some(0)).size(), 1);
        assert_eq!(request(None, Some(-10)).size(), 1);
        assert_eq!(request(None, Some(1_000)).size(), MAX_PAGE_SIZE);
        assert_eq!(request(Some(i64::MAX), Some(5)).page(), u32::MAX);
    }

    #[test]
    fn offset_is_page_minus_one_times_size() {
        assert_eq!(request(Some(3), Some(20)).offset(), 40);
        assert_eq!(request(Some(1), Some(100)).offset(), 0);
    }

    #[test]
    fn first_page_of_seven_items_by_three() {
        let page = ListingPage::new(vec![1, 2, 3], request(Some(1), Some(3)), 7);
        assert_eq!(page.total_items, 7);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next_page);
        assert!(!page.has_previous_page);
    }

    #[test]
    fn last_page_has_no_next_page() {
        let page = ListingPage::new(vec![7], request(Some(3), Some(3)), 7);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next_page);
        assert!(page.has_previous_page);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page: ListingPage<u8> = ListingPage::new(vec![], request(Some(1), Some(10)), 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next_page);
        assert!(!page.has_previous_page);
    }

    #[test]
    fn page_flags_hold_across_a_grid_of_inputs() {
        for total in [0_u64, 1, 9, 10, 11, 250] {
            for size in [1_i64, 3, 10, 100] {
                for page in 1_i64..=5 {
                    let p = request(Some(page), Some(size));
                    let listing: ListingPage<()> = ListingPage::new(vec![], p, total);
                    assert_eq!(listing.total_pages, total.div_ceil(size as u64));
                    assert_eq!(listing.has_next_page, (page as u64) < listing.total_pages);
                    assert_eq!(listing.has_previous_page, page > 1);
                }
            }
        }
    }

    #[test]
    fn listing_page_serializes_in_camel_case() {
        let page = ListingPage::new(vec!["a"], request(Some(2), Some(1)), 3);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageNumber"], 2);
        assert_eq!(json["pageSize"], 1);
        assert_eq!(json["totalItems"], 3);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["hasPreviousPage"], true);
    }

    #[test]
    fn inverted_value_range_is_rejected() {
        let err = ValueRange::new(Some(Decimal::from(100)), Some(Decimal::from(50))).unwrap_err();
        assert_eq!(err, ValidationError::InvertedValueRange);
    }

    #[test]
    fn equal_and_half_open_value_ranges_are_accepted() {
        assert!(ValueRange::new(Some(Decimal::from(5)), Some(Decimal::from(5))).is_ok());
        assert!(ValueRange::new(Some(Decimal::from(5)), None).is_ok());
        assert!(ValueRange::new(None, Some(Decimal::from(5))).is_ok());
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let from = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(
            DateRange::new(Some(from), Some(to)).unwrap_err(),
            ValidationError::InvertedDateRange
        );
        assert!(DateRange::new(Some(to), Some(from)).is_ok());
    }

    #[test]
    fn parse_timestamp_accepts_common_shapes() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-15"), Some(midnight));
        assert_eq!(parse_timestamp("2024-03-15T00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-03-15T00:00:00Z"), Some(midnight));
        assert_eq!(
            parse_timestamp("2024-03-15T02:00:00+02:00"),
            Some(midnight)
        );
        assert!(parse_timestamp("2024-03-15T10:30:00.123").is_some());
        assert!(parse_timestamp("last tuesday").is_none());
    }

    #[test]
    fn query_date_deserializes_from_string() {
        let date: QueryDate = serde_json::from_str("\"2024-01-31\"").unwrap();
        assert_eq!(date.0, Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap());
        assert!(serde_json::from_str::<QueryDate>("\"31/01/2024\"").is_err());
    }
}
