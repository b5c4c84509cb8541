use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::listing::{DateRange, Pagination, ValueRange};

/// Validated deals listing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealsFilter {
    pub pagination: Pagination,
    pub query: Option<String>,
    pub country: Option<String>,
    pub deal_type: Option<String>,
    pub status: Option<String>,
    pub value: ValueRange,
    pub published: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealItem {
    pub base_deal_id: i64,
    pub published_date: Option<DateTime<Utc>>,
    pub url_node: String,
    pub title: String,
    pub country: String,
    pub deal_type: String,
    pub status: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub deal_value: Decimal,
}
