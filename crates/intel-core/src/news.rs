use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::listing::{DateRange, Pagination};

/// Validated news listing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsFilter {
    pub pagination: Pagination,
    pub query: Option<String>,
    pub categories: Vec<String>,
    pub companies: Vec<String>,
    pub locations: Vec<String>,
    pub published: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub news_article_id: i64,
    pub published_date: Option<DateTime<Utc>>,
    pub url_node: String,
    pub title: String,
    pub news_event_types: Vec<String>,
    pub related_company_names: Vec<String>,
    pub locations: Vec<String>,
    pub sentiment: String,
}
