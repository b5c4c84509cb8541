//! Query DSL fragments and the shared listing request body.

use chrono::{DateTime, SecondsFormat, Utc};
use intel_core::{DateRange, Pagination, ValueRange};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Map, Value};

/// Field every listing sorts and date-filters on.
pub const PUBLISHED_DATE: &str = "publishedDate";

/// Conjunction of predicates; collapses to `match_all` when empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    must: Vec<Value>,
}

impl BoolQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(&mut self, predicate: Value) -> &mut Self {
        self.must.push(predicate);
        self
    }

    pub fn must_opt(&mut self, predicate: Option<Value>) -> &mut Self {
        if let Some(predicate) = predicate {
            self.must.push(predicate);
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
    }

    #[must_use]
    pub fn build(self) -> Value {
        if self.must.is_empty() {
            json!({ "match_all": {} })
        } else {
            json!({ "bool": { "must": self.must } })
        }
    }
}

/// Free-text match over `fields`; `None` when the text is blank.
#[must_use]
pub fn multi_match(text: Option<&str>, fields: &[&str], best_fields: bool) -> Option<Value> {
    let text = text.map(str::trim).filter(|t| !t.is_empty())?;
    let mut body = json!({ "query": text, "fields": fields });
    if best_fields {
        body["type"] = json!("best_fields");
    }
    Some(json!({ "multi_match": body }))
}

/// Exact match on a keyword field; `None` when the value is blank.
#[must_use]
pub fn term(field: &str, value: Option<&str>) -> Option<Value> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    Some(json!({ "term": { field: value } }))
}

/// Any-of match; `None` when there are no values.
#[must_use]
pub fn terms(field: &str, values: &[String]) -> Option<Value> {
    if values.is_empty() {
        return None;
    }
    Some(json!({ "terms": { field: values } }))
}

#[must_use]
pub fn nested(path: &str, query: Value) -> Value {
    json!({ "nested": { "path": path, "query": query } })
}

/// Inclusive range on a date field; `None` when both bounds are open.
#[must_use]
pub fn date_range(field: &str, range: &DateRange) -> Option<Value> {
    if range.is_open() {
        return None;
    }
    let mut bounds = Map::new();
    if let Some(from) = range.from {
        bounds.insert("gte".to_string(), json!(format_date(from)));
    }
    if let Some(to) = range.to {
        bounds.insert("lte".to_string(), json!(format_date(to)));
    }
    Some(json!({ "range": { field: bounds } }))
}

/// Inclusive range on a numeric field; `None` when both bounds are open.
#[must_use]
pub fn value_range(field: &str, range: &ValueRange) -> Option<Value> {
    if range.is_open() {
        return None;
    }
    let mut bounds = Map::new();
    if let Some(min) = range.min.and_then(|d| d.to_f64()) {
        bounds.insert("gte".to_string(), json!(min));
    }
    if let Some(max) = range.max.and_then(|d| d.to_f64()) {
        bounds.insert("lte".to_string(), json!(max));
    }
    Some(json!({ "range": { field: bounds } }))
}

fn format_date(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Paged listing body: newest first, exact totals, `_source` limited to the
/// mapped fields. `page` has no upper bound; an offset past the cluster's
/// result window is rejected by the cluster as [`crate::SearchError::Status`].
#[must_use]
pub fn listing_body(query: Value, pagination: Pagination, source: &[&str]) -> Value {
    json!({
        "from": pagination.offset(),
        "size": pagination.size(),
        "query": query,
        "sort": [{ PUBLISHED_DATE: { "order": "desc" } }],
        "track_total_hits": true,
        "_source": { "includes": source },
    })
}
