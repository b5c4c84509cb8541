//! Search response envelope and its two readers: hit documents and terms
//! aggregation buckets.

use chrono::{DateTime, Utc};
use intel_core::listing::parse_timestamp;
use intel_core::AggregationBucket;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::SearchError;

/// Sub-aggregation holding the summed deal value of a bucket.
pub const SUM_SUB_AGGREGATION: &str = "deal_value";
/// Sub-aggregation holding the distinct deal-id count of a bucket.
pub const CARDINALITY_SUB_AGGREGATION: &str = "deal_volume";

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Hits,
    #[serde(default)]
    pub aggregations: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// `hits.total` is a bare number before 7.x and `{ "value", "relation" }` after.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    #[must_use]
    pub fn value(self) -> u64 {
        match self {
            TotalHits::Count(value) | TotalHits::Object { value } => value,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl SearchResponse {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.hits.total.map_or(0, TotalHits::value)
    }

    /// Deserializes every hit's `_source` as `T`.
    ///
    /// A hit whose source does not match `T` is logged and skipped; the
    /// remaining documents are still returned.
    pub fn into_documents<T: DeserializeOwned>(self, index: &str) -> Vec<T> {
        self.hits
            .hits
            .into_iter()
            .filter_map(|hit| match serde_json::from_value::<T>(hit.source) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    tracing::warn!(
                        index,
                        hit_id = hit.id.as_deref().unwrap_or("<none>"),
                        error = %e,
                        "skipping malformed search hit"
                    );
                    None
                }
            })
            .collect()
    }

    /// Reads the buckets of the terms aggregation named `name`.
    ///
    /// Sub-aggregations missing from a bucket count as zero.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Aggregation`] if the aggregation is absent or
    /// has no `buckets` array.
    pub fn terms_buckets(&self, name: &str) -> Result<Vec<AggregationBucket>, SearchError> {
        let aggregation = self
            .aggregations
            .as_ref()
            .and_then(|aggs| aggs.get(name))
            .ok_or_else(|| {
                SearchError::Aggregation(format!("aggregation '{name}' missing from response"))
            })?;

        let buckets = aggregation
            .get("buckets")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SearchError::Aggregation(format!("aggregation '{name}' is not a bucket aggregation"))
            })?;

        Ok(buckets.iter().map(read_bucket).collect())
    }
}

fn read_bucket(bucket: &Value) -> AggregationBucket {
    let key = match bucket.get("key") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => "Unknown".to_string(),
    };

    let metric = |sub: &str| bucket.get(sub).and_then(|agg| agg.get("value"));

    let volume = metric(CARDINALITY_SUB_AGGREGATION)
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let value = metric(SUM_SUB_AGGREGATION)
        .and_then(Value::as_f64)
        .and_then(Decimal::from_f64)
        .unwrap_or(Decimal::ZERO);

    AggregationBucket { key, volume, value }
}

/// Reads a document timestamp written either as a date string or as epoch
/// milliseconds. `null` and absent map to `None`.
///
/// # Errors
///
/// Fails when the value is a string in an unrecognised format or another
/// JSON type, which makes the enclosing hit malformed.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unrecognised timestamp '{raw}'"))),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {n}"))),
        Some(other) => Err(D::Error::custom(format!("unexpected timestamp: {other}"))),
    }
}
