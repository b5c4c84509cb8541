use chrono::{DateTime, Utc};
use intel_core::{AggregationBucket, DealDimension, DealItem, DealsFilter, ListingPage};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{IndexTarget, SearchClient};
use crate::error::SearchError;
use crate::query::{self, BoolQuery, PUBLISHED_DATE};
use crate::response::{deserialize_timestamp, CARDINALITY_SUB_AGGREGATION, SUM_SUB_AGGREGATION};

const SEARCH_FIELDS: &[&str] = &["title", "urlNode"];
const DEAL_VALUE: &str = "dealValue";
const DEAL_ID: &str = "baseDealId";

const SOURCE_FIELDS: &[&str] = &[
    "baseDealId",
    "publishedDate",
    "urlNode",
    "title",
    "dealCountryvalue",
    "dealType",
    "dealStatus",
    "dealValue",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DealDocument {
    #[serde(default)]
    base_deal_id: i64,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    published_date: Option<DateTime<Utc>>,
    #[serde(default)]
    url_node: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "dealCountryvalue")]
    deal_country_value: Option<String>,
    #[serde(default)]
    deal_type: Option<String>,
    #[serde(default)]
    deal_status: Option<String>,
    #[serde(default)]
    deal_value: Option<Decimal>,
}

impl From<DealDocument> for DealItem {
    fn from(doc: DealDocument) -> Self {
        DealItem {
            base_deal_id: doc.base_deal_id,
            published_date: doc.published_date,
            url_node: doc.url_node.unwrap_or_default(),
            title: doc.title.unwrap_or_default(),
            country: doc.deal_country_value.unwrap_or_default(),
            deal_type: doc.deal_type.unwrap_or_default(),
            status: doc.deal_status.unwrap_or_default(),
            deal_value: doc.deal_value.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Builds the conjunctive query for a deals listing.
#[must_use]
pub fn build_query(filter: &DealsFilter) -> Value {
    let mut q = BoolQuery::new();
    q.must_opt(query::multi_match(
        filter.query.as_deref(),
        SEARCH_FIELDS,
        false,
    ))
    .must_opt(query::term(
        DealDimension::Country.field(),
        filter.country.as_deref(),
    ))
    .must_opt(query::term(
        DealDimension::Type.field(),
        filter.deal_type.as_deref(),
    ))
    .must_opt(query::term(
        DealDimension::Status.field(),
        filter.status.as_deref(),
    ))
    .must_opt(query::value_range(DEAL_VALUE, &filter.value))
    .must_opt(query::date_range(PUBLISHED_DATE, &filter.published));
    q.build()
}

/// Size-0 body with one terms aggregation over `dimension`, each bucket
/// carrying a value sum and a distinct deal-id count.
#[must_use]
pub fn aggregation_body(dimension: DealDimension) -> Value {
    json!({
        "size": 0,
        "query": { "match_all": {} },
        "aggs": {
            dimension.aggregation_name(): {
                "terms": {
                    "field": dimension.field(),
                    "size": dimension.bucket_cap(),
                },
                "aggs": {
                    SUM_SUB_AGGREGATION: { "sum": { "field": DEAL_VALUE } },
                    CARDINALITY_SUB_AGGREGATION: { "cardinality": { "field": DEAL_ID } },
                },
            },
        },
    })
}

#[derive(Debug, Clone)]
pub struct DealsRepository {
    client: SearchClient,
    target: IndexTarget,
}

impl DealsRepository {
    #[must_use]
    pub fn new(client: SearchClient, target: IndexTarget) -> Self {
        Self { client, target }
    }

    /// Fetches one page of deals, newest first.
    ///
    /// # Errors
    ///
    /// Propagates any [`SearchError`] from the search call.
    pub async fn listing(&self, filter: &DealsFilter) -> Result<ListingPage<DealItem>, SearchError> {
        let body = query::listing_body(build_query(filter), filter.pagination, SOURCE_FIELDS);
        let response = self.client.search(&self.target, &body).await?;

        let total = response.total();
        let items: Vec<DealItem> = response
            .into_documents::<DealDocument>(&self.target.index)
            .into_iter()
            .map(DealItem::from)
            .collect();

        tracing::info!(
            index = %self.target.index,
            page = filter.pagination.page(),
            size = filter.pagination.size(),
            total,
            returned = items.len(),
            "deals listing retrieved"
        );

        Ok(ListingPage::new(items, filter.pagination, total))
    }

    /// Buckets every deal by `dimension`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Aggregation`] when the response lacks the
    /// requested bucket aggregation, or any error from the search call.
    pub async fn aggregate(
        &self,
        dimension: DealDimension,
    ) -> Result<Vec<AggregationBucket>, SearchError> {
        let response = self
            .client
            .search(&self.target, &aggregation_body(dimension))
            .await?;
        let buckets = response.terms_buckets(dimension.aggregation_name())?;

        tracing::info!(
            index = %self.target.index,
            %dimension,
            buckets = buckets.len(),
            "deals aggregation retrieved"
        );

        Ok(buckets)
    }

    pub async fn is_healthy(&self) -> bool {
        self.client.is_reachable().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use intel_core::{DateRange, ValueRange};

    use super::*;

    #[test]
    fn unfiltered_listing_matches_everything() {
        assert_eq!(build_query(&DealsFilter::default()), json!({ "match_all": {} }));
    }

    #[test]
    fn filters_map_to_keyword_terms_and_ranges() {
        let to = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let filter = DealsFilter {
            query: Some("oncology".to_string()),
            country: Some("United States".to_string()),
            deal_type: Some("Acquisition".to_string()),
            status: Some("Completed".to_string()),
            value: ValueRange::new(Some(Decimal::from(100)), None).unwrap(),
            published: DateRange::new(None, Some(to)).unwrap(),
            ..DealsFilter::default()
        };

        let q = build_query(&filter);
        let must = q["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 6);
        assert_eq!(must[0]["multi_match"]["fields"], json!(["title", "urlNode"]));
        assert_eq!(
            must[1],
            json!({ "term": { "dealCountryvalue.keyword": "United States" } })
        );
        assert_eq!(must[2], json!({ "term": { "dealType.keyword": "Acquisition" } }));
        assert_eq!(must[3], json!({ "term": { "dealStatus.keyword": "Completed" } }));
        assert_eq!(must[4]["range"]["dealValue"]["gte"], 100.0);
        assert!(must[4]["range"]["dealValue"].get("lte").is_none());
        assert_eq!(must[5]["range"]["publishedDate"]["lte"], "2024-12-31T00:00:00Z");
    }

    #[test]
    fn aggregation_body_requests_field_cap_and_metrics() {
        let body = aggregation_body(DealDimension::Status);
        assert_eq!(body["size"], 0);
        let agg = &body["aggs"]["by_status"];
        assert_eq!(agg["terms"]["field"], "dealStatus.keyword");
        assert_eq!(agg["terms"]["size"], 50);
        assert_eq!(agg["aggs"]["deal_value"]["sum"]["field"], "dealValue");
        assert_eq!(agg["aggs"]["deal_volume"]["cardinality"]["field"], "baseDealId");
    }

    #[test]
    fn document_maps_missing_fields_to_defaults() {
        let doc: DealDocument = serde_json::from_value(json!({
            "baseDealId": 5,
            "publishedDate": "2024-04-01T09:30:00Z",
            "dealCountryvalue": "France"
        }))
        .unwrap();

        let item = DealItem::from(doc);
        assert_eq!(item.base_deal_id, 5);
        assert_eq!(item.country, "France");
        assert_eq!(item.deal_type, "");
        assert_eq!(item.status, "");
        assert_eq!(item.deal_value, Decimal::ZERO);
        assert!(item.published_date.is_some());
    }
}
