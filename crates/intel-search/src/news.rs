use chrono::{DateTime, Utc};
use intel_core::{ListingPage, NewsFilter, NewsItem};
use serde::Deserialize;
use serde_json::Value;

use crate::client::{IndexTarget, SearchClient};
use crate::error::SearchError;
use crate::query::{self, BoolQuery, PUBLISHED_DATE};
use crate::response::deserialize_timestamp;

const SEARCH_FIELDS: &[&str] = &["title"];
const COMPANIES_PATH: &str = "newsArticleCompanies";
const COMPANY_NAME_FIELD: &str = "newsArticleCompanies.relatedCompanyName";

const SOURCE_FIELDS: &[&str] = &[
    "newsArticleId",
    "publishedDate",
    "urlNode",
    "title",
    "newsEventTypes",
    "newsArticleCompanies",
    "locations",
    "sentiments",
];

/// A news article as stored in the index.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsDocument {
    #[serde(default)]
    news_article_id: i64,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    published_date: Option<DateTime<Utc>>,
    #[serde(default)]
    url_node: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    news_event_types: Option<Vec<String>>,
    #[serde(default)]
    news_article_companies: Option<Vec<NewsCompany>>,
    #[serde(default)]
    locations: Option<Vec<String>>,
    #[serde(default)]
    sentiments: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsCompany {
    #[serde(default)]
    related_company_name: Option<String>,
}

impl From<NewsDocument> for NewsItem {
    fn from(doc: NewsDocument) -> Self {
        let related_company_names = doc
            .news_article_companies
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.related_company_name)
            .filter(|name| !name.trim().is_empty())
            .collect();

        NewsItem {
            news_article_id: doc.news_article_id,
            published_date: doc.published_date,
            url_node: doc.url_node.unwrap_or_default(),
            title: doc.title.unwrap_or_default(),
            news_event_types: doc.news_event_types.unwrap_or_default(),
            related_company_names,
            locations: doc.locations.unwrap_or_default(),
            sentiment: doc.sentiments.unwrap_or_default(),
        }
    }
}

/// Builds the conjunctive query for a news listing.
#[must_use]
pub fn build_query(filter: &NewsFilter) -> Value {
    let mut q = BoolQuery::new();
    q.must_opt(query::multi_match(
        filter.query.as_deref(),
        SEARCH_FIELDS,
        true,
    ))
    .must_opt(query::terms("newsEventTypes", &filter.categories))
    .must_opt(
        query::terms(COMPANY_NAME_FIELD, &filter.companies)
            .map(|companies| query::nested(COMPANIES_PATH, companies)),
    )
    .must_opt(query::terms("locations", &filter.locations))
    .must_opt(query::date_range(PUBLISHED_DATE, &filter.published));
    q.build()
}

#[derive(Debug, Clone)]
pub struct NewsRepository {
    client: SearchClient,
    target: IndexTarget,
}

impl NewsRepository {
    #[must_use]
    pub fn new(client: SearchClient, target: IndexTarget) -> Self {
        Self { client, target }
    }

    /// Fetches one page of news, newest first.
    ///
    /// # Errors
    ///
    /// Propagates any [`SearchError`] from the search call.
    pub async fn listing(&self, filter: &NewsFilter) -> Result<ListingPage<NewsItem>, SearchError> {
        let body = query::listing_body(build_query(filter), filter.pagination, SOURCE_FIELDS);
        let response = self.client.search(&self.target, &body).await?;

        let total = response.total();
        let items: Vec<NewsItem> = response
            .into_documents::<NewsDocument>(&self.target.index)
            .into_iter()
            .map(NewsItem::from)
            .collect();

        tracing::info!(
            index = %self.target.index,
            page = filter.pagination.page(),
            size = filter.pagination.size(),
            total,
            returned = items.len(),
            "news listing retrieved"
        );

        Ok(ListingPage::new(items, filter.pagination, total))
    }

    pub async fn is_healthy(&self) -> bool {
        self.client.is_reachable().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use intel_core::DateRange;
    use serde_json::json;

    use super::*;

    #[test]
    fn unfiltered_listing_matches_everything() {
        assert_eq!(build_query(&NewsFilter::default()), json!({ "match_all": {} }));
    }

    #[test]
    fn every_filter_becomes_one_must_clause() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let filter = NewsFilter {
            query: Some("vaccine".to_string()),
            categories: vec!["Product Approval".to_string()],
            companies: vec!["Pfizer".to_string(), "Moderna".to_string()],
            locations: vec!["Germany".to_string()],
            published: DateRange::new(Some(from), None).unwrap(),
            ..NewsFilter::default()
        };

        let q = build_query(&filter);
        let must = q["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 5);
        assert_eq!(must[0]["multi_match"]["fields"], json!(["title"]));
        assert_eq!(must[0]["multi_match"]["type"], "best_fields");
        assert_eq!(must[1], json!({ "terms": { "newsEventTypes": ["Product Approval"] } }));
        assert_eq!(must[2]["nested"]["path"], "newsArticleCompanies");
        assert_eq!(
            must[2]["nested"]["query"]["terms"]["newsArticleCompanies.relatedCompanyName"],
            json!(["Pfizer", "Moderna"])
        );
        assert_eq!(must[3], json!({ "terms": { "locations": ["Germany"] } }));
        assert_eq!(
            must[4]["range"]["publishedDate"]["gte"],
            "2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn document_maps_with_defaults_and_blank_companies_dropped() {
        let doc: NewsDocument = serde_json::from_value(json!({
            "newsArticleId": 11,
            "title": "Merger news",
            "newsArticleCompanies": [
                { "relatedCompanyName": "Acme", "companyId": "1" },
                { "relatedCompanyName": "  ", "companyId": "2" },
                { "companyId": "3" }
            ],
            "sentiments": null
        }))
        .unwrap();

        let item = NewsItem::from(doc);
        assert_eq!(item.news_article_id, 11);
        assert_eq!(item.related_company_names, ["Acme"]);
        assert_eq!(item.url_node, "");
        assert!(item.news_event_types.is_empty());
        assert_eq!(item.sentiment, "");
        assert!(item.published_date.is_none());
    }
}
