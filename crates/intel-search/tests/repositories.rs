//! Integration tests for the news and deals repositories using wiremock
//! stand-ins for the search cluster.

use intel_core::{DealDimension, DealsFilter, NewsFilter, PageRequest, ValueRange};
use intel_search::{DealsRepository, IndexTarget, NewsRepository, SearchClient, SearchError};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SearchClient {
    SearchClient::new(&server.uri(), 5).expect("client construction should not fail")
}

fn news_repo(server: &MockServer) -> NewsRepository {
    NewsRepository::new(
        client(server),
        IndexTarget::new("intelligencecenter", None),
    )
}

fn deals_repo(server: &MockServer) -> DealsRepository {
    DealsRepository::new(
        client(server),
        IndexTarget::new("intelligencecenter", Some("deals".to_string())),
    )
}

#[tokio::test]
async fn news_first_page_of_seven() {
    let server = MockServer::start().await;

    let body = json!({
        "hits": {
            "total": { "value": 7, "relation": "eq" },
            "hits": [
                { "_id": "7", "_source": { "newsArticleId": 7, "title": "Seventh", "publishedDate": "2024-07-07T00:00:00" } },
                { "_id": "6", "_source": { "newsArticleId": 6, "title": "Sixth", "publishedDate": "2024-06-06T00:00:00" } },
                { "_id": "5", "_source": { "newsArticleId": 5, "title": "Fifth", "publishedDate": "2024-05-05T00:00:00" } }
            ]
        }
    });

    Mock::given(method("POST"))
        .and(path("/intelligencecenter/_search"))
        .and(body_partial_json(json!({ "from": 0, "size": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let filter = NewsFilter {
        pagination: PageRequest {
            page: Some(1),
            size: Some(3),
        }
        .clamp(),
        ..NewsFilter::default()
    };
    let page = news_repo(&server)
        .listing(&filter)
        .await
        .expect("listing should succeed");

    let ids: Vec<_> = page.items.iter().map(|i| i.news_article_id).collect();
    assert_eq!(ids, [7, 6, 5]);
    assert_eq!(page.total_items, 7);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next_page);
    assert!(!page.has_previous_page);
}

#[tokio::test]
async fn news_listing_skips_malformed_hit() {
    let server = MockServer::start().await;

    let body = json!({
        "hits": {
            "total": 2,
            "hits": [
                { "_id": "1", "_source": { "newsArticleId": 1, "title": "Fine" } },
                { "_id": "2", "_source": { "newsArticleId": "not-a-number", "title": "Broken" } }
            ]
        }
    });

    Mock::given(method("POST"))
        .and(path("/intelligencecenter/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let page = news_repo(&server)
        .listing(&NewsFilter::default())
        .await
        .expect("listing should succeed");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "Fine");
    assert_eq!(page.total_items, 2);
}

#[tokio::test]
async fn deals_listing_sends_filters_to_typed_index() {
    let server = MockServer::start().await;

    let body = json!({
        "hits": {
            "total": { "value": 1, "relation": "eq" },
            "hits": [
                {
                    "_id": "900",
                    "_source": {
                        "baseDealId": 900,
                        "publishedDate": "2024-03-01T00:00:00Z",
                        "urlNode": "big-pharma-deal",
                        "title": "Big pharma deal",
                        "dealCountryvalue": "Japan",
                        "dealType": "Licensing",
                        "dealStatus": "Announced",
                        "dealValue": 1250.5
                    }
                }
            ]
        }
    });

    Mock::given(method("POST"))
        .and(path("/intelligencecenter/deals/_search"))
        .and(body_partial_json(json!({
            "query": { "bool": { "must": [
                { "term": { "dealCountryvalue.keyword": "Japan" } },
                { "range": { "dealValue": { "gte": 1000.0 } } }
            ] } },
            "track_total_hits": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let filter = DealsFilter {
        country: Some("Japan".to_string()),
        value: ValueRange::new(Some(Decimal::from(1000)), None).unwrap(),
        ..DealsFilter::default()
    };
    let page = deals_repo(&server)
        .listing(&filter)
        .await
        .expect("listing should succeed");

    assert_eq!(page.items.len(), 1);
    let deal = &page.items[0];
    assert_eq!(deal.base_deal_id, 900);
    assert_eq!(deal.country, "Japan");
    assert_eq!(deal.deal_type, "Licensing");
    assert_eq!(deal.deal_value, Decimal::new(12505, 1));
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn by_country_dedupes_volume_and_sums_value() {
    let server = MockServer::start().await;

    // Two US documents share deal id 1; the cluster reports cardinality 1.
    let body = json!({
        "hits": { "total": { "value": 3, "relation": "eq" }, "hits": [] },
        "aggregations": {
            "by_country": {
                "doc_count_error_upper_bound": 0,
                "sum_other_doc_count": 0,
                "buckets": [
                    { "key": "US", "doc_count": 2, "deal_value": { "value": 20.0 }, "deal_volume": { "value": 1 } },
                    { "key": "UK", "doc_count": 1, "deal_value": { "value": 5.0 }, "deal_volume": { "value": 1 } }
                ]
            }
        }
    });

    Mock::given(method("POST"))
        .and(path("/intelligencecenter/deals/_search"))
        .and(body_partial_json(json!({
            "size": 0,
            "aggs": { "by_country": { "terms": { "field": "dealCountryvalue.keyword", "size": 250 } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let buckets = deals_repo(&server)
        .aggregate(DealDimension::Country)
        .await
        .expect("aggregation should succeed");

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].key, "US");
    assert_eq!(buckets[0].volume, 1);
    assert_eq!(buckets[0].value, Decimal::from(20));
    assert_eq!(buckets[1].key, "UK");
    assert_eq!(buckets[1].volume, 1);
    assert_eq!(buckets[1].value, Decimal::from(5));
}

#[tokio::test]
async fn missing_aggregation_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/intelligencecenter/deals/_search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "hits": { "total": 0, "hits": [] } })),
        )
        .mount(&server)
        .await;

    let err = deals_repo(&server)
        .aggregate(DealDimension::Type)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Aggregation(_)), "got {err:?}");
}

#[tokio::test]
async fn cluster_error_surfaces_reason() {
    let server = MockServer::start().await;

    let body = json!({
        "error": {
            "root_cause": [{ "type": "index_not_found_exception", "reason": "no such index [intelligencecenter]" }],
            "type": "index_not_found_exception",
            "reason": "no such index [intelligencecenter]"
        },
        "status": 404
    });

    Mock::given(method("POST"))
        .and(path("/intelligencecenter/_search"))
        .respond_with(ResponseTemplate::new(404).set_body_json(&body))
        .mount(&server)
        .await;

    let err = news_repo(&server)
        .listing(&NewsFilter::default())
        .await
        .unwrap_err();

    match err {
        SearchError::Status { status, reason } => {
            assert_eq!(status, 404);
            assert!(reason.contains("no such index"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn health_reflects_ping_result() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(news_repo(&server).is_healthy().await);

    let down = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&down)
        .await;

    assert!(!deals_repo(&down).is_healthy().await);
}
