use std::collections::BTreeMap;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::{Query, QueryRejection};
use intel_core::{
    AggregationBucket, DateRange, DealDimension, DealItem, DealsFilter, ListingPage, PageRequest,
    QueryDate, ValidationError, ValueRange,
};
use intel_search::DealsRepository;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{health_response, map_query_rejection, map_search_error, non_blank, ApiError};
use crate::middleware::RequestId;

pub(super) const PREFIX: &str = "/api/deals";
pub(super) const ENDPOINTS: &[&str] = &[
    "/listing",
    "/by-country",
    "/by-type",
    "/by-status",
    "/health",
];

const LISTING_FAILED: &str = "Internal server error occurred while retrieving deals";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct DealsListingQuery {
    #[serde(alias = "Page", alias = "pageNumber", alias = "PageNumber")]
    page: Option<i64>,
    #[serde(alias = "Size", alias = "pageSize", alias = "PageSize")]
    size: Option<i64>,
    #[serde(alias = "Query")]
    query: Option<String>,
    #[serde(alias = "Country")]
    country: Option<String>,
    #[serde(alias = "DealType", alias = "type", alias = "Type")]
    deal_type: Option<String>,
    #[serde(alias = "Status")]
    status: Option<String>,
    #[serde(alias = "MinValue", alias = "minDealValue", alias = "MinDealValue")]
    min_value: Option<Decimal>,
    #[serde(alias = "MaxValue", alias = "maxDealValue", alias = "MaxDealValue")]
    max_value: Option<Decimal>,
    #[serde(alias = "FromDate")]
    from_date: Option<QueryDate>,
    #[serde(alias = "ToDate")]
    to_date: Option<QueryDate>,
}

impl DealsListingQuery {
    fn into_filter(self) -> Result<DealsFilter, ValidationError> {
        let value = ValueRange::new(self.min_value, self.max_value)?;
        let published = DateRange::new(
            self.from_date.map(|d| d.0),
            self.to_date.map(|d| d.0),
        )?;
        Ok(DealsFilter {
            pagination: PageRequest {
                page: self.page,
                size: self.size,
            }
            .clamp(),
            query: non_blank(self.query),
            country: non_blank(self.country),
            deal_type: non_blank(self.deal_type),
            status: non_blank(self.status),
            value,
            published,
        })
    }
}

pub(super) fn router<S>(repo: DealsRepository) -> Router<S> {
    Router::new()
        .route("/listing", get(listing))
        .route("/by-country", get(by_country))
        .route("/by-type", get(by_type))
        .route("/by-status", get(by_status))
        .route("/health", get(health))
        .with_state(repo)
}

async fn listing(
    State(repo): State<DealsRepository>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<DealsListingQuery>, QueryRejection>,
) -> Result<Json<ListingPage<DealItem>>, ApiError> {
    let Query(query) = query.map_err(|e| map_query_rejection(&req_id.0, &e))?;
    let filter = query.into_filter()?;

    let page = repo
        .listing(&filter)
        .await
        .map_err(|e| map_search_error(&req_id.0, &e, LISTING_FAILED))?;
    Ok(Json(page))
}

/// Body keyed by the dimension's plural, e.g. `{"countries": [...]}`.
type BucketsBody = Json<BTreeMap<&'static str, Vec<AggregationBucket>>>;

async fn aggregate(
    repo: &DealsRepository,
    req_id: &RequestId,
    dimension: DealDimension,
) -> Result<BucketsBody, ApiError> {
    let buckets = repo.aggregate(dimension).await.map_err(|e| {
        map_search_error(
            &req_id.0,
            &e,
            &format!("Internal server error occurred while retrieving deals by {dimension}"),
        )
    })?;
    Ok(Json(BTreeMap::from([(dimension.plural(), buckets)])))
}

async fn by_country(
    State(repo): State<DealsRepository>,
    Extension(req_id): Extension<RequestId>,
) -> Result<BucketsBody, ApiError> {
    aggregate(&repo, &req_id, DealDimension::Country).await
}

async fn by_type(
    State(repo): State<DealsRepository>,
    Extension(req_id): Extension<RequestId>,
) -> Result<BucketsBody, ApiError> {
    aggregate(&repo, &req_id, DealDimension::Type).await
}

async fn by_status(
    State(repo): State<DealsRepository>,
    Extension(req_id): Extension<RequestId>,
) -> Result<BucketsBody, ApiError> {
    aggregate(&repo, &req_id, DealDimension::Status).await
}

async fn health(State(repo): State<DealsRepository>) -> impl IntoResponse {
    health_response(repo.is_healthy().await)
}
