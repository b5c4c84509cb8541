use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::{Query, QueryRejection};
use intel_core::{
    DateRange, ListingPage, NewsFilter, NewsItem, PageRequest, QueryDate, ValidationError,
};
use intel_search::NewsRepository;
use serde::Deserialize;

use super::{
    health_response, map_query_rejection, map_search_error, merge_list, non_blank, ApiError,
};
use crate::middleware::RequestId;

pub(super) const PREFIX: &str = "/api/news";
pub(super) const ENDPOINTS: &[&str] = &["/listing", "/health"];

const LISTING_FAILED: &str = "Internal server error occurred while retrieving news";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct NewsListingQuery {
    #[serde(alias = "Page", alias = "pageNumber", alias = "PageNumber")]
    page: Option<i64>,
    #[serde(alias = "Size", alias = "pageSize", alias = "PageSize")]
    size: Option<i64>,
    #[serde(alias = "Query")]
    query: Option<String>,
    #[serde(alias = "Categories")]
    categories: Vec<String>,
    #[serde(rename = "categories[]", alias = "Categories[]")]
    categories_bracketed: Vec<String>,
    #[serde(alias = "Companies")]
    companies: Vec<String>,
    #[serde(rename = "companies[]", alias = "Companies[]")]
    companies_bracketed: Vec<String>,
    #[serde(alias = "Locations")]
    locations: Vec<String>,
    #[serde(rename = "locations[]", alias = "Locations[]")]
    locations_bracketed: Vec<String>,
    #[serde(alias = "FromDate")]
    from_date: Option<QueryDate>,
    #[serde(alias = "ToDate")]
    to_date: Option<QueryDate>,
}

impl NewsListingQuery {
    fn into_filter(self) -> Result<NewsFilter, ValidationError> {
        let published = DateRange::new(
            self.from_date.map(|d| d.0),
            self.to_date.map(|d| d.0),
        )?;
        Ok(NewsFilter {
            pagination: PageRequest {
                page: self.page,
                size: self.size,
            }
            .clamp(),
            query: non_blank(self.query),
            categories: merge_list(self.categories, self.categories_bracketed),
            companies: merge_list(self.companies, self.companies_bracketed),
            locations: merge_list(self.locations, self.locations_bracketed),
            published,
        })
    }
}

pub(super) fn router<S>(repo: NewsRepository) -> Router<S> {
    Router::new()
        .route("/listing", get(listing))
        .route("/health", get(health))
        .with_state(repo)
}

async fn listing(
    State(repo): State<NewsRepository>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<NewsListingQuery>, QueryRejection>,
) -> Result<Json<ListingPage<NewsItem>>, ApiError> {
    let Query(query) = query.map_err(|e| map_query_rejection(&req_id.0, &e))?;
    let filter = query.into_filter()?;

    let page = repo
        .listing(&filter)
        .await
        .map_err(|e| map_search_error(&req_id.0, &e, LISTING_FAILED))?;
    Ok(Json(page))
}

async fn health(State(repo): State<NewsRepository>) -> impl IntoResponse {
    health_response(repo.is_healthy().await)
}
