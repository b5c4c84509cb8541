mod deals;
mod homepage;
mod news;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::QueryRejection;
use chrono::{DateTime, Utc};
use intel_core::ValidationError;
use intel_search::{DealsRepository, NewsRepository, SearchError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id;

pub use homepage::HomepageState;

const SERVICE_NAME: &str = "Intelligence Center API";

/// The backends for each mounted service; `None` leaves the service out.
#[derive(Clone, Default)]
pub struct Services {
    pub news: Option<NewsRepository>,
    pub deals: Option<DealsRepository>,
    pub homepage: Option<HomepageState>,
}

/// Error response for the listing services: `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Logs the full search failure and hides it behind `message`.
pub(super) fn map_search_error(request_id: &str, error: &SearchError, message: &str) -> ApiError {
    tracing::error!(request_id, error = %error, "search query failed");
    ApiError::internal(message)
}

pub(super) fn map_query_rejection(request_id: &str, rejection: &QueryRejection) -> ApiError {
    tracing::warn!(request_id, error = %rejection, "rejected query string");
    ApiError::bad_request(rejection.to_string())
}

/// Joins the plain and bracketed forms of a list parameter, trimming each
/// value and dropping blanks. Values are never split, so names containing
/// commas reach the filter intact.
pub(super) fn merge_list(plain: Vec<String>, bracketed: Vec<String>) -> Vec<String> {
    plain
        .into_iter()
        .chain(bracketed)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Trims free text and drops it when blank.
pub(super) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub(super) struct HealthBody {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

pub(super) fn health_response(healthy: bool) -> (StatusCode, Json<HealthBody>) {
    let (status, label) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };
    (
        status,
        Json(HealthBody {
            status: label,
            timestamp: Utc::now(),
        }),
    )
}

#[derive(Debug, Serialize)]
struct RootBody {
    service: &'static str,
    status: &'static str,
    timestamp: DateTime<Utc>,
    endpoints: Vec<String>,
}

fn endpoint_list(services: &Services) -> Vec<String> {
    let mounted: [(bool, &str, &[&str]); 3] = [
        (services.news.is_some(), news::PREFIX, news::ENDPOINTS),
        (services.deals.is_some(), deals::PREFIX, deals::ENDPOINTS),
        (
            services.homepage.is_some(),
            homepage::PREFIX,
            homepage::ENDPOINTS,
        ),
    ];

    mounted
        .into_iter()
        .filter(|(enabled, _, _)| *enabled)
        .flat_map(|(_, prefix, routes)| routes.iter().map(move |route| format!("{prefix}{route}")))
        .collect()
}

async fn root(State(endpoints): State<Arc<Vec<String>>>) -> Json<RootBody> {
    Json(RootBody {
        service: SERVICE_NAME,
        status: "running",
        timestamp: Utc::now(),
        endpoints: endpoints.as_ref().clone(),
    })
}

pub fn build_app(services: Services) -> Router {
    let endpoints = Arc::new(endpoint_list(&services));

    let mut app = Router::new().route("/", get(root));
    if let Some(repo) = services.news {
        app = app.nest(news::PREFIX, news::router(repo));
    }
    if let Some(repo) = services.deals {
        app = app.nest(deals::PREFIX, deals::router(repo));
    }
    if let Some(state) = services.homepage {
        app = app.nest(homepage::PREFIX, homepage::router(state));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(request_id))
            .layer(TraceLayer::new_for_http()),
    )
    .with_state(endpoints)
}
