use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::{Query, QueryRejection};
use chrono::{DateTime, Utc};
use intel_core::homepage::{
    self, DEFAULT_FEATURED_LIMIT, DEFAULT_RECENT_LIMIT, MAX_FEATURED_LIMIT, MAX_RECENT_LIMIT,
};
use intel_core::{CarouselItem, FeaturedContentItem, HomePageStatistics, KeyStat, RecentActivityItem};
use intel_db::DynHomepageStore;
use serde::{Deserialize, Serialize};

use super::non_blank;
use crate::middleware::RequestId;

pub(super) const PREFIX: &str = "/api/homepage";
pub(super) const ENDPOINTS: &[&str] = &[
    "/statistics",
    "/featured",
    "/recent-activities",
    "/carousel",
    "/key-stats",
    "/health",
];

const SERVICE_NAME: &str = "ICHomePageData";

/// Store handle plus the defaults applied when a request omits them.
#[derive(Clone)]
pub struct HomepageState {
    pub store: DynHomepageStore,
    pub site_name: String,
    pub user_type: String,
}

/// Homepage responses carry their payload fields alongside `status` and
/// `message`, on success and on failure alike.
#[derive(Debug, Serialize)]
struct Envelope<T> {
    #[serde(flatten)]
    payload: T,
    status: &'static str,
    message: String,
}

type EnvelopeResponse<T> = (StatusCode, Json<Envelope<T>>);

fn success<T>(payload: T, message: &str) -> EnvelopeResponse<T> {
    (
        StatusCode::OK,
        Json(Envelope {
            payload,
            status: "Success",
            message: message.to_string(),
        }),
    )
}

fn failure<T: Default>(status: StatusCode, message: impl Into<String>) -> EnvelopeResponse<T> {
    (
        status,
        Json(Envelope {
            payload: T::default(),
            status: "Error",
            message: message.into(),
        }),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemsPayload<T> {
    items: Vec<T>,
    total_count: usize,
}

impl<T> Default for ItemsPayload<T> {
    fn default() -> Self {
        Vec::new().into()
    }
}

impl<T> From<Vec<T>> for ItemsPayload<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total_count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivitiesPayload {
    activities: Vec<RecentActivityItem>,
    total_count: usize,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsPayload {
    stats: Vec<KeyStat>,
    total_count: usize,
}

#[derive(Debug, Default, Deserialize)]
struct LimitQuery {
    #[serde(alias = "Limit")]
    limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SiteQuery {
    #[serde(alias = "SiteName")]
    site_name: Option<String>,
    #[serde(alias = "UserType")]
    user_type: Option<String>,
}

/// `None` when the requested limit falls outside `1..=max`.
fn checked_limit(requested: Option<i64>, default: u32, max: u32) -> Option<usize> {
    match requested {
        None => usize::try_from(default).ok(),
        Some(limit) if (1..=i64::from(max)).contains(&limit) => usize::try_from(limit).ok(),
        Some(_) => None,
    }
}

fn limit_error(max: u32) -> String {
    format!("Limit must be between 1 and {max}")
}

pub(super) fn router<S>(state: HomepageState) -> Router<S> {
    Router::new()
        .route("/statistics", get(statistics))
        .route("/featured", get(featured))
        .route("/recent-activities", get(recent_activities))
        .route("/carousel", get(carousel))
        .route("/key-stats", get(key_stats))
        .route("/health", get(health))
        .with_state(state)
}

async fn statistics() -> EnvelopeResponse<HomePageStatistics> {
    success(
        homepage::statistics(Utc::now()),
        "Statistics retrieved successfully",
    )
}

async fn featured(
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> EnvelopeResponse<ItemsPayload<FeaturedContentItem>> {
    let requested = query.map(|Query(q)| q.limit);
    let Some(limit) = requested
        .ok()
        .and_then(|limit| checked_limit(limit, DEFAULT_FEATURED_LIMIT, MAX_FEATURED_LIMIT))
    else {
        tracing::warn!(request_id = %req_id.0, "featured limit out of range");
        return failure(StatusCode::BAD_REQUEST, limit_error(MAX_FEATURED_LIMIT));
    };

    let items = homepage::featured_content(Utc::now(), limit);
    success(items.into(), "Featured content retrieved successfully")
}

async fn recent_activities(
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> EnvelopeResponse<ActivitiesPayload> {
    let requested = query.map(|Query(q)| q.limit);
    let Some(limit) = requested
        .ok()
        .and_then(|limit| checked_limit(limit, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT))
    else {
        tracing::warn!(request_id = %req_id.0, "recent activities limit out of range");
        return failure(StatusCode::BAD_REQUEST, limit_error(MAX_RECENT_LIMIT));
    };

    let activities = homepage::recent_activities(Utc::now(), limit);
    success(
        ActivitiesPayload {
            total_count: activities.len(),
            activities,
        },
        "Recent activities retrieved successfully",
    )
}

async fn carousel(
    State(state): State<HomepageState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SiteQuery>, QueryRejection>,
) -> EnvelopeResponse<ItemsPayload<CarouselItem>> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let site_name = non_blank(query.site_name).unwrap_or_else(|| state.site_name.clone());
    let user_type = non_blank(query.user_type).unwrap_or_else(|| state.user_type.clone());

    match state.store.carousel(&site_name, &user_type).await {
        Ok(items) => success(items.into(), "Carousel items retrieved successfully"),
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "carousel query failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve carousel items",
            )
        }
    }
}

async fn key_stats(
    State(state): State<HomepageState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SiteQuery>, QueryRejection>,
) -> EnvelopeResponse<StatsPayload> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let site_name = non_blank(query.site_name).unwrap_or_else(|| state.site_name.clone());

    match state.store.key_stats(&site_name).await {
        Ok(stats) => success(
            StatsPayload {
                total_count: stats.len(),
                stats,
            },
            "Key statistics retrieved successfully",
        ),
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "key stats query failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve key statistics",
            )
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthDetails {
    database: &'static str,
}

#[derive(Debug, Serialize)]
struct HomepageHealth {
    status: &'static str,
    service: &'static str,
    timestamp: DateTime<Utc>,
    version: &'static str,
    details: HealthDetails,
}

async fn health(
    State(state): State<HomepageState>,
    Extension(req_id): Extension<RequestId>,
) -> (StatusCode, Json<HomepageHealth>) {
    let (status, label, database) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "healthy", "Connected"),
        Err(e) => {
            tracing::warn!(request_id = %req_id.0, error = %e, "database health probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "Disconnected")
        }
    };

    (
        status,
        Json(HomepageHealth {
            status: label,
            service: SERVICE_NAME,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            details: HealthDetails { database },
        }),
    )
}
