//! Shared domain types and configuration for the intelligence center services.
//!
//! Holds the request rules every service applies before touching a backend
//! (page/size clamping, range validation), the DTOs returned to callers and
//! the environment-driven [`AppConfig`].

pub mod aggregation;
pub mod app_config;
pub mod config;
pub mod deals;
pub mod homepage;
pub mod listing;
pub mod news;

use thiserror::Error;

pub use aggregation::{AggregationBucket, DealDimension};
pub use app_config::{AppConfig, Environment, IndexSettings, ServiceKind, ServiceSet};
pub use config::{load_app_config, load_app_config_from_env};
pub use deals::{DealItem, DealsFilter};
pub use homepage::{CarouselItem, FeaturedContentItem, HomePageStatistics, KeyStat, RecentActivityItem};
pub use listing::{DateRange, ListingPage, PageRequest, Pagination, QueryDate, ValueRange};
pub use news::{NewsFilter, NewsItem};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Request input that is well-formed but semantically unusable.
///
/// Raised before any backend call; callers surface the message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("fromDate cannot be greater than toDate")]
    InvertedDateRange,

    #[error("minValue cannot be greater than maxValue")]
    InvertedValueRange,
}
