//! Elasticsearch access for the news and deals listings.
//!
//! One [`SearchClient`] is built per process and cloned into each
//! repository. Repositories translate validated filters into search bodies,
//! execute them once and map hits and aggregation buckets into the DTOs
//! defined in `intel-core`.

pub mod client;
pub mod deals;
pub mod error;
pub mod news;
pub mod query;
pub mod response;

pub use client::{IndexTarget, SearchClient};
pub use deals::DealsRepository;
pub use error::SearchError;
pub use news::NewsRepository;
