//! Homepage payloads.
//!
//! Statistics, featured content and recent activity are served from a fixed
//! catalogue stamped relative to the request time. Carousel entries and key
//! stats come from stored procedures (see the `intel-db` crate).

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePageStatistics {
    pub total_news_articles: i64,
    pub total_deals: i64,
    pub total_reports: i64,
    pub total_clinical_trials: i64,
    pub total_companies: i64,
    pub total_investigators: i64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedContentItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub content_type: String,
    pub url: String,
    pub published_date: DateTime<Utc>,
    pub category: String,
    pub priority: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivityItem {
    pub id: i32,
    pub activity_type: String,
    pub title: String,
    pub description: String,
    pub activity_date: DateTime<Utc>,
    pub source: String,
    pub url: String,
}

/// One homepage carousel slide. URL-bearing fields keep the column casing the
/// dashboard already consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    pub carousel_id: i64,
    pub carousel_name: String,
    #[serde(rename = "carouselImageURL")]
    pub carousel_image_url: String,
    pub carousel_link_text: String,
    #[serde(rename = "carouselURL")]
    pub carousel_url: String,
    pub carousel_description: String,
    pub carousel_sequence: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyStat {
    pub name: String,
    pub value: i64,
}

pub const MAX_FEATURED_LIMIT: u32 = 50;
pub const DEFAULT_FEATURED_LIMIT: u32 = 10;
pub const MAX_RECENT_LIMIT: u32 = 100;
pub const DEFAULT_RECENT_LIMIT: u32 = 20;

#[must_use]
pub fn statistics(now: DateTime<Utc>) -> HomePageStatistics {
    HomePageStatistics {
        total_news_articles: 7_700_000,
        total_deals: 2_600_000,
        total_reports: 91_580,
        total_clinical_trials: 282_194,
        total_companies: 453_516,
        total_investigators: 226_032,
        last_updated: now,
    }
}

/// Featured catalogue in priority order, truncated to `limit`.
#[must_use]
pub fn featured_content(now: DateTime<Utc>, limit: usize) -> Vec<FeaturedContentItem> {
    let entry = |id: i32,
                 title: &str,
                 description: &str,
                 content_type: &str,
                 url: &str,
                 age: Duration,
                 category: &str| FeaturedContentItem {
        id,
        title: title.to_string(),
        description: description.to_string(),
        content_type: content_type.to_string(),
        url: url.to_string(),
        published_date: now - age,
        category: category.to_string(),
        priority: id,
        is_active: true,
    };

    let mut items = vec![
        entry(
            1,
            "Global Pharmaceutical Market Analysis 2024",
            "Comprehensive analysis of the global pharmaceutical market trends and forecasts",
            "Report",
            "/reports/pharma-market-2024",
            Duration::days(2),
            "Pharmaceuticals",
        ),
        entry(
            2,
            "Major M&A Deal in Biotech Sector",
            "Analysis of the recent $5.2B acquisition in the biotechnology sector",
            "Deal",
            "/deals/biotech-ma-2024",
            Duration::days(1),
            "Biotechnology",
        ),
        entry(
            3,
            "COVID-19 Vaccine Development Updates",
            "Latest developments in COVID-19 vaccine research and clinical trials",
            "News",
            "/news/covid-vaccine-updates",
            Duration::hours(6),
            "Healthcare",
        ),
    ];
    items.truncate(limit);
    items
}

/// Recent activity feed, newest first, truncated to `limit`.
#[must_use]
pub fn recent_activities(now: DateTime<Utc>, limit: usize) -> Vec<RecentActivityItem> {
    let entry = |id: i32,
                 activity_type: &str,
                 title: &str,
                 description: &str,
                 age: Duration,
                 source: &str,
                 url: &str| RecentActivityItem {
        id,
        activity_type: activity_type.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        activity_date: now - age,
        source: source.to_string(),
        url: url.to_string(),
    };

    let mut items = vec![
        entry(
            1,
            "News",
            "FDA Approves New Cancer Treatment",
            "Revolutionary cancer treatment receives FDA approval after successful Phase III trials",
            Duration::minutes(30),
            "FDA Press Release",
            "/news/fda-cancer-approval",
        ),
        entry(
            2,
            "Deal",
            "Venture Capital Investment in AI Healthcare",
            "$50M Series B funding for AI-powered diagnostic platform",
            Duration::hours(2),
            "Investment News",
            "/deals/ai-healthcare-funding",
        ),
        entry(
            3,
            "Report",
            "Quarterly Market Intelligence Report",
            "Q4 2024 market intelligence report now available",
            Duration::hours(4),
            "GlobalData Research",
            "/reports/q4-2024-intelligence",
        ),
    ];
    items.truncate(limit);
    items
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn statistics_are_stamped_with_request_time() {
        let stats = statistics(now());
        assert_eq!(stats.total_news_articles, 7_700_000);
        assert_eq!(stats.total_investigators, 226_032);
        assert_eq!(stats.last_updated, now());
    }

    #[test]
    fn featured_content_is_in_priority_order() {
        let items = featured_content(now(), 10);
        assert_eq!(items.len(), 3);
        let priorities: Vec<_> = items.iter().map(|i| i.priority).collect();
        assert_eq!(priorities, [1, 2, 3]);
        assert_eq!(items[0].published_date, now() - Duration::days(2));
        assert!(items.iter().all(|i| i.is_active));
    }

    #[test]
    fn featured_content_respects_limit() {
        let items = featured_content(now(), 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content_type, "Report");
    }

    #[test]
    fn recent_activities_are_newest_first() {
        let items = recent_activities(now(), 20);
        assert_eq!(items.len(), 3);
        assert!(items
            .windows(2)
            .all(|pair| pair[0].activity_date > pair[1].activity_date));
        assert_eq!(recent_activities(now(), 2).len(), 2);
    }

    #[test]
    fn carousel_item_keeps_url_column_casing() {
        let item = CarouselItem {
            carousel_image_url: "/img/a.png".to_string(),
            carousel_url: "/a".to_string(),
            ..CarouselItem::default()
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["carouselImageURL"], "/img/a.png");
        assert_eq!(json["carouselURL"], "/a");
        assert_eq!(json["carouselSequence"], 0);
    }
}
