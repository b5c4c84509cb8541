use rust_decimal::Decimal;
use serde::Serialize;

/// A categorical deal attribute that can be bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealDimension {
    Country,
    Type,
    Status,
}

impl DealDimension {
    pub const ALL: [DealDimension; 3] = [
        DealDimension::Country,
        DealDimension::Type,
        DealDimension::Status,
    ];

    /// Keyword field the terms aggregation runs over.
    #[must_use]
    pub fn field(self) -> &'static str {
        match self {
            DealDimension::Country => "dealCountryvalue.keyword",
            DealDimension::Type => "dealType.keyword",
            DealDimension::Status => "dealStatus.keyword",
        }
    }

    /// Maximum number of buckets requested from the search cluster.
    #[must_use]
    pub fn bucket_cap(self) -> u32 {
        match self {
            DealDimension::Country => 250,
            DealDimension::Type => 100,
            DealDimension::Status => 50,
        }
    }

    /// Name of the aggregation inside the search request and response.
    #[must_use]
    pub fn aggregation_name(self) -> &'static str {
        match self {
            DealDimension::Country => "by_country",
            DealDimension::Type => "by_type",
            DealDimension::Status => "by_status",
        }
    }

    /// Key the bucket list is returned under.
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            DealDimension::Country => "countries",
            DealDimension::Type => "types",
            DealDimension::Status => "statuses",
        }
    }
}

impl std::fmt::Display for DealDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DealDimension::Country => "country",
            DealDimension::Type => "type",
            DealDimension::Status => "status",
        };
        f.write_str(name)
    }
}

/// One group of deals sharing a dimension value.
///
/// `volume` counts distinct deal ids in the bucket; `value` is the raw sum of
/// deal values over every matched document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationBucket {
    pub key: String,
    pub volume: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}
