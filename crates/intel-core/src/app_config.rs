use std::collections::BTreeSet;
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// One of the independently deployable read services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceKind {
    News,
    Deals,
    Homepage,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [ServiceKind::News, ServiceKind::Deals, ServiceKind::Homepage];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::News => "news",
            ServiceKind::Deals => "deals",
            ServiceKind::Homepage => "homepage",
        }
    }
}

impl std::str::FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "news" => Ok(ServiceKind::News),
            "deals" => Ok(ServiceKind::Deals),
            "homepage" => Ok(ServiceKind::Homepage),
            other => Err(format!("unknown service '{other}'")),
        }
    }
}

/// The set of services this process mounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSet(BTreeSet<ServiceKind>);

impl ServiceSet {
    #[must_use]
    pub fn all() -> Self {
        Self(ServiceKind::ALL.into_iter().collect())
    }

    #[must_use]
    pub fn only(kinds: &[ServiceKind]) -> Self {
        Self(kinds.iter().copied().collect())
    }

    #[must_use]
    pub fn contains(&self, kind: ServiceKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = ServiceKind> + '_ {
        self.0.iter().copied()
    }
}

/// Where one service's documents live in the search cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    pub index: String,
    /// Legacy mapping type; `None` targets `/{index}/_search` directly.
    pub doc_type: Option<String>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub services: ServiceSet,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub elasticsearch_url: String,
    pub elasticsearch_timeout_secs: u64,
    pub news_index: IndexSettings,
    pub deals_index: IndexSettings,
    pub database_url: Option<String>,
    pub db_command_timeout_secs: u64,
    pub homepage_site_name: String,
    pub homepage_user_type: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("services", &self.services)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("elasticsearch_url", &self.elasticsearch_url)
            .field(
                "elasticsearch_timeout_secs",
                &self.elasticsearch_timeout_secs,
            )
            .field("news_index", &self.news_index)
            .field("deals_index", &self.deals_index)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_command_timeout_secs", &self.db_command_timeout_secs)
            .field("homepage_site_name", &self.homepage_site_name)
            .field("homepage_user_type", &self.homepage_user_type)
            .finish()
    }
}
