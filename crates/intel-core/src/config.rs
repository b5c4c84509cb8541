use crate::app_config::{AppConfig, Environment, IndexSettings, ServiceKind, ServiceSet};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("INTEL_ENV", "development"))?;
    let services = parse_services(&or_default("INTEL_SERVICES", "all"))?;

    let bind_addr = or_default("INTEL_BIND_ADDR", "0.0.0.0:5215")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("INTEL_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("INTEL_LOG_LEVEL", "info");

    let elasticsearch_url = or_default("ELASTICSEARCH_URL", "http://localhost:9200");
    let elasticsearch_timeout_secs = parse_u64("ELASTICSEARCH_TIMEOUT_SECS", "30")?;

    let news_index = IndexSettings {
        index: or_default("NEWS_INDEX", "intelligencecenter"),
        doc_type: optional("NEWS_DOC_TYPE"),
    };
    // Deals were historically stored under the `deals` mapping type; an
    // explicitly empty value opts out of it.
    let deals_doc_type = match lookup("DEALS_DOC_TYPE") {
        Ok(raw) if raw.trim().is_empty() => None,
        Ok(raw) => Some(raw.trim().to_string()),
        Err(_) => Some("deals".to_string()),
    };
    let deals_index = IndexSettings {
        index: or_default("DEALS_INDEX", "intelligencecenter"),
        doc_type: deals_doc_type,
    };

    let database_url = optional("DATABASE_URL");
    if services.contains(ServiceKind::Homepage) && database_url.is_none() {
        return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
    }
    let db_command_timeout_secs = parse_u64("DB_COMMAND_TIMEOUT_SECS", "30")?;

    let homepage_site_name = or_default("HOMEPAGE_SITE_NAME", "Canadean Intelligence Center");
    let homepage_user_type = or_default("HOMEPAGE_USER_TYPE", "GlobalDataConsumer");

    Ok(AppConfig {
        env,
        services,
        bind_addr,
        log_level,
        elasticsearch_url,
        elasticsearch_timeout_secs,
        news_index,
        deals_index,
        database_url,
        db_command_timeout_secs,
        homepage_site_name,
        homepage_user_type,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "INTEL_ENV".to_string(),
            reason: format!("expected development, test or production, got '{other}'"),
        }),
    }
}

/// Parse `INTEL_SERVICES`: `all` or a comma-separated list of service names.
fn parse_services(raw: &str) -> Result<ServiceSet, ConfigError> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(ServiceSet::all());
    }

    let kinds = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<ServiceKind>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "INTEL_SERVICES".to_string(),
            reason,
        })?;

    if kinds.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "INTEL_SERVICES".to_string(),
            reason: "at least one service must be enabled".to_string(),
        });
    }

    Ok(ServiceSet::only(&kinds))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
