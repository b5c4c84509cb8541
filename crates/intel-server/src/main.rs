mod api;
mod middleware;

use std::sync::Arc;

use anyhow::Context;
use intel_core::{AppConfig, ServiceKind};
use intel_db::SqlServerStore;
use intel_search::{DealsRepository, IndexTarget, NewsRepository, SearchClient};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, HomepageState, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = intel_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let services = build_services(&config)?;
    let enabled: Vec<_> = config.services.iter().map(ServiceKind::as_str).collect();
    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        services = ?enabled,
        "starting intelligence center api"
    );

    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Constructs one backend per enabled service. No connection is opened here;
/// the health endpoints report reachability.
fn build_services(config: &AppConfig) -> anyhow::Result<Services> {
    let wants_search = config.services.contains(ServiceKind::News)
        || config.services.contains(ServiceKind::Deals);
    let search = if wants_search {
        Some(
            SearchClient::new(
                &config.elasticsearch_url,
                config.elasticsearch_timeout_secs,
            )
            .context("failed to build search client")?,
        )
    } else {
        None
    };

    let news = search
        .as_ref()
        .filter(|_| config.services.contains(ServiceKind::News))
        .map(|client| NewsRepository::new(client.clone(), IndexTarget::from(&config.news_index)));
    let deals = search
        .as_ref()
        .filter(|_| config.services.contains(ServiceKind::Deals))
        .map(|client| {
            DealsRepository::new(client.clone(), IndexTarget::from(&config.deals_index))
        });

    let homepage = if config.services.contains(ServiceKind::Homepage) {
        let url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL is required when the homepage service is enabled")?;
        let store = SqlServerStore::from_connection_string(url, config.db_command_timeout_secs)
            .context("failed to parse DATABASE_URL")?;
        Some(HomepageState {
            store: Arc::new(store),
            site_name: config.homepage_site_name.clone(),
            user_type: config.homepage_user_type.clone(),
        })
    } else {
        None
    };

    Ok(Services {
        news,
        deals,
        homepage,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
