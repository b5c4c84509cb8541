//! SQL Server access for the homepage service.
//!
//! Each stored-procedure call opens one connection, runs, and closes it,
//! bounded by the configured command timeout. Rows are reduced to
//! [`record::Record`]s and mapped through the column tables in [`carousel`]
//! and [`key_stats`].

pub mod carousel;
pub mod key_stats;
pub mod record;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use intel_core::{CarouselItem, KeyStat};
use thiserror::Error;
use tiberius::{Client, Config, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::record::Record;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid connection string: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tds(#[from] tiberius::error::Error),
    #[error("database call exceeded {0}s timeout")]
    Timeout(u64),
}

/// Stored-procedure backed homepage data.
#[async_trait]
pub trait HomepageStore: Send + Sync {
    /// Carousel slides ordered by sequence. `site_name` and `user_type` are
    /// recorded for tracing only; the procedure takes no parameters.
    async fn carousel(&self, site_name: &str, user_type: &str)
        -> Result<Vec<CarouselItem>, DbError>;

    async fn key_stats(&self, site_name: &str) -> Result<Vec<KeyStat>, DbError>;

    /// Opens and closes one connection.
    async fn ping(&self) -> Result<(), DbError>;
}

pub type DynHomepageStore = Arc<dyn HomepageStore>;

#[derive(Clone)]
pub struct SqlServerStore {
    config: Config,
    command_timeout: Duration,
}

impl std::fmt::Debug for SqlServerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlServerStore")
            .field("addr", &self.config.get_addr())
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}

impl SqlServerStore {
    /// Parses an ADO.NET-style connection string. No connection is opened.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the connection string cannot be parsed.
    pub fn from_connection_string(
        connection_string: &str,
        command_timeout_secs: u64,
    ) -> Result<Self, DbError> {
        let config = Config::from_ado_string(connection_string)
            .map_err(|e| DbError::Config(e.to_string()))?;
        Ok(Self {
            config,
            command_timeout: Duration::from_secs(command_timeout_secs),
        })
    }

    async fn connect(&self) -> Result<Client<Compat<TcpStream>>, DbError> {
        let tcp = TcpStream::connect(self.config.get_addr()).await?;
        tcp.set_nodelay(true)?;
        let client = Client::connect(self.config.clone(), tcp.compat_write()).await?;
        Ok(client)
    }

    async fn with_timeout<T, F>(&self, work: F) -> Result<T, DbError>
    where
        F: std::future::Future<Output = Result<T, DbError>>,
    {
        tokio::time::timeout(self.command_timeout, work)
            .await
            .map_err(|_| DbError::Timeout(self.command_timeout.as_secs()))?
    }

    async fn run_procedure(
        &self,
        statement: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<Record>, DbError> {
        self.with_timeout(async {
            let mut client = self.connect().await?;
            let rows = client
                .query(statement, params)
                .await?
                .into_first_result()
                .await?;
            client.close().await?;
            Ok(rows.into_iter().map(Record::from_row).collect())
        })
        .await
    }
}

#[async_trait]
impl HomepageStore for SqlServerStore {
    async fn carousel(
        &self,
        site_name: &str,
        user_type: &str,
    ) -> Result<Vec<CarouselItem>, DbError> {
        tracing::info!(
            procedure = carousel::PROCEDURE,
            site_name,
            user_type,
            "executing stored procedure"
        );
        let records = self.run_procedure(carousel::STATEMENT, &[]).await?;
        let rows = records.len();
        let items = carousel::map_rows(records);
        tracing::info!(
            procedure = carousel::PROCEDURE,
            rows,
            mapped = items.len(),
            "carousel items retrieved"
        );
        Ok(items)
    }

    async fn key_stats(&self, site_name: &str) -> Result<Vec<KeyStat>, DbError> {
        tracing::info!(
            procedure = key_stats::PROCEDURE,
            site_name,
            "executing stored procedure"
        );
        let site = site_name.to_string();
        let records = self.run_procedure(key_stats::STATEMENT, &[&site]).await?;
        let rows = records.len();
        let stats = key_stats::map_rows(records);
        tracing::info!(
            procedure = key_stats::PROCEDURE,
            rows,
            mapped = stats.len(),
            "key stats retrieved"
        );
        Ok(stats)
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.with_timeout(async {
            let client = self.connect().await?;
            client.close().await?;
            Ok(())
        })
        .await
    }
}
