use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Postgres, Sqlite};
use std::str::FromStr;

use super::errors::StorageError;

/// Connection to the relational store backing users, sessions and 2FA secrets.
///
/// Cloning is cheap: both variants wrap an `Arc`-backed sqlx pool.
#[derive(Clone, Debug)]
pub enum DataStore {
    Sqlite(Pool<Sqlite>),
    Postgres(Pool<Postgres>),
}

impl DataStore {
    /// Connect to `sqlite:…` or `postgres://…` urls.
    ///
    /// In-memory SQLite databases are pinned to a single long-lived connection,
    /// since every new connection would otherwise open an empty database.
    #[tracing::instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        if url.starts_with("sqlite:") {
            let opts = SqliteConnectOptions::from_str(url)?
                .create_if_missing(true)
                .foreign_keys(true);

            let pool_opts = if url.contains(":memory:") || url.contains("mode=memory") {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
            } else {
                SqlitePoolOptions::new()
            };

            let pool = pool_opts.connect_with(opts).await?;
            tracing::info!("Connected to database: type=sqlite");
            Ok(Self::Sqlite(pool))
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            let pool = PgPoolOptions::new().connect(url).await?;
            tracing::info!("Connected to database: type=postgres");
            Ok(Self::Postgres(pool))
        } else {
            let scheme = url.split(':').next().unwrap_or_default().to_string();
            Err(StorageError::UnsupportedUrl(scheme))
        }
    }

    pub fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        match self {
            Self::Sqlite(pool) => Some(pool),
            Self::Postgres(_) => None,
        }
    }

    pub fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        match self {
            Self::Sqlite(_) => None,
            Self::Postgres(pool) => Some(pool),
        }
    }
}
