//! Postgres repository implementation using Diesel.
//!
//! Exposure events live in a single `exposure_events` table. Filter criteria
//! are compiled into a boxed Diesel query from the same predicate list the
//! local store evaluates in memory.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::db::repository::{ErrorContext, ExposureRepository, RepositoryError, RepositoryResult};
use crate::models::{DateColumn, Dimension, ExposureEvent, FilterCriteria, Predicate, TextColumn};

mod models;
mod schema;

use models::{ExposureRow, NewExposureRow};
use schema::exposure_events;

type PgPool = Pool<ConnectionManager<PgConnection>>;
type BoxedExposureQuery = exposure_events::BoxedQuery<'static, Pg>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

// Stays well under the Postgres bind-parameter limit at 15 columns per row.
const INSERT_CHUNK_SIZE: usize = 1_000;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;
        let defaults = Self::default();

        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
        })
    }

    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
///
/// Cloning is cheap: the pool is shared.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!(
            "postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self { pool })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        Ok(())
    }

    /// Run a blocking Diesel operation on a pooled connection.
    ///
    /// Failures are tagged with `operation` and returned as-is.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation).with_details("get_connection"),
                )
            })?;

            f(&mut conn).map_err(|e| e.with_operation(operation))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new(operation).with_details("spawn_blocking"),
            )
        })?
    }
}

/// Narrow a boxed query by one predicate.
fn apply_predicate(query: BoxedExposureQuery, predicate: Predicate) -> BoxedExposureQuery {
    use exposure_events::dsl;

    match predicate {
        Predicate::TimestampAtLeast(cutoff) => query.filter(dsl::ts.ge(cutoff)),
        Predicate::AirlineIn(codes) => query.filter(dsl::airline.eq_any(codes)),
        Predicate::TextEquals(TextColumn::Origin, value) => query.filter(dsl::origin.eq(value)),
        Predicate::TextEquals(TextColumn::Destination, value) => query.filter(dsl::dest.eq(value)),
        Predicate::TextEquals(TextColumn::TripType, value) => {
            query.filter(dsl::trip_type.eq(value))
        }
        Predicate::TextEquals(TextColumn::Channel, value) => query.filter(dsl::channel.eq(value)),
        Predicate::DateEquals(DateColumn::Departure, date) => {
            query.filter(dsl::departure_date.eq(date))
        }
        Predicate::DateEquals(DateColumn::Arrival, date) => {
            query.filter(dsl::arrival_date.eq(date))
        }
        Predicate::PriceAtLeast(price) => query.filter(dsl::price_krw.ge(price)),
        Predicate::PriceAtMost(price) => query.filter(dsl::price_krw.le(price)),
        Predicate::PriceEquals(price) => query.filter(dsl::price_krw.eq(price)),
    }
}

fn filtered(predicates: Vec<Predicate>) -> BoxedExposureQuery {
    log::debug!("compiling exposure query with {} predicates", predicates.len());
    predicates
        .into_iter()
        .fold(exposure_events::table.into_boxed(), apply_predicate)
}

fn decode_rows(rows: Vec<ExposureRow>) -> RepositoryResult<Vec<ExposureEvent>> {
    rows.into_iter().map(ExposureEvent::try_from).collect()
}

#[async_trait]
impl ExposureRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn fetch_exposures(
        &self,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
    ) -> RepositoryResult<Vec<ExposureEvent>> {
        let predicates = criteria.predicates(cutoff);
        self.with_conn("fetch_exposures", move |conn| {
            let rows = filtered(predicates)
                .order(exposure_events::ts.desc())
                .select(ExposureRow::as_select())
                .load::<ExposureRow>(conn)?;
            decode_rows(rows)
        })
        .await
    }

    async fn fetch_distinct(
        &self,
        dimension: Dimension,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
    ) -> RepositoryResult<Vec<String>> {
        let predicates = criteria.predicates(cutoff);
        self.with_conn("fetch_distinct", move |conn| {
            use exposure_events::dsl;

            let query = filtered(predicates);
            let values = match dimension {
                Dimension::Airline => query.select(dsl::airline).distinct().load::<String>(conn),
                Dimension::Origin => query.select(dsl::origin).distinct().load::<String>(conn),
                Dimension::Destination => query.select(dsl::dest).distinct().load::<String>(conn),
                Dimension::TripType => query.select(dsl::trip_type).distinct().load::<String>(conn),
                Dimension::Channel => query.select(dsl::channel).distinct().load::<String>(conn),
            }?;
            Ok(values.into_iter().filter(|v| !v.is_empty()).collect())
        })
        .await
    }

    async fn fetch_route_pairs(
        &self,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
    ) -> RepositoryResult<Vec<(String, String)>> {
        let predicates = criteria.predicates(cutoff);
        self.with_conn("fetch_route_pairs", move |conn| {
            let pairs = filtered(predicates)
                .select((exposure_events::origin, exposure_events::dest))
                .distinct()
                .load::<(String, String)>(conn)?;
            Ok(pairs)
        })
        .await
    }

    async fn fetch_by_exact_price(
        &self,
        price: i64,
        criteria: &FilterCriteria,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> RepositoryResult<Vec<ExposureEvent>> {
        let mut predicates = criteria.predicates(cutoff);
        predicates.push(Predicate::PriceEquals(price));
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn("fetch_by_exact_price", move |conn| {
            let rows = filtered(predicates)
                .order(exposure_events::ts.desc())
                .limit(limit)
                .select(ExposureRow::as_select())
                .load::<ExposureRow>(conn)?;
            decode_rows(rows)
        })
        .await
    }

    async fn count_exposures(&self, since: Option<DateTime<Utc>>) -> RepositoryResult<u64> {
        self.with_conn("count_exposures", move |conn| {
            let mut query = exposure_events::table.into_boxed();
            if let Some(since) = since {
                query = query.filter(exposure_events::ts.ge(since));
            }
            let count: i64 = query.count().get_result(conn)?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    async fn insert_exposures(&self, events: Vec<ExposureEvent>) -> RepositoryResult<usize> {
        let rows: Vec<NewExposureRow> = events.into_iter().map(NewExposureRow::from).collect();
        self.with_conn("insert_exposures", move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let mut inserted = 0;
                for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
                    inserted += diesel::insert_into(exposure_events::table)
                        .values(chunk)
                        .execute(tx)?;
                }
                Ok(inserted)
            })
        })
        .await
    }
}
