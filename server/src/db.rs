use crate::models::Recipe;
use crate::schema::recipes;
use chrono::{NaiveDateTime, SubsecRound, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use thiserror::Error;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

/// Format used for stored timestamps and for every timestamp in API responses.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::PoolError),

    #[error("failed to run database migrations: {0}")]
    Migration(String),

    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("invalid seed timestamp: {0}")]
    SeedTimestamp(#[from] chrono::ParseError),
}

/// Applied to every pooled connection so concurrent writers wait on the
/// SQLite lock instead of failing with SQLITE_BUSY.
#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
            self.busy_timeout.as_millis()
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

pub fn create_pool(database_url: &str) -> Result<DbPool, DbError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: BUSY_TIMEOUT,
        }))
        .build(manager)?;

    // Run pending migrations on startup
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::Migration(e.to_string()))?;

    Ok(pool)
}

/// Inserts the two starter recipes when the table is empty.
///
/// Must be called once before the server accepts requests. Returns the number
/// of rows inserted, which is zero on every run after the first.
pub fn initialize(pool: &DbPool) -> Result<usize, DbError> {
    let seeds = seed_recipes()?;
    let mut conn = pool.get()?;

    let inserted = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let existing: i64 = recipes::table.count().get_result(conn)?;
        if existing > 0 {
            return Ok(0);
        }

        let mut inserted = 0;
        for seed in &seeds {
            inserted += diesel::insert_into(recipes::table)
                .values(seed)
                .execute(conn)?;
        }
        Ok(inserted)
    })?;

    if inserted > 0 {
        tracing::info!(count = inserted, "seeded recipes table");
    }

    Ok(inserted)
}

/// Current UTC time truncated to whole seconds, matching the stored format.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}

fn seed_recipes() -> Result<Vec<Recipe>, DbError> {
    let curry_at = NaiveDateTime::parse_from_str("2016-01-10 12:10:12", TIMESTAMP_FORMAT)?;
    let omurice_at = NaiveDateTime::parse_from_str("2016-01-11 13:10:12", TIMESTAMP_FORMAT)?;

    Ok(vec![
        Recipe {
            id: 1,
            title: "チキンカレー".to_string(),
            making_time: "45分".to_string(),
            serves: "4人".to_string(),
            ingredients: "玉ねぎ,肉,スパイス".to_string(),
            cost: 1000,
            created_at: curry_at,
            updated_at: curry_at,
        },
        Recipe {
            id: 2,
            title: "オムライス".to_string(),
            making_time: "30分".to_string(),
            serves: "2人".to_string(),
            ingredients: "玉ねぎ,卵,スパイス,醤油".to_string(),
            cost: 700,
            created_at: omurice_at,
            updated_at: omurice_at,
        },
    ])
}

/// Checks out a pooled connection inside a handler, returning a 500 response
/// from the enclosing function when the pool cannot provide one.
#[macro_export]
macro_rules! get_conn {
    ($pool:expr) => {
        match $pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to get database connection: {}", e);
                return $crate::api::internal_error("Database connection failed");
            }
        }
    };
}
