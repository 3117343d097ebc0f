//! Connection pool, migrations and the single-writer actor.

mod write_actor;

pub use write_actor::{spawn_writer, WriteHandle};

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

use crate::errors::StorageError;
use sheetfolio_core::errors::{DatabaseError, Error, Result};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const POOL_SIZE: u32 = 8;

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; PRAGMA busy_timeout = 5000;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Creates the parent directory of `db_path` when missing.
pub fn ensure_db_dir(db_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Database(DatabaseError::ConnectionFailed(format!(
                    "cannot create {}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }
    }
    Ok(())
}

pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    debug!("Creating SQLite pool for {}", db_path);
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .map_err(StorageError::from)?;
    Ok(Arc::new(pool))
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection> {
    Ok(pool.get().map_err(StorageError::from)?)
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = get_connection(pool)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
    if !applied.is_empty() {
        info!("Applied {} migration(s)", applied.len());
    }
    Ok(())
}

/// Opens (creating if needed) the database at `db_path`, migrates it and
/// starts the writer actor. Must be called inside a Tokio runtime.
pub fn init(db_path: &str) -> Result<(Arc<DbPool>, WriteHandle)> {
    ensure_db_dir(db_path)?;
    let pool = create_pool(db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer(pool.as_ref().clone());
    info!("Database ready at {}", db_path);
    Ok((pool, writer))
}
