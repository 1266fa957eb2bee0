//! Database initialization, pooling and migrations.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{error, info};

use papertrade_core::errors::{DatabaseError, Error, Result};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

// journal_mode is persisted in the database file, so it is set once at
// init. The other pragmas are connection-scoped and must be reapplied
// on every pooled connection.
const INIT_PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA foreign_keys = ON;
    PRAGMA busy_timeout = 30000;
    PRAGMA synchronous = NORMAL;
";

const CONNECTION_PRAGMAS: &str = "
    PRAGMA foreign_keys = ON;
    PRAGMA busy_timeout = 30000;
    PRAGMA synchronous = NORMAL;
";

pub use papertrade_core::db::{DbConnection, DbPool, DbTransactionExecutor};

pub mod write_actor;
pub use write_actor::{spawn_writer, WriteHandle};

/// Resolves the database file location. `DATABASE_URL` wins when set,
/// otherwise the file lives under the application data directory.
pub fn get_db_path(app_data_dir: &str) -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        Path::new(app_data_dir)
            .join("papertrade.db")
            .to_string_lossy()
            .into_owned()
    })
}

/// Creates the database file and its parent directory on first run and
/// switches the file to WAL before any pooled connection touches it.
pub fn init(app_data_dir: &str) -> Result<String> {
    let db_path = get_db_path(app_data_dir);

    if let Some(dir) = Path::new(&db_path).parent() {
        fs::create_dir_all(dir)?;
    }

    let mut conn = SqliteConnection::establish(&db_path)
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
    conn.batch_execute(INIT_PRAGMAS)
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    Ok(db_path)
}

pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let pool = r2d2::Pool::builder()
        .max_size(8)
        .min_idle(Some(1))
        .connection_timeout(Duration::from_secs(30))
        .connection_customizer(Box::new(PragmaCustomizer))
        .build(ConnectionManager::<SqliteConnection>::new(db_path))
        .map_err(|e| DatabaseError::PoolCreationFailed(e.to_string()))?;
    Ok(Arc::new(pool))
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = get_connection(pool)?;

    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
        error!("migration run failed: {e}");
        Error::Database(DatabaseError::MigrationFailed(e.to_string()))
    })?;

    if applied.is_empty() {
        info!("database schema is up to date");
    } else {
        let versions: Vec<String> = applied.iter().map(ToString::to_string).collect();
        info!("applied migrations: {}", versions.join(", "));
    }

    Ok(())
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection> {
    pool.get()
        .map_err(|e| Error::Database(DatabaseError::ConnectionFailed(e.to_string())))
}

#[derive(Debug)]
struct PragmaCustomizer;

impl r2d2::CustomizeConnection<SqliteConnection, r2d2::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
        conn.batch_execute(CONNECTION_PRAGMAS)
            .map_err(r2d2::Error::QueryError)
    }
}
