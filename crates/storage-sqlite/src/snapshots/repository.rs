use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::portfolio_snapshots;
use crate::schema::portfolio_snapshots::dsl::*;

use super::model::SnapshotDB;
use papertrade_core::snapshots::{NewSnapshot, PortfolioSnapshot, SnapshotRepositoryTrait};
use papertrade_core::Result;

/// Repository for managing snapshot records in the database
pub struct SnapshotRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository instance
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SnapshotRepositoryTrait for SnapshotRepository {
    /// Inserts a snapshot row. The UNIQUE(portfolio_id, snapshot_date)
    /// index turns a same-day duplicate into a unique violation.
    async fn insert(&self, new_snapshot: NewSnapshot) -> Result<PortfolioSnapshot> {
        self.writer
            .exec(move |conn| {
                let snapshot_db: SnapshotDB = new_snapshot.into();

                diesel::insert_into(portfolio_snapshots::table)
                    .values(&snapshot_db)
                    .execute(conn)
                    .into_core()?;

                Ok(snapshot_db.into())
            })
            .await
    }

    fn list_by_portfolio(&self, portfolio_id_param: &str) -> Result<Vec<PortfolioSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let results = portfolio_snapshots
            .select(SnapshotDB::as_select())
            .filter(portfolio_id.eq(portfolio_id_param))
            .order(snapshot_date.desc())
            .load::<SnapshotDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(PortfolioSnapshot::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::NaiveDate;
    use diesel::RunQueryDsl;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    /// Creates a test repository backed by a temp-file database.
    /// Returns the repository, the pool (for seeding parent rows) and
    /// the temp dir (to keep it alive).
    async fn create_test_repository() -> (SnapshotRepository, Arc<DbPool>, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");

        let writer = spawn_writer((*pool).clone());

        let repo = SnapshotRepository::new(Arc::clone(&pool), writer);
        (repo, pool, temp_dir)
    }

    /// Seeds a user and portfolio row to satisfy foreign key constraints
    fn create_test_portfolio(pool: &Arc<DbPool>, portfolio_id_value: &str) {
        let mut conn = get_connection(pool).expect("Failed to get connection");
        diesel::sql_query(format!(
            "INSERT INTO users (id, username, password_hash, created_at, updated_at) \
             VALUES ('u-{0}', 'user-{0}', 'hash', datetime('now'), datetime('now'))",
            portfolio_id_value
        ))
        .execute(&mut conn)
        .expect("Failed to create test user");
        diesel::sql_query(format!(
            "INSERT INTO portfolios (id, user_id, name, description, cash_balance, created_at, updated_at) \
             VALUES ('{0}', 'u-{0}', 'Test Portfolio', NULL, '10000', datetime('now'), datetime('now'))",
            portfolio_id_value
        ))
        .execute(&mut conn)
        .expect("Failed to create test portfolio");
    }

    fn snapshot_for(portfolio_id_value: &str, date: NaiveDate) -> NewSnapshot {
        NewSnapshot {
            portfolio_id: portfolio_id_value.to_string(),
            snapshot_date: date,
            cash_balance: dec!(9200),
            stock_value: dec!(1200),
            total_value: dec!(10400),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let (repo, pool, _tmp) = create_test_repository().await;
        create_test_portfolio(&pool, "p1");

        let day1 = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2025, 7, 2).unwrap();
        repo.insert(snapshot_for("p1", day1)).await.unwrap();
        repo.insert(snapshot_for("p1", day2)).await.unwrap();

        let history = repo.list_by_portfolio("p1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].snapshot_date, day2);
        assert_eq!(history[1].snapshot_date, day1);
        assert_eq!(history[0].total_value, dec!(10400));
    }

    #[tokio::test]
    async fn test_same_day_duplicate_is_unique_violation() {
        let (repo, pool, _tmp) = create_test_repository().await;
        create_test_portfolio(&pool, "p1");

        let day = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        repo.insert(snapshot_for("p1", day)).await.unwrap();

        let err = repo.insert(snapshot_for("p1", day)).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_missing_portfolio_is_foreign_key_violation() {
        let (repo, _pool, _tmp) = create_test_repository().await;

        let day = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let err = repo.insert(snapshot_for("ghost", day)).await.unwrap_err();
        assert!(matches!(
            err,
            papertrade_core::Error::Database(
                papertrade_core::errors::DatabaseError::ForeignKeyViolation(_)
            )
        ));
    }
}
