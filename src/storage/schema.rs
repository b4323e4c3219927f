use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use std::path::Path;

use super::types::StorageError;

// ============================================================================
// Database
// ============================================================================

/// Handle to the single-file item store.
///
/// Backed by a one-connection pool: the pipeline is sequential and the
/// handle lives for a single feed's save.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open the database file, creating it if absent.
    ///
    /// Does not touch the schema; call [`Database::ensure_schema`] next.
    /// Rollback journaling keeps the store a single file: no `-wal`/`-shm`
    /// companions are left next to it.
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(StorageError::Open)?;

        tracing::debug!(path = %path.display(), "Opened database");
        Ok(Self { pool })
    }

    /// Create the `rss_feeds` table if it does not exist yet.
    ///
    /// No keys, no indexes: the table is an append-only journal.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rss_feeds (
                title TEXT,
                link TEXT,
                description TEXT,
                published TEXT
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StorageError::Schema)?;

        Ok(())
    }

    /// Release the connection and the file.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_db(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "primus_schema_test_{}_{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("primus.db");
        std::fs::remove_file(&path).ok();
        path
    }

    #[tokio::test]
    async fn test_open_creates_missing_file() {
        let path = scratch_db("creates");
        assert!(!path.exists());

        let db = Database::open(&path).await.unwrap();
        db.close().await;

        assert!(path.exists());
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let path = scratch_db("idempotent");

        let db = Database::open(&path).await.unwrap();
        db.ensure_schema().await.unwrap();
        db.ensure_schema().await.unwrap();

        let columns: Vec<(String, String)> =
            sqlx::query_as("SELECT name, type FROM pragma_table_info('rss_feeds') ORDER BY cid")
                .fetch_all(&db.pool)
                .await
                .unwrap();
        db.close().await;

        assert_eq!(
            columns,
            vec![
                ("title".to_string(), "TEXT".to_string()),
                ("link".to_string(), "TEXT".to_string()),
                ("description".to_string(), "TEXT".to_string()),
                ("published".to_string(), "TEXT".to_string()),
            ]
        );
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_database_stays_a_single_file() {
        let path = scratch_db("single_file");

        let db = Database::open(&path).await.unwrap();
        db.ensure_schema().await.unwrap();
        sqlx::query("INSERT INTO rss_feeds (title) VALUES ('A')")
            .execute(&db.pool)
            .await
            .unwrap();

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(mode, "delete");

        let dir = path.parent().unwrap();
        assert!(!dir.join("primus.db-wal").exists());
        assert!(!dir.join("primus.db-shm").exists());

        db.close().await;
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_open_fails_in_missing_directory() {
        let path = std::env::temp_dir()
            .join("primus_schema_test_no_such_dir")
            .join("nested")
            .join("primus.db");

        let result = Database::open(&path).await;
        assert!(matches!(result, Err(StorageError::Open(_))));
    }
}
