use super::schema::Database;
use super::types::{InsertReport, ParsedItem, StorageError};

impl Database {
    /// Append one row per item, in order.
    ///
    /// Each insert stands alone: no transaction wraps the batch, and a failed
    /// row is logged and counted without stopping the rest.
    pub async fn insert_items(&self, items: &[ParsedItem]) -> InsertReport {
        let mut report = InsertReport::default();

        for item in items {
            match self.insert_item(item).await {
                Ok(()) => report.inserted += 1,
                Err(e) => {
                    tracing::error!(title = %item.title, link = %item.link, error = %e, "Error inserting data");
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn insert_item(&self, item: &ParsedItem) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO rss_feeds (title, link, description, published) VALUES (?, ?, ?, ?)",
        )
        .bind(&item.title)
        .bind(&item.link)
        .bind(&item.description)
        .bind(&item.published)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Insert)?;
        Ok(())
    }

    /// All rows of `rss_feeds` in insertion order.
    pub async fn items(&self) -> Result<Vec<ParsedItem>, StorageError> {
        sqlx::query_as::<_, ParsedItem>(
            r#"
            SELECT
                COALESCE(title, '') AS title,
                COALESCE(link, '') AS link,
                COALESCE(description, '') AS description,
                COALESCE(published, '') AS published
            FROM rss_feeds
            ORDER BY rowid
        "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}
