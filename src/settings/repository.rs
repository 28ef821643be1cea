//! Options repository.

use sqlx::SqlitePool;

use crate::Result;

/// Repository for key/value options.
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an option value.
    pub async fn get_option(&self, name: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM options WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool)
            .await?;
        Ok(value)
    }

    /// Store an option value.
    ///
    /// Returns `true` when the stored value changed, including when the
    /// option did not exist before.
    pub async fn update_option(&self, name: &str, value: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO options (name, value)
            VALUES ($1, $2)
            ON CONFLICT(name) DO UPDATE
            SET value = excluded.value, updated_at = datetime('now')
            WHERE options.value <> excluded.value
            "#,
        )
        .bind(name)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
