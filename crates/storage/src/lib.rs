use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::User;

/// Key holding the single registered account as JSON.
pub const USER_KEY: &str = "pollen_user";
/// Key holding the email of the account that is currently logged in.
pub const LOGGED_IN_KEY: &str = "pollen_logged_in_email";

const MEMORY_URL: &str = "sqlite::memory:";

/// Persistence seam for the single-account model.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn load_user(&self) -> Result<Option<User>>;

    async fn save_user(&self, user: &User) -> Result<()>;

    async fn logged_in_email(&self) -> Result<Option<String>>;

    /// `None` clears the marker.
    async fn set_logged_in_email(&self, email: Option<&str>) -> Result<()>;
}

/// SQLite-backed key/value store standing in for browser local storage.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `sqlite::memory:` opens its own database, so the
        // pool must hold exactly one connection and never recycle it.
        let pool_options = if database_url.starts_with(MEMORY_URL) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read local storage key '{key}'"))?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_storage (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write local storage key '{key}'"))?;
        debug!(key, "local storage item written");
        Ok(())
    }

    pub async fn remove_item(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to remove local storage key '{key}'"))?;
        debug!(key, "local storage item removed");
        Ok(())
    }
}

#[async_trait]
impl AccountStore for Storage {
    async fn load_user(&self) -> Result<Option<User>> {
        let Some(raw) = self.get_item(USER_KEY).await? else {
            return Ok(None);
        };
        // A record that no longer parses is treated as absent.
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                debug!(error = %err, "ignoring unreadable stored user");
                Ok(None)
            }
        }
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let raw = serde_json::to_string(user).context("failed to encode user record")?;
        self.set_item(USER_KEY, &raw).await
    }

    async fn logged_in_email(&self) -> Result<Option<String>> {
        self.get_item(LOGGED_IN_KEY).await
    }

    async fn set_logged_in_email(&self, email: Option<&str>) -> Result<()> {
        match email {
            Some(email) if !email.is_empty() => self.set_item(LOGGED_IN_KEY, email).await,
            _ => self.remove_item(LOGGED_IN_KEY).await,
        }
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with(MEMORY_URL) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
