//! Counter store backed by an SQLite database file
//!
//! The database is driven through the `sqlite3` command line tool via a
//! [`CommandRunner`], so it lives on whichever host the runner targets.

use crate::adapters::traits::{CommandRunner, CounterStore, RunOptions};
use crate::domain::{ExportError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Table holding one row per counter
const COUNTER_TABLE: &str = "counters";

/// [`CounterStore`] keeping counters in an SQLite table
pub struct SqliteCounterStore {
    runner: Arc<dyn CommandRunner>,
    db_path: PathBuf,
}

impl SqliteCounterStore {
    /// Create a store for the database at `db_path`
    pub fn new(runner: Arc<dyn CommandRunner>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            db_path: db_path.into(),
        }
    }

    /// Path of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Make sure the directory holding the database exists
    pub async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let parent = parent.to_string_lossy();
            self.runner
                .run(&["mkdir", "-p", &*parent], RunOptions::unprivileged())
                .await?;
        }
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<String> {
        let db = self.db_path.to_string_lossy();
        let output = self
            .runner
            .run(&["sqlite3", &*db, sql], RunOptions::unprivileged())
            .await?;
        Ok(output.stdout)
    }
}

/// Counter names are interpolated into SQL, so they are restricted to
/// identifier characters
fn validate_key(key: &str) -> Result<()> {
    static COUNTER_KEY: OnceLock<Regex> = OnceLock::new();
    let re = COUNTER_KEY
        .get_or_init(|| Regex::new(r"\A[A-Za-z0-9_]{1,64}\z").expect("counter key pattern is valid"));
    if re.is_match(key) {
        Ok(())
    } else {
        Err(ExportError::Allocation(format!("invalid counter name '{key}'")))
    }
}

fn parse_counter_value(key: &str, stdout: &str) -> Result<i64> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| ExportError::Allocation(format!("counter '{key}' does not exist")))?
        .parse::<i64>()
        .map_err(|e| {
            ExportError::Allocation(format!(
                "counter '{key}' returned unexpected output {:?}: {e}",
                stdout.trim()
            ))
        })
}

#[async_trait]
impl CounterStore for SqliteCounterStore {
    async fn init_if_absent(&self, key: &str, seed: i64) -> Result<()> {
        validate_key(key)?;
        self.ensure_parent_dir().await?;
        let sql = format!(
            "create table if not exists {COUNTER_TABLE}(key varchar(64) primary key, value integer not null); \
             insert or ignore into {COUNTER_TABLE} values('{key}', {seed});"
        );
        self.execute(&sql).await?;
        tracing::debug!(db = %self.db_path.display(), key, seed, "Counter initialized");
        Ok(())
    }

    async fn increment_and_get(&self, key: &str) -> Result<i64> {
        validate_key(key)?;
        let sql = format!(
            "begin immediate; \
             update {COUNTER_TABLE} set value = value + 1 where key = '{key}'; \
             select value from {COUNTER_TABLE} where key = '{key}'; \
             commit;"
        );
        let stdout = self.execute(&sql).await?;
        parse_counter_value(key, &stdout)
    }
}
