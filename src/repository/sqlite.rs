//! SQLite Repository - local diary store
//!
//! One table keyed by `(owner_id, id)`, with a B-tree index on
//! `(owner_id, created_at)` so month range queries stay O(log n + k).
//!
//! Creation instants are stored as Unix milliseconds. A NULL or out-of-range
//! value loads as an undated record instead of failing the whole fetch.

use crate::diary::{DiaryRecord, NewDiary};
use crate::repository::{new_diary_id, DiaryRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const SELECT_COLUMNS: &str = "SELECT id, title, content, image_ref, created_at FROM diaries";

/// SQLite-backed diary repository
pub struct SqliteRepository {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteRepository {
    /// Create or open the diary database under `data_dir`
    pub fn open(data_dir: &Path) -> RepositoryResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join("photolog.db");

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS diaries (
                id TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                image_ref TEXT,
                created_at INTEGER,
                PRIMARY KEY (owner_id, id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_owner_created ON diaries(owner_id, created_at)",
            [],
        )?;

        tracing::info!(path = %path.display(), "Opened diary store");

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a record with a caller-chosen id and optional date
    ///
    /// Used for imports where the id already exists elsewhere. Replaces only
    /// the owner's own record with that id.
    pub async fn put(&self, owner: &str, record: &DiaryRecord) -> RepositoryResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO diaries (id, owner_id, title, content, image_ref, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                record.id,
                owner,
                record.title,
                record.content,
                record.image_ref,
                record.created_at.map(|at| at.timestamp_millis()),
            ],
        )?;
        Ok(())
    }

    fn query_records(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepositoryResult<Vec<DiaryRecord>> {
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, row_to_record)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<DiaryRecord> {
    let id: String = row.get(0)?;
    let millis: Option<i64> = row.get(4)?;

    let created_at = millis.and_then(|ms| {
        let at = Utc.timestamp_millis_opt(ms).single();
        if at.is_none() {
            tracing::warn!(id = %id, millis = ms, "Unreadable creation time, treating diary as undated");
        }
        at
    });

    Ok(DiaryRecord {
        id,
        title: row.get(1)?,
        content: row.get(2)?,
        image_ref: row.get(3)?,
        created_at,
    })
}

#[async_trait]
impl DiaryRepository for SqliteRepository {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn list(&self, owner: &str) -> RepositoryResult<Vec<DiaryRecord>> {
        let conn = self.conn.lock().await;
        Self::query_records(
            &conn,
            &format!("{} WHERE owner_id = ? ORDER BY created_at DESC, id", SELECT_COLUMNS),
            params![owner],
        )
    }

    fn supports_range_query(&self) -> bool {
        true
    }

    async fn query_range(
        &self,
        owner: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<DiaryRecord>> {
        let conn = self.conn.lock().await;
        Self::query_records(
            &conn,
            &format!(
                "{} WHERE owner_id = ? AND created_at >= ? AND created_at < ?
                 ORDER BY created_at DESC, id",
                SELECT_COLUMNS
            ),
            params![owner, start.timestamp_millis(), end.timestamp_millis()],
        )
    }

    async fn get(&self, owner: &str, id: &str) -> RepositoryResult<Option<DiaryRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(&format!(
            "{} WHERE owner_id = ? AND id = ?",
            SELECT_COLUMNS
        ))?;
        let record = stmt.query_row(params![owner, id], row_to_record).optional()?;
        Ok(record)
    }

    async fn insert(&self, owner: &str, diary: NewDiary) -> RepositoryResult<DiaryRecord> {
        let record = diary.into_record(new_diary_id());
        self.put(owner, &record).await?;
        tracing::debug!(owner, id = %record.id, "Saved diary");
        Ok(record)
    }

    async fn update(
        &self,
        owner: &str,
        id: &str,
        title: &str,
        content: &str,
    ) -> RepositoryResult<DiaryRecord> {
        {
            let conn = self.conn.lock().await;
            let changed = conn.execute(
                "UPDATE diaries SET title = ?, content = ? WHERE owner_id = ? AND id = ?",
                params![title, content, owner, id],
            )?;
            if changed == 0 {
                return Err(RepositoryError::NotFound(id.to_string()));
            }
        }

        self.get(owner, id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn delete(&self, owner: &str, id: &str) -> RepositoryResult<()> {
        let conn = self.conn.lock().await;
        let removed = conn.execute(
            "DELETE FROM diaries WHERE owner_id = ? AND id = ?",
            params![owner, id],
        )?;
        if removed == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        tracing::debug!(owner, id, "Deleted diary");
        Ok(())
    }

    async fn count(&self, owner: &str) -> RepositoryResult<usize> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM diaries WHERE owner_id = ?",
            params![owner],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
