//! Diary Repositories
//!
//! The record source the index consumes. Every diary belongs to one owner;
//! repositories never mix records across owners.
//!
//! - **MemoryRepository**: in-process store, used by tests and demos
//! - **SqliteRepository**: local SQLite store with native month range queries
//!
//! Transport concerns (timeouts, retries, auth) belong to the implementation;
//! callers only see `RepositoryError`.

mod error;
mod memory;
mod sqlite;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

use crate::diary::{DiaryRecord, NewDiary};
use crate::index::sort_most_recent_first;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Common trait for all diary record sources
#[async_trait]
pub trait DiaryRepository: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// All diaries of `owner`, in no particular order
    async fn list(&self, owner: &str) -> RepositoryResult<Vec<DiaryRecord>>;

    /// Whether `query_range` is answered by the store itself
    fn supports_range_query(&self) -> bool {
        false
    }

    /// Diaries created in `[start, end)`, most recent first
    ///
    /// The default implementation filters `list` client-side.
    async fn query_range(
        &self,
        owner: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<DiaryRecord>> {
        let mut records: Vec<DiaryRecord> = self
            .list(owner)
            .await?
            .into_iter()
            .filter(|r| matches!(r.created_at, Some(at) if at >= start && at < end))
            .collect();
        sort_most_recent_first(&mut records);
        Ok(records)
    }

    /// A single diary by id
    async fn get(&self, owner: &str, id: &str) -> RepositoryResult<Option<DiaryRecord>>;

    /// Save a new diary; the repository assigns its id
    async fn insert(&self, owner: &str, diary: NewDiary) -> RepositoryResult<DiaryRecord>;

    /// Replace title and content of an existing diary
    async fn update(
        &self,
        owner: &str,
        id: &str,
        title: &str,
        content: &str,
    ) -> RepositoryResult<DiaryRecord>;

    /// Remove a diary
    async fn delete(&self, owner: &str, id: &str) -> RepositoryResult<()>;

    /// Number of diaries of `owner`
    async fn count(&self, owner: &str) -> RepositoryResult<usize> {
        Ok(self.list(owner).await?.len())
    }
}

/// Generate an id for a newly saved diary
pub(crate) fn new_diary_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
