//! In-memory diary repository

use crate::diary::{DiaryRecord, NewDiary};
use crate::repository::{new_diary_id, DiaryRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Diary store kept in process memory, keyed by owner
#[derive(Default)]
pub struct MemoryRepository {
    diaries: RwLock<HashMap<String, Vec<DiaryRecord>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-filled with `records` for `owner`
    pub fn with_records(owner: impl Into<String>, records: Vec<DiaryRecord>) -> Self {
        let mut diaries = HashMap::new();
        diaries.insert(owner.into(), records);
        Self {
            diaries: RwLock::new(diaries),
        }
    }

    /// Store an already-identified record, replacing one with the same id
    pub async fn put(&self, owner: &str, record: DiaryRecord) {
        let mut diaries = self.diaries.write().await;
        let entries = diaries.entry(owner.to_string()).or_default();
        match entries.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => entries.push(record),
        }
    }
}

#[async_trait]
impl DiaryRepository for MemoryRepository {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list(&self, owner: &str) -> RepositoryResult<Vec<DiaryRecord>> {
        let diaries = self.diaries.read().await;
        Ok(diaries.get(owner).cloned().unwrap_or_default())
    }

    async fn get(&self, owner: &str, id: &str) -> RepositoryResult<Option<DiaryRecord>> {
        let diaries = self.diaries.read().await;
        Ok(diaries
            .get(owner)
            .and_then(|entries| entries.iter().find(|r| r.id == id).cloned()))
    }

    async fn insert(&self, owner: &str, diary: NewDiary) -> RepositoryResult<DiaryRecord> {
        let record = diary.into_record(new_diary_id());
        self.diaries
            .write()
            .await
            .entry(owner.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        owner: &str,
        id: &str,
        title: &str,
        content: &str,
    ) -> RepositoryResult<DiaryRecord> {
        let mut diaries = self.diaries.write().await;
        let record = diaries
            .get_mut(owner)
            .and_then(|entries| entries.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        record.title = title.to_string();
        record.content = content.to_string();
        Ok(record.clone())
    }

    async fn delete(&self, owner: &str, id: &str) -> RepositoryResult<()> {
        let mut diaries = self.diaries.write().await;
        let entries = diaries
            .get_mut(owner)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        let before = entries.len();
        entries.retain(|r| r.id != id);
        if entries.len() == before {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
