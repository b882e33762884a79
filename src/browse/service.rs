//! Browse Service
//!
//! Drives a shared `DiaryNavigator` from a `DiaryRepository`. The lock is
//! only held to take a ticket and to apply a result, never across the fetch,
//! so overlapping refreshes are allowed and resolved by ticket order.

use crate::browse::{DiaryNavigator, RefreshOutcome};
use crate::diary::{Calendar, DiaryRecord, YearMonth};
use crate::repository::{DiaryRepository, RepositoryResult};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Repository-backed browsing for one owner
pub struct BrowseService {
    repository: Arc<dyn DiaryRepository>,
    owner: String,
    navigator: Arc<RwLock<DiaryNavigator>>,
}

impl BrowseService {
    /// Create a service with an empty navigator
    pub fn new(
        repository: Arc<dyn DiaryRepository>,
        owner: impl Into<String>,
        calendar: Calendar,
    ) -> Self {
        Self {
            repository,
            owner: owner.into(),
            navigator: Arc::new(RwLock::new(DiaryNavigator::new(calendar))),
        }
    }

    /// Owner whose diaries are browsed
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Shared navigator state, for UI bindings
    pub fn navigator(&self) -> Arc<RwLock<DiaryNavigator>> {
        Arc::clone(&self.navigator)
    }

    /// Fetch all diaries and rebuild the index
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.navigator.write().await.begin_refresh();
        let started = Instant::now();

        let result = self.repository.list(&self.owner).await;
        let fetched = result.as_ref().map(Vec::len).ok();

        let outcome = self.navigator.write().await.apply_refresh(ticket, result);

        match &outcome {
            RefreshOutcome::Applied(selection) => tracing::info!(
                repository = self.repository.name(),
                owner = %self.owner,
                ticket = ticket.sequence(),
                records = fetched.unwrap_or(0),
                duration_ms = started.elapsed().as_millis() as u64,
                ?selection,
                "Diary index refreshed"
            ),
            RefreshOutcome::Stale => tracing::debug!(
                owner = %self.owner,
                ticket = ticket.sequence(),
                "Refresh superseded by a newer fetch"
            ),
            RefreshOutcome::Failed(e) => tracing::warn!(
                repository = self.repository.name(),
                owner = %self.owner,
                error = %e,
                "Diary refresh failed"
            ),
        }

        outcome
    }

    /// Records of the selected month, most recent first
    ///
    /// Uses the repository's range query when it has a native one, otherwise
    /// filters the fetched records. Without a selection nothing is queried.
    pub async fn load_selection(&self) -> RepositoryResult<Vec<DiaryRecord>> {
        let (selected, calendar) = {
            let nav = self.navigator.read().await;
            (nav.current_selection(), nav.calendar())
        };

        let ym = match selected {
            Some(ym) => ym,
            None => return Ok(Vec::new()),
        };

        if self.repository.supports_range_query() {
            if let Some((start, end)) = ym.bounds(calendar) {
                return self.repository.query_range(&self.owner, start, end).await;
            }
        }

        Ok(self.navigator.read().await.records_in_selection())
    }

    /// Switch year and return the newly selected month's records
    pub async fn select_year(&self, year: i32) -> Vec<DiaryRecord> {
        self.navigator.write().await.select_year(year)
    }

    /// Switch month and return the newly selected month's records
    pub async fn select_month(&self, month: u32) -> Vec<DiaryRecord> {
        self.navigator.write().await.select_month(month)
    }

    /// Jump to a month; an empty month falls back to the latest
    pub async fn select(&self, ym: YearMonth) -> Vec<DiaryRecord> {
        self.navigator.write().await.select(ym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::NewDiary;
    use crate::repository::{MemoryRepository, RepositoryError, SqliteRepository};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Gate = oneshot::Receiver<RepositoryResult<Vec<DiaryRecord>>>;

    /// Each `list` call waits on the next gate, in call order
    struct GatedRepository {
        gates: Mutex<VecDeque<Gate>>,
        calls: AtomicUsize,
    }

    impl GatedRepository {
        fn new(gates: Vec<Gate>) -> Self {
            Self {
                gates: Mutex::new(gates.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DiaryRepository for GatedRepository {
        fn name(&self) -> &str {
            "gated"
        }

        async fn list(&self, _owner: &str) -> RepositoryResult<Vec<DiaryRecord>> {
            let gate = self.gates.lock().unwrap().pop_front().expect("no gate left");
            self.calls.fetch_add(1, Ordering::SeqCst);
            gate.await
                .unwrap_or_else(|_| Err(RepositoryError::Transport("gate dropped".into())))
        }

        async fn get(&self, _: &str, _: &str) -> RepositoryResult<Option<DiaryRecord>> {
            Ok(None)
        }

        async fn insert(&self, _: &str, _: NewDiary) -> RepositoryResult<DiaryRecord> {
            Err(RepositoryError::Storage("read-only".into()))
        }

        async fn update(&self, _: &str, id: &str, _: &str, _: &str) -> RepositoryResult<DiaryRecord> {
            Err(RepositoryError::NotFound(id.into()))
        }

        async fn delete(&self, _: &str, id: &str) -> RepositoryResult<()> {
            Err(RepositoryError::NotFound(id.into()))
        }
    }

    fn record(id: &str, y: i32, m: u32, d: u32) -> DiaryRecord {
        DiaryRecord::new(id, id, "").created_at(Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap())
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    async fn wait_for_calls(repo: &GatedRepository, n: usize) {
        while repo.calls() < n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_slow_older_fetch_does_not_overwrite_newer() {
        let (tx_old, rx_old) = oneshot::channel();
        let (tx_new, rx_new) = oneshot::channel();
        let repo = Arc::new(GatedRepository::new(vec![rx_old, rx_new]));
        let service = Arc::new(BrowseService::new(repo.clone(), "alice", Calendar::Utc));

        let older = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.refresh().await }
        });
        wait_for_calls(&repo, 1).await;

        let newer = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.refresh().await }
        });
        wait_for_calls(&repo, 2).await;

        tx_new.send(Ok(vec![record("new", 2025, 3, 2)])).unwrap();
        assert!(newer.await.unwrap().is_applied());

        tx_old.send(Ok(vec![record("old", 2020, 1, 1)])).unwrap();
        assert!(matches!(older.await.unwrap(), RefreshOutcome::Stale));

        let nav = service.navigator();
        let nav = nav.read().await;
        assert_eq!(nav.years(), vec![2025]);
        assert_eq!(nav.current_selection(), Some(ym(2025, 3)));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_index() {
        let (tx_ok, rx_ok) = oneshot::channel();
        let (tx_err, rx_err) = oneshot::channel();
        let repo = Arc::new(GatedRepository::new(vec![rx_ok, rx_err]));
        let service = BrowseService::new(repo, "alice", Calendar::Utc);

        tx_ok.send(Ok(vec![record("jan", 2025, 1, 15)])).unwrap();
        assert!(service.refresh().await.is_applied());

        tx_err
            .send(Err(RepositoryError::Transport("offline".into())))
            .unwrap();
        assert!(matches!(service.refresh().await, RefreshOutcome::Failed(_)));

        let shown = service.load_selection().await.unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, "jan");
    }

    #[tokio::test]
    async fn test_memory_repository_filters_client_side() {
        let repo = Arc::new(MemoryRepository::with_records(
            "alice",
            vec![
                record("jan", 2025, 1, 15),
                record("mar", 2025, 3, 2),
                record("dec", 2024, 12, 20),
            ],
        ));
        let service = BrowseService::new(repo, "alice", Calendar::Utc);

        assert!(service.load_selection().await.unwrap().is_empty());

        service.refresh().await;
        let shown = service.load_selection().await.unwrap();
        assert_eq!(shown[0].id, "mar");

        let shown = service.select_year(2024).await;
        assert_eq!(shown[0].id, "dec");
        let shown = service.select_month(12).await;
        assert_eq!(shown[0].id, "dec");
    }

    #[tokio::test]
    async fn test_sqlite_repository_uses_range_query() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(SqliteRepository::open(dir.path()).unwrap());
        for r in [
            record("jun", 2025, 6, 1),
            record("jun-late", 2025, 6, 30),
            record("jul", 2025, 7, 1),
        ] {
            repo.put("alice", &r).await.unwrap();
        }

        let service = BrowseService::new(repo.clone(), "alice", Calendar::Utc);
        service.refresh().await;
        service.select_month(6).await;

        let shown = service.load_selection().await.unwrap();
        let ids: Vec<_> = shown.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["jun-late", "jun"]);
    }
}
