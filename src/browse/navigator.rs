//! Diary Navigator - year/month browsing state for a UI shell
//!
//! Owns the fetched record set, its bucket index and the resolved selection.
//! Every change goes through `SelectionResolver`, so the selection always
//! names a populated month (or `NoData`).
//!
//! Refreshes are ticketed: `begin_refresh` hands out increasing tickets and
//! `apply_refresh` only accepts a result newer than the last one applied.

use crate::diary::{Calendar, DiaryRecord, YearMonth};
use crate::index::{MonthlyQuery, Selection, SelectionResolver, TimeBucketIndex};
use crate::repository::{RepositoryError, RepositoryResult};

/// Issue-order token for one repository fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    /// Position in issue order, starting at 1
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// What happened to a fetch result handed to `apply_refresh`
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Records replaced; carries the selection after resolution
    Applied(Selection),
    /// A newer fetch was already applied; result discarded
    Stale,
    /// Fetch failed; previous records, index and selection kept
    Failed(RepositoryError),
}

impl RefreshOutcome {
    /// Whether the result replaced the navigator state
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied(_))
    }
}

/// Browsing state: records, month index and current selection
#[derive(Debug, Clone)]
pub struct DiaryNavigator {
    records: Vec<DiaryRecord>,
    index: TimeBucketIndex,
    selection: Selection,
    /// Last ticket handed out
    issued: u64,
    /// Ticket of the result currently shown (0 = none yet)
    applied: u64,
}

impl DiaryNavigator {
    /// Create an empty navigator bucketing in `calendar`
    pub fn new(calendar: Calendar) -> Self {
        Self {
            records: Vec::new(),
            index: TimeBucketIndex::empty(calendar),
            selection: Selection::NoData,
            issued: 0,
            applied: 0,
        }
    }

    /// Create a navigator over an already-fetched record set
    pub fn from_records(calendar: Calendar, records: Vec<DiaryRecord>) -> Self {
        let mut navigator = Self::new(calendar);
        navigator.replace_records(records);
        navigator
    }

    // ==================== Refresh ====================

    /// Take a ticket before starting a fetch
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Apply the result of the fetch started with `ticket`
    ///
    /// Results older than the one already applied are dropped, whatever
    /// order the fetches complete in. A failed fetch leaves the current
    /// state untouched.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: RepositoryResult<Vec<DiaryRecord>>,
    ) -> RefreshOutcome {
        if ticket.0 <= self.applied {
            tracing::debug!(
                ticket = ticket.0,
                applied = self.applied,
                "Discarding stale diary fetch"
            );
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(records) => {
                self.applied = ticket.0;
                self.replace_records(records);
                RefreshOutcome::Applied(self.selection)
            }
            Err(e) => {
                tracing::warn!(ticket = ticket.0, error = %e, "Diary fetch failed, keeping previous index");
                RefreshOutcome::Failed(e)
            }
        }
    }

    fn replace_records(&mut self, records: Vec<DiaryRecord>) {
        self.index = TimeBucketIndex::build(&records, self.index.calendar());
        self.records = records;
        self.selection = SelectionResolver::resolve(&self.index, self.selection.month());
    }

    // ==================== Queries ====================

    /// Years with records, most recent first
    pub fn years(&self) -> Vec<i32> {
        self.index.years()
    }

    /// Months of `year` with records, most recent first
    pub fn months_for(&self, year: i32) -> Vec<u32> {
        self.index.months_for(year)
    }

    /// The selected month, `None` when there is nothing to show
    pub fn current_selection(&self) -> Option<YearMonth> {
        self.selection.month()
    }

    /// The resolved selection state
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Records of the selected month, most recent first
    pub fn records_in_selection(&self) -> Vec<DiaryRecord> {
        match self.selection {
            Selection::NoData => Vec::new(),
            Selection::Month(ym) => {
                MonthlyQuery::filter_by_month(&self.records, ym, self.index.calendar())
            }
        }
    }

    /// Every fetched record, including undated ones
    pub fn records(&self) -> &[DiaryRecord] {
        &self.records
    }

    /// Month index over the current records
    pub fn index(&self) -> &TimeBucketIndex {
        &self.index
    }

    /// Calendar used for month bucketing
    pub fn calendar(&self) -> Calendar {
        self.index.calendar()
    }

    // ==================== Selection changes ====================

    /// Switch year; the month becomes the latest one of that year
    pub fn select_year(&mut self, year: i32) -> Vec<DiaryRecord> {
        self.selection = SelectionResolver::on_year_changed(&self.index, year);
        self.records_in_selection()
    }

    /// Switch month within the current year
    pub fn select_month(&mut self, month: u32) -> Vec<DiaryRecord> {
        self.selection = SelectionResolver::on_month_changed(&self.index, self.selection, month);
        self.records_in_selection()
    }

    /// Jump to a specific month, falling back to the latest if it is empty
    pub fn select(&mut self, ym: YearMonth) -> Vec<DiaryRecord> {
        self.selection = SelectionResolver::resolve(&self.index, Some(ym));
        self.records_in_selection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, y: i32, m: u32, d: u32) -> DiaryRecord {
        DiaryRecord::new(id, id, "").created_at(Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap())
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn scenario() -> Vec<DiaryRecord> {
        vec![
            record("jan", 2025, 1, 15),
            record("mar", 2025, 3, 2),
            record("dec", 2024, 12, 20),
        ]
    }

    fn ids(records: &[DiaryRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_navigator() {
        let nav = DiaryNavigator::new(Calendar::Utc);
        assert!(nav.years().is_empty());
        assert_eq!(nav.current_selection(), None);
        assert!(nav.records_in_selection().is_empty());
    }

    #[test]
    fn test_initial_selection_is_latest() {
        let nav = DiaryNavigator::from_records(Calendar::Utc, scenario());
        assert_eq!(nav.years(), vec![2025, 2024]);
        assert_eq!(nav.months_for(2025), vec![3, 1]);
        assert_eq!(nav.current_selection(), Some(ym(2025, 3)));
        assert_eq!(ids(&nav.records_in_selection()), vec!["mar"]);
    }

    #[test]
    fn test_select_year_and_month() {
        let mut nav = DiaryNavigator::from_records(Calendar::Utc, scenario());

        let shown = nav.select_year(2024);
        assert_eq!(nav.current_selection(), Some(ym(2024, 12)));
        assert_eq!(ids(&shown), vec!["dec"]);

        nav.select_year(2025);
        let shown = nav.select_month(1);
        assert_eq!(nav.current_selection(), Some(ym(2025, 1)));
        assert_eq!(ids(&shown), vec!["jan"]);

        // Month without records falls back to latest
        nav.select_month(2);
        assert_eq!(nav.current_selection(), Some(ym(2025, 3)));

        nav.select(ym(2024, 12));
        assert_eq!(nav.current_selection(), Some(ym(2024, 12)));
    }

    #[test]
    fn test_refresh_keeps_valid_selection() {
        let mut nav = DiaryNavigator::new(Calendar::Utc);
        let ticket = nav.begin_refresh();
        nav.apply_refresh(ticket, Ok(vec![record("jan", 2025, 1, 15), record("dec", 2024, 12, 20)]));
        assert_eq!(nav.current_selection(), Some(ym(2025, 1)));

        let ticket = nav.begin_refresh();
        let outcome = nav.apply_refresh(ticket, Ok(scenario()));
        assert!(matches!(outcome, RefreshOutcome::Applied(Selection::Month(m)) if m == ym(2025, 1)));
        assert_eq!(nav.current_selection(), Some(ym(2025, 1)));
    }

    #[test]
    fn test_refresh_drops_removed_selection() {
        let mut nav = DiaryNavigator::from_records(Calendar::Utc, scenario());
        nav.select_year(2024);

        let ticket = nav.begin_refresh();
        nav.apply_refresh(ticket, Ok(vec![record("jan", 2025, 1, 15)]));
        assert_eq!(nav.current_selection(), Some(ym(2025, 1)));

        let ticket = nav.begin_refresh();
        nav.apply_refresh(ticket, Ok(Vec::new()));
        assert_eq!(nav.selection(), Selection::NoData);
        assert!(nav.records_in_selection().is_empty());
    }

    #[test]
    fn test_results_apply_in_issue_order() {
        let mut nav = DiaryNavigator::new(Calendar::Utc);
        let older = nav.begin_refresh();
        let newer = nav.begin_refresh();
        assert!(older < newer);

        // Newer completes first
        assert!(nav.apply_refresh(newer, Ok(scenario())).is_applied());
        // Slow older fetch must not overwrite it
        let outcome = nav.apply_refresh(older, Ok(vec![record("old", 2020, 5, 5)]));
        assert!(matches!(outcome, RefreshOutcome::Stale));
        assert_eq!(nav.years(), vec![2025, 2024]);
    }

    #[test]
    fn test_older_result_applies_if_first() {
        let mut nav = DiaryNavigator::new(Calendar::Utc);
        let older = nav.begin_refresh();
        let newer = nav.begin_refresh();

        assert!(nav.apply_refresh(older, Ok(vec![record("old", 2020, 5, 5)])).is_applied());
        assert!(nav.apply_refresh(newer, Ok(scenario())).is_applied());
        assert_eq!(nav.years(), vec![2025, 2024]);
    }

    #[test]
    fn test_failed_refresh_keeps_state() {
        let mut nav = DiaryNavigator::from_records(Calendar::Utc, scenario());
        nav.select_year(2024);

        let ticket = nav.begin_refresh();
        let outcome = nav.apply_refresh(
            ticket,
            Err(RepositoryError::Transport("offline".to_string())),
        );

        assert!(matches!(outcome, RefreshOutcome::Failed(RepositoryError::Transport(_))));
        assert_eq!(nav.years(), vec![2025, 2024]);
        assert_eq!(nav.current_selection(), Some(ym(2024, 12)));
        assert_eq!(nav.records().len(), 3);
    }

    #[test]
    fn test_undated_records_kept_but_not_bucketed() {
        let mut records = scenario();
        records.push(DiaryRecord::new("draft", "draft", ""));
        let nav = DiaryNavigator::from_records(Calendar::Utc, records);

        assert_eq!(nav.records().len(), 4);
        assert_eq!(nav.index().len(), 3);
    }
}
