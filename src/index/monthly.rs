//! Monthly Query - records falling inside one calendar month
//!
//! A record matches iff its creation instant lies in
//! `[year-month-01T00:00, next-month-01T00:00)` of the chosen calendar.

use crate::diary::{Calendar, DiaryRecord, YearMonth};
use std::cmp::Ordering;

/// Client-side month filtering over a record set
pub struct MonthlyQuery;

impl MonthlyQuery {
    /// Records created in `ym`, most recent first
    ///
    /// Does not check `ym` against any index; pass a resolved selection.
    pub fn filter_by_month(
        records: &[DiaryRecord],
        ym: YearMonth,
        calendar: Calendar,
    ) -> Vec<DiaryRecord> {
        let mut matched: Vec<DiaryRecord> = records
            .iter()
            .filter(|r| {
                r.created_at
                    .map(|at| ym.contains(calendar, at))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        sort_most_recent_first(&mut matched);
        matched
    }
}

/// Sort by creation instant descending. Undated records go last; ties are
/// broken by id so the order is stable across fetches.
pub fn sort_most_recent_first(records: &mut [DiaryRecord]) {
    records.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });
}
