//! Selection Resolver - picks the (year, month) bucket to display
//!
//! Resolution policy:
//!
//! ```text
//! index empty                     → NoData
//! desired pair populated          → desired (position kept across refreshes)
//! otherwise                       → latest year, latest month in that year
//! ```
//!
//! A resolved `Selection::Month` always names a populated bucket, so callers
//! never re-validate it.

use crate::diary::YearMonth;
use crate::index::TimeBucketIndex;
use serde::{Deserialize, Serialize};

/// Currently displayed bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    /// The index has no dated records; nothing can be selected
    #[default]
    NoData,
    /// A populated month
    Month(YearMonth),
}

impl Selection {
    /// The selected month, if any
    pub fn month(&self) -> Option<YearMonth> {
        match self {
            Selection::NoData => None,
            Selection::Month(ym) => Some(*ym),
        }
    }

    /// Whether there is nothing to select
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::NoData)
    }
}

impl From<Option<YearMonth>> for Selection {
    fn from(ym: Option<YearMonth>) -> Self {
        ym.map(Selection::Month).unwrap_or(Selection::NoData)
    }
}

/// Stateless resolution rules over a `TimeBucketIndex`
pub struct SelectionResolver;

impl SelectionResolver {
    /// Resolve a desired pair against the index
    ///
    /// `desired` is `None` when nothing was selected before.
    pub fn resolve(index: &TimeBucketIndex, desired: Option<YearMonth>) -> Selection {
        if index.is_empty() {
            return Selection::NoData;
        }

        match desired {
            Some(ym) if index.contains(ym) => Selection::Month(ym),
            _ => index.latest().into(),
        }
    }

    /// Re-derive the month after the year dimension changed
    ///
    /// Picks the most recent month of `year`. A year without records falls
    /// back to the latest populated month overall.
    pub fn on_year_changed(index: &TimeBucketIndex, year: i32) -> Selection {
        if index.is_empty() {
            return Selection::NoData;
        }

        match index.latest_in(year) {
            Some(ym) => Selection::Month(ym),
            None => index.latest().into(),
        }
    }

    /// Change the month while keeping the current year
    ///
    /// Without a current selection the request is resolved against the
    /// latest year.
    pub fn on_month_changed(index: &TimeBucketIndex, current: Selection, month: u32) -> Selection {
        let year = match current.month().or_else(|| index.latest()) {
            Some(ym) => ym.year,
            None => return Selection::NoData,
        };

        Self::resolve(index, YearMonth::new(year, month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::{Calendar, DiaryRecord};
    use chrono::{TimeZone, Utc};

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn index_of(dates: &[(i32, u32, u32)]) -> TimeBucketIndex {
        let records: Vec<DiaryRecord> = dates
            .iter()
            .enumerate()
            .map(|(i, &(y, m, d))| {
                DiaryRecord::new(i.to_string(), "", "")
                    .created_at(Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap())
            })
            .collect();
        TimeBucketIndex::build(&records, Calendar::Utc)
    }

    fn scenario() -> TimeBucketIndex {
        index_of(&[(2025, 1, 15), (2025, 3, 2), (2024, 12, 20)])
    }

    #[test]
    fn test_empty_index_has_no_selection() {
        let index = TimeBucketIndex::empty(Calendar::Utc);

        assert_eq!(SelectionResolver::resolve(&index, None), Selection::NoData);
        assert_eq!(
            SelectionResolver::resolve(&index, Some(ym(2025, 1))),
            Selection::NoData
        );
        assert_eq!(
            SelectionResolver::on_year_changed(&index, 2025),
            Selection::NoData
        );
        assert_eq!(
            SelectionResolver::on_month_changed(&index, Selection::NoData, 3),
            Selection::NoData
        );
    }

    #[test]
    fn test_default_resolution_picks_latest() {
        let index = scenario();
        assert_eq!(
            SelectionResolver::resolve(&index, None),
            Selection::Month(ym(2025, 3))
        );
    }

    #[test]
    fn test_valid_selection_is_kept() {
        let index = scenario();
        for desired in index.year_months() {
            assert_eq!(
                SelectionResolver::resolve(&index, Some(desired)),
                Selection::Month(desired)
            );
        }
    }

    #[test]
    fn test_invalid_selection_falls_back_to_latest() {
        let index = scenario();

        // Year present, month absent
        assert_eq!(
            SelectionResolver::resolve(&index, Some(ym(2025, 2))),
            Selection::Month(ym(2025, 3))
        );
        // Year absent
        assert_eq!(
            SelectionResolver::resolve(&index, Some(ym(2019, 5))),
            Selection::Month(ym(2025, 3))
        );
    }

    #[test]
    fn test_resolution_always_lands_in_index() {
        let index = scenario();
        for year in 2023..=2026 {
            for month in 1..=12 {
                let resolved = SelectionResolver::resolve(&index, Some(ym(year, month)));
                assert!(index.contains(resolved.month().unwrap()));
            }
        }
    }

    #[test]
    fn test_selection_survives_rebuild_with_newer_month() {
        let before = index_of(&[(2025, 1, 15), (2024, 12, 20)]);
        let selected = SelectionResolver::resolve(&before, None);
        assert_eq!(selected, Selection::Month(ym(2025, 1)));

        let after = index_of(&[(2025, 1, 15), (2024, 12, 20), (2025, 3, 2)]);
        assert_eq!(
            SelectionResolver::resolve(&after, selected.month()),
            Selection::Month(ym(2025, 1))
        );
    }

    #[test]
    fn test_year_change_picks_latest_month_of_year() {
        let index = index_of(&[(2025, 3, 2), (2024, 2, 1), (2024, 11, 5), (2024, 7, 7)]);

        assert_eq!(
            SelectionResolver::on_year_changed(&index, 2024),
            Selection::Month(ym(2024, 11))
        );
        assert_eq!(
            SelectionResolver::on_year_changed(&index, 2025),
            Selection::Month(ym(2025, 3))
        );
        // Unknown year falls back to latest overall
        assert_eq!(
            SelectionResolver::on_year_changed(&index, 2010),
            Selection::Month(ym(2025, 3))
        );
    }

    #[test]
    fn test_month_change_keeps_year() {
        let index = index_of(&[(2025, 3, 2), (2024, 2, 1), (2024, 11, 5)]);
        let current = Selection::Month(ym(2024, 11));

        assert_eq!(
            SelectionResolver::on_month_changed(&index, current, 2),
            Selection::Month(ym(2024, 2))
        );
        // Month not populated in 2024
        assert_eq!(
            SelectionResolver::on_month_changed(&index, current, 5),
            Selection::Month(ym(2025, 3))
        );
        // Out-of-range months fall back to the latest pair
        assert_eq!(
            SelectionResolver::on_month_changed(&index, current, 0),
            Selection::Month(ym(2025, 3))
        );
        assert_eq!(
            SelectionResolver::on_month_changed(&index, current, 13),
            Selection::Month(ym(2025, 3))
        );
        // No current selection resolves against the latest year
        assert_eq!(
            SelectionResolver::on_month_changed(&index, Selection::NoData, 3),
            Selection::Month(ym(2025, 3))
        );
    }

    #[test]
    fn test_selection_serialization() {
        let json = serde_json::to_string(&Selection::Month(ym(2025, 3))).unwrap();
        assert_eq!(json, r#"{"state":"month","year":2025,"month":3}"#);

        let json = serde_json::to_string(&Selection::NoData).unwrap();
        assert_eq!(json, r#"{"state":"no_data"}"#);
    }
}
