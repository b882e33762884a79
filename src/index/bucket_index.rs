//! Time Bucket Index - year → months projection of a record set
//!
//! Built from scratch on every refresh; never persisted.
//!
//! # Performance
//! - Build: O(n log m) where m = populated months
//! - `years()` / `months_for()`: O(k) for k returned entries
//! - `contains()`: O(log m)

use crate::diary::{Calendar, DiaryRecord, YearMonth};
use std::collections::{BTreeMap, BTreeSet};

/// Months that contain at least one diary record, grouped by year
#[derive(Debug, Clone, Default)]
pub struct TimeBucketIndex {
    buckets: BTreeMap<i32, BTreeSet<u32>>,
    calendar: Calendar,
}

impl TimeBucketIndex {
    /// Create an empty index bucketing in `calendar`
    pub fn empty(calendar: Calendar) -> Self {
        Self {
            buckets: BTreeMap::new(),
            calendar,
        }
    }

    /// Build an index from records in any order
    ///
    /// Undated records are skipped.
    pub fn build<'a, I>(records: I, calendar: Calendar) -> Self
    where
        I: IntoIterator<Item = &'a DiaryRecord>,
    {
        let mut index = Self::empty(calendar);
        let mut undated = 0usize;

        for record in records {
            match record.year_month(calendar) {
                Some(ym) => index.insert(ym),
                None => undated += 1,
            }
        }

        if undated > 0 {
            tracing::debug!(undated, "Skipped undated records while building index");
        }

        index
    }

    fn insert(&mut self, ym: YearMonth) {
        self.buckets.entry(ym.year).or_default().insert(ym.month);
    }

    /// Calendar the index was bucketed in
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Years with at least one record, most recent first
    pub fn years(&self) -> Vec<i32> {
        self.buckets.keys().rev().copied().collect()
    }

    /// Months of `year` with at least one record, most recent first.
    /// Empty if the year has no records.
    pub fn months_for(&self, year: i32) -> Vec<u32> {
        self.buckets
            .get(&year)
            .map(|months| months.iter().rev().copied().collect())
            .unwrap_or_default()
    }

    /// All populated months, most recent first
    pub fn year_months(&self) -> Vec<YearMonth> {
        self.buckets
            .iter()
            .rev()
            .flat_map(|(year, months)| {
                months.iter().rev().map(move |month| YearMonth {
                    year: *year,
                    month: *month,
                })
            })
            .collect()
    }

    /// Whether `year` has any records
    pub fn contains_year(&self, year: i32) -> bool {
        self.buckets.contains_key(&year)
    }

    /// Whether the month bucket is populated
    pub fn contains(&self, ym: YearMonth) -> bool {
        self.buckets
            .get(&ym.year)
            .map(|months| months.contains(&ym.month))
            .unwrap_or(false)
    }

    /// Most recent populated month
    pub fn latest(&self) -> Option<YearMonth> {
        let (&year, months) = self.buckets.iter().next_back()?;
        let &month = months.iter().next_back()?;
        Some(YearMonth { year, month })
    }

    /// Most recent populated month within `year`
    pub fn latest_in(&self, year: i32) -> Option<YearMonth> {
        let &month = self.buckets.get(&year)?.iter().next_back()?;
        Some(YearMonth { year, month })
    }

    /// True when no record has a usable date
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of populated months
    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }
}

// Two indexes are equal when they hold the same year → months mapping.
impl PartialEq for TimeBucketIndex {
    fn eq(&self, other: &Self) -> bool {
        self.buckets == other.buckets
    }
}

impl Eq for TimeBucketIndex {}
