//! Usage statistics over a diary record set

use crate::diary::{Calendar, DiaryRecord, YearMonth};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts and date span of one owner's diaries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiaryStats {
    /// All diaries
    pub total: usize,
    /// Diaries with a creation date
    pub dated: usize,
    /// Diaries without a usable creation date
    pub undated: usize,
    /// Diaries with a photo attached
    pub with_photo: usize,
    /// Earliest creation instant
    pub first: Option<DateTime<Utc>>,
    /// Latest creation instant
    pub last: Option<DateTime<Utc>>,
    /// Diaries per month, most recent first
    pub per_month: Vec<(YearMonth, usize)>,
    /// Diaries per year, most recent first
    pub per_year: Vec<(i32, usize)>,
}

impl DiaryStats {
    /// Compute statistics, bucketing months in `calendar`
    pub fn compute(records: &[DiaryRecord], calendar: Calendar) -> Self {
        let mut months: BTreeMap<YearMonth, usize> = BTreeMap::new();
        let mut years: BTreeMap<i32, usize> = BTreeMap::new();
        let mut stats = DiaryStats {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            if record.has_photo() {
                stats.with_photo += 1;
            }

            let at = match record.created_at {
                Some(at) => at,
                None => {
                    stats.undated += 1;
                    continue;
                }
            };

            stats.dated += 1;
            stats.first = Some(stats.first.map_or(at, |first| first.min(at)));
            stats.last = Some(stats.last.map_or(at, |last| last.max(at)));

            let ym = calendar.year_month(at);
            *months.entry(ym).or_default() += 1;
            *years.entry(ym.year).or_default() += 1;
        }

        stats.per_month = months.into_iter().rev().collect();
        stats.per_year = years.into_iter().rev().collect();
        stats
    }

    /// Busiest month; the most recent one wins a tie
    pub fn busiest_month(&self) -> Option<(YearMonth, usize)> {
        self.per_month
            .iter()
            .copied()
            .fold(None, |best, (ym, n)| match best {
                Some((_, best_n)) if best_n >= n => best,
                _ => Some((ym, n)),
            })
    }
}

impl std::fmt::Display for DiaryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "diaries={}, dated={}, undated={}, photos={}, months={}",
            self.total,
            self.dated,
            self.undated,
            self.with_photo,
            self.per_month.len()
        )
    }
}
