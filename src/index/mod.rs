//! PhotoLog Diary Index
//!
//! Derives navigation state from a diary record set:
//!
//! - **TimeBucketIndex**: year → months that have at least one record
//! - **SelectionResolver**: validated (year, month) with fallback to latest
//! - **MonthlyQuery**: records of one month, most recent first
//!
//! # Architecture
//!
//! ```text
//! records (any order)
//!        ↓
//! TimeBucketIndex::build → {2025: [3, 1], 2024: [12]}
//!        ↓
//! SelectionResolver::resolve(desired) → 2025-03 (or desired, if populated)
//!        ↓
//! MonthlyQuery::filter_by_month → records of 2025-03
//! ```
//!
//! All three are pure and synchronous; they can run on any thread.

mod bucket_index;
mod monthly;
mod selection;

pub use bucket_index::TimeBucketIndex;
pub use monthly::{sort_most_recent_first, MonthlyQuery};
pub use selection::{Selection, SelectionResolver};
