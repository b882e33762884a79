//! Diary data model
//!
//! - **types**: `DiaryRecord`, `NewDiary`, `YearMonth`, `Calendar`
//!
//! Records are read-only to the index; every derived structure (buckets,
//! selections, month lists) is recomputed from a record set.

pub mod types;

pub use types::{Calendar, DiaryRecord, NewDiary, YearMonth};
