//! Diary browsing
//!
//! - **DiaryNavigator**: re-derivable year/month state exposed to a UI shell
//! - **BrowseService**: refreshes a shared navigator from a repository
//!
//! ## Data Flow
//!
//! 1. `BrowseService::refresh` takes a ticket and fetches all diaries
//! 2. The navigator rebuilds its index and re-resolves the selection
//! 3. The UI reads `years()`, `months_for()` and `records_in_selection()`

mod navigator;
mod service;

pub use navigator::{DiaryNavigator, RefreshOutcome, RefreshTicket};
pub use service::BrowseService;
