//! # PhotoLog
//!
//! Photo diary core: month-bucketed diary index with year/month navigation,
//! keyword search and usage statistics over a per-user diary store.
//!
//! ## Features
//!
//! - **Month index**: which (year, month) pairs have diaries, most recent first
//! - **Stable navigation**: a still-valid selection survives refreshes,
//!   otherwise the latest month is picked
//! - **Ordered refreshes**: a slow earlier fetch never overwrites a newer one
//! - **Local store**: SQLite repository with native month range queries
//!
//! ## Modules
//!
//! - [`diary`]: Core data types
//! - [`index`]: Bucket index, selection resolution, month filtering
//! - [`browse`]: Navigator state and repository-backed browse service
//! - [`repository`]: Diary record sources
//! - [`library`]: Search, statistics and photo grid
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use photolog::{BrowseService, Calendar, NewDiary, SqliteRepository, DiaryRepository};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = Arc::new(SqliteRepository::open(Path::new("./data"))?);
//!     repo.insert("alice", NewDiary::new("Beach", "Windy but bright").image("img/1.jpg")).await?;
//!
//!     let service = BrowseService::new(repo, "alice", Calendar::Local);
//!     service.refresh().await;
//!
//!     let nav = service.navigator();
//!     let nav = nav.read().await;
//!     println!("years: {:?}", nav.years());
//!     println!("showing {:?}", nav.current_selection());
//!     for diary in nav.records_in_selection() {
//!         println!("{} {}", diary.id, diary.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod browse;
pub mod config;
pub mod diary;
pub mod index;
pub mod library;
pub mod repository;

// Re-export top-level types for convenience
pub use diary::{Calendar, DiaryRecord, NewDiary, YearMonth};

pub use index::{MonthlyQuery, Selection, SelectionResolver, TimeBucketIndex};

pub use browse::{BrowseService, DiaryNavigator, RefreshOutcome, RefreshTicket};

pub use repository::{
    DiaryRepository, MemoryRepository, RepositoryError, RepositoryResult, SqliteRepository,
};

pub use library::{photo_grid, search, DiaryStats, PhotoItem};

pub use config::{Config, ConfigError, DiaryConfig, LoggingConfig, StorageConfig};
