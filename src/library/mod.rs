//! Views over a whole diary collection
//!
//! - **search**: keyword search on title and content
//! - **stats**: counts per month/year and date span
//! - **gallery**: photo grid items

mod gallery;
mod search;
mod stats;

pub use gallery::{photo_grid, PhotoItem};
pub use search::search;
pub use stats::DiaryStats;
