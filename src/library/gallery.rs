//! Photo grid listing

use crate::diary::DiaryRecord;
use crate::index::sort_most_recent_first;
use serde::Serialize;

/// One cell of the photo grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoItem {
    /// Diary the photo belongs to
    pub diary_id: String,
    pub image_ref: String,
}

/// Photos of all diaries that have one, most recent first
pub fn photo_grid(records: &[DiaryRecord]) -> Vec<PhotoItem> {
    let mut with_photo: Vec<DiaryRecord> = records
        .iter()
        .filter(|r| r.has_photo())
        .cloned()
        .collect();
    sort_most_recent_first(&mut with_photo);

    with_photo
        .into_iter()
        .filter_map(|r| {
            Some(PhotoItem {
                image_ref: r.image_ref?,
                diary_id: r.id,
            })
        })
        .collect()
}
