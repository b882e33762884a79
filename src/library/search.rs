//! Keyword search over diary titles and bodies

use crate::diary::DiaryRecord;
use crate::index::sort_most_recent_first;

/// Diaries whose title or content contains `keyword`, ignoring case
///
/// A blank keyword matches nothing. Results are most recent first, undated
/// diaries last.
pub fn search(records: &[DiaryRecord], keyword: &str) -> Vec<DiaryRecord> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matched: Vec<DiaryRecord> = records
        .iter()
        .filter(|r| {
            r.title.to_lowercase().contains(&needle) || r.content.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    sort_most_recent_first(&mut matched);
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn records() -> Vec<DiaryRecord> {
        vec![
            DiaryRecord::new("1", "Beach Day", "Waves everywhere")
                .created_at(Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap()),
            DiaryRecord::new("2", "Mountain", "Hiked to the top, saw the beach far away")
                .created_at(Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()),
            DiaryRecord::new("3", "Café", "Latte art"),
        ]
    }

    #[test]
    fn test_matches_title_or_content_case_insensitive() {
        let found = search(&records(), "BEACH");
        let ids: Vec<_> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_non_ascii_keyword() {
        let found = search(&records(), "café");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "3");
    }

    #[test]
    fn test_blank_keyword_matches_nothing() {
        assert!(search(&records(), "").is_empty());
        assert!(search(&records(), "   ").is_empty());
        assert!(search(&records(), "volcano").is_empty());
    }
}
