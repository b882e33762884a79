//! Core data types for the diary index
//!
//! - `DiaryRecord`: a stored diary entry
//! - `NewDiary`: an entry produced by the save flow, before the store assigns an id
//! - `YearMonth`: one calendar month bucket
//! - `Calendar`: the calendar used to bucket instants into months

use chrono::{
    DateTime, Datelike, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound,
    TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single diary entry as stored by a repository
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiaryRecord {
    /// Opaque id assigned by the repository
    pub id: String,
    /// Short title, may be empty
    pub title: String,
    /// Generated or edited body text
    pub content: String,
    /// Reference to the stored photo (URL or handle)
    #[serde(default)]
    pub image_ref: Option<String>,
    /// Creation instant; `None` when the store has no usable date
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DiaryRecord {
    /// Create an undated record without a photo
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            image_ref: None,
            created_at: None,
        }
    }

    /// Builder: set the creation instant
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Builder: attach a photo reference
    pub fn image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Whether the record has a usable creation instant
    pub fn is_dated(&self) -> bool {
        self.created_at.is_some()
    }

    /// Whether the record carries a non-empty photo reference
    pub fn has_photo(&self) -> bool {
        self.image_ref.as_deref().map_or(false, |s| !s.is_empty())
    }

    /// Month bucket of this record in the given calendar
    pub fn year_month(&self, calendar: Calendar) -> Option<YearMonth> {
        self.created_at.map(|at| calendar.year_month(at))
    }
}

/// A diary entry about to be saved; the repository assigns the id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewDiary {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_ref: Option<String>,
    /// Capture date of the photo, or the save time when unknown
    pub created_at: DateTime<Utc>,
}

impl NewDiary {
    /// Create an entry dated now
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image_ref: None,
            created_at: Utc::now(),
        }
    }

    /// Builder: set the creation instant
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Builder: attach a photo reference
    pub fn image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Turn into a stored record with the given id
    ///
    /// The creation instant is truncated to milliseconds, the precision
    /// repositories persist.
    pub fn into_record(self, id: impl Into<String>) -> DiaryRecord {
        DiaryRecord {
            id: id.into(),
            title: self.title,
            content: self.content,
            image_ref: self.image_ref,
            created_at: Some(self.created_at.trunc_subsecs(3)),
        }
    }
}

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl YearMonth {
    /// Create a year/month pair, returning None if the month is not 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The following month; December rolls over to January of the next year
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of the month, if representable
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Instants bounding this month in `calendar` as a half-open interval
    /// `[start, end)`
    pub fn bounds(&self, calendar: Calendar) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = calendar.start_of_day(self.first_day()?);
        let end = calendar.start_of_day(self.next().first_day()?);
        Some((start, end))
    }

    /// Whether `instant` falls within this month in `calendar`
    pub fn contains(&self, calendar: Calendar, instant: DateTime<Utc>) -> bool {
        calendar.year_month(instant) == *self
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Calendar used to bucket instants into months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Calendar {
    /// The machine's local time zone
    #[default]
    Local,
    /// UTC
    Utc,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl Calendar {
    /// Parse `"local"`, `"utc"` or an offset such as `"+09:00"`, `"-0530"` or `"+09"`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "local" => return Some(Calendar::Local),
            "utc" | "z" => return Some(Calendar::Utc),
            _ => {}
        }

        let offset = match s.parse::<FixedOffset>() {
            Ok(offset) => offset,
            // Hours-only form such as "+09"
            Err(_) => {
                let hours = s.strip_prefix(|c: char| c == '+' || c == '-')?;
                if hours.len() != 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                format!("{}:00", s).parse::<FixedOffset>().ok()?
            }
        };

        Some(Calendar::Fixed(offset))
    }

    /// Wall-clock date and time of `instant` in this calendar
    pub fn naive(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Calendar::Local => instant.with_timezone(&chrono::Local).naive_local(),
            Calendar::Utc => instant.naive_utc(),
            Calendar::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    /// Month bucket of `instant` in this calendar
    pub fn year_month(&self, instant: DateTime<Utc>) -> YearMonth {
        let local = self.naive(instant);
        YearMonth {
            year: local.year(),
            month: local.month(),
        }
    }

    /// The first instant of `date` in this calendar
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self {
            Calendar::Utc => Utc.from_utc_datetime(&midnight),
            Calendar::Fixed(offset) => resolve_local(offset, midnight),
            Calendar::Local => resolve_local(&chrono::Local, midnight),
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Calendar::Local => write!(f, "local"),
            Calendar::Utc => write!(f, "utc"),
            Calendar::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Map a wall-clock time to an instant. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward to the first valid hour.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = naive;
    for _ in 0..24 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                return dt.with_timezone(&Utc)
            }
            LocalResult::None => candidate += chrono::Duration::hours(1),
        }
    }
    Utc.from_utc_datetime(&naive)
}
