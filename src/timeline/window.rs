//! The 14-day timeline window and week-by-week navigation.
//!
//! A window is a value: navigation returns a new window and never mutates
//! the one it was given. Day boundaries are local midnights in the window's
//! timezone.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::WeekStart;
use crate::error::EngineError;

/// Calendar days covered by one window.
pub const WINDOW_DAYS: i64 = 14;
/// Days moved by one navigation step.
pub const SHIFT_DAYS: i64 = 7;

/// Navigation direction from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prev => "prev",
            Self::Next => "next",
        }
    }

    fn offset_days(&self) -> i64 {
        match self {
            Self::Prev => -SHIFT_DAYS,
            Self::Next => SHIFT_DAYS,
        }
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prev" => Ok(Self::Prev),
            "next" => Ok(Self::Next),
            _ => Err(EngineError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First day of the week containing `date`.
pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = match week_start {
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
        WeekStart::Monday => date.weekday().num_days_from_monday(),
    };
    date - Duration::days(offset as i64)
}

/// Fixed span of [`WINDOW_DAYS`] consecutive days from an anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineWindow {
    anchor: NaiveDate,
    timezone: Tz,
}

impl TimelineWindow {
    /// Window anchored at the start of the week containing `date`.
    pub fn for_date(date: NaiveDate, week_start: WeekStart, timezone: Tz) -> Self {
        Self::starting_at(start_of_week(date, week_start), timezone)
    }

    /// Window for the week containing `now` in `timezone`.
    pub fn current(now: DateTime<Utc>, week_start: WeekStart, timezone: Tz) -> Self {
        let today = now.with_timezone(&timezone).date_naive();
        Self::for_date(today, week_start, timezone)
    }

    /// Window anchored exactly at `anchor`, with no week normalization.
    pub fn starting_at(anchor: NaiveDate, timezone: Tz) -> Self {
        Self { anchor, timezone }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Last calendar day inside the window.
    pub fn last_day(&self) -> NaiveDate {
        self.anchor + Duration::days(WINDOW_DAYS - 1)
    }

    /// Local midnight opening the window.
    pub fn start(&self) -> DateTime<Utc> {
        local_midnight(&self.timezone, self.anchor)
    }

    /// Local midnight after the last day (exclusive bound).
    pub fn end(&self) -> DateTime<Utc> {
        local_midnight(&self.timezone, self.anchor + Duration::days(WINDOW_DAYS))
    }

    /// New window one step earlier or later. The anchor's weekday is kept.
    pub fn shift(&self, direction: Direction) -> Self {
        Self {
            anchor: self.anchor + Duration::days(direction.offset_days()),
            timezone: self.timezone,
        }
    }

    /// Header columns for each day in the window.
    pub fn days(&self, today: NaiveDate) -> Vec<TimelineDay> {
        (0..WINDOW_DAYS)
            .map(|i| {
                let date = self.anchor + Duration::days(i);
                TimelineDay {
                    date,
                    is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
                    is_today: date == today,
                }
            })
            .collect()
    }
}

/// One day column of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDay {
    pub date: NaiveDate,
    pub is_weekend: bool,
    pub is_today: bool,
}

/// Shift `window` by one week in `direction`.
pub fn shift_window(window: &TimelineWindow, direction: Direction) -> TimelineWindow {
    window.shift(direction)
}

/// Resolve midnight on `date` in `tz`, handling DST transitions at midnight.
fn local_midnight(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = NaiveDateTime::new(date, NaiveTime::MIN);

    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }

    // Midnight skipped by a spring-forward gap: first valid instant is an hour on.
    let shifted = naive + Duration::hours(1);
    if let Some(dt) = tz.from_local_datetime(&shifted).earliest() {
        log::warn!(
            "DST gap at midnight on {} in {}; using post-transition time",
            date,
            tz
        );
        return dt.with_timezone(&Utc);
    }

    log::warn!(
        "Could not resolve midnight on {} in {}; falling back to UTC",
        date,
        tz
    );
    Utc.from_utc_datetime(&naive)
}
