//! Freshness Gate
//!
//! Decides whether a stored record must be refetched, independently of any
//! in-memory TTL. Applied identically to cache hits and persistent-store
//! hits, so a record that is stale by calendar period is never promoted
//! back into the cache as fresh.

use chrono::{DateTime, Datelike, Duration, IsoWeek, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;

// == Refresh Period ==
/// Calendar period whose rollover invalidates data written in the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPeriod {
    /// Only the absolute age matters
    None,
    CalendarDay,
    /// ISO-8601 week, Monday to Sunday
    IsoWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PeriodKey {
    Always,
    Day(NaiveDate),
    Week(i32, u32),
}

impl RefreshPeriod {
    fn key_of<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> PeriodKey {
        match self {
            RefreshPeriod::None => PeriodKey::Always,
            RefreshPeriod::CalendarDay => PeriodKey::Day(at.date_naive()),
            RefreshPeriod::IsoWeek => {
                let week: IsoWeek = at.iso_week();
                PeriodKey::Week(week.year(), week.week())
            }
        }
    }

    /// Human-readable bucket label, e.g. `2026-W42` or `2026-10-15`.
    pub fn bucket_label<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> String {
        match self.key_of(at) {
            PeriodKey::Always => "latest".to_string(),
            PeriodKey::Day(date) => date.format("%Y-%m-%d").to_string(),
            PeriodKey::Week(year, week) => format!("{year}-W{week:02}"),
        }
    }
}

// == Freshness Policy ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    /// Records at least this old always need a refresh
    pub max_age: Duration,
    pub period: RefreshPeriod,
}

impl FreshnessPolicy {
    pub fn new(max_age: Duration, period: RefreshPeriod) -> Self {
        Self { max_age, period }
    }

    /// Weekly menus: at most 7 days old and never from an earlier ISO week.
    pub fn weekly() -> Self {
        Self::new(Duration::days(7), RefreshPeriod::IsoWeek)
    }

    /// Daily data such as schedules: at most one day old, same calendar day.
    pub fn daily() -> Self {
        Self::new(Duration::days(1), RefreshPeriod::CalendarDay)
    }

    pub fn max_age(max_age: Duration) -> Self {
        Self::new(max_age, RefreshPeriod::None)
    }

    // == Needs Refresh ==
    /// Evaluates the policy against the current time, with calendar periods
    /// taken in the server's local time zone.
    pub fn needs_refresh(&self, last_updated: DateTime<Utc>) -> bool {
        self.needs_refresh_at(&last_updated.with_timezone(&Local), &Local::now())
    }

    /// Evaluates the policy at `now`. Calendar periods are computed in the
    /// time zone of each argument.
    ///
    /// First match wins:
    /// 1. age `>= max_age` → refresh;
    /// 2. `last_updated` lies in a strictly earlier period than `now` → refresh;
    /// 3. otherwise the record is fresh.
    pub fn needs_refresh_at<Tz: TimeZone>(&self, last_updated: &DateTime<Tz>, now: &DateTime<Tz>) -> bool {
        let age = now.clone().signed_duration_since(last_updated.clone());
        if age >= self.max_age {
            return true;
        }

        self.period.key_of(last_updated) < self.period.key_of(now)
    }
}
