//! Weekly course schedule model.
//!
//! # Responsibility
//! - Hold the per-weekday course lists of one semester.
//! - Own the course placement rule used by schedule editors.
//!
//! # Invariants
//! - Day keys are `"0"`..`"6"`, counted from Sunday.
//! - The canonical default schedule carries keys `"1"`..`"5"`, each empty.
//! - After `place_course`, a period holds at most one course on that day.

use chrono::{NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})").expect("valid clock regex"));

/// Weekday key, `"0"` for Sunday through `"6"` for Saturday.
pub type DayKey = String;

/// One course occupying one period on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Period label, usually numeric (`"1"`) but letters (`"A"`) occur.
    pub period: String,
    /// Start time as `HH:MM`; may be empty when unknown.
    #[serde(default)]
    pub time: String,
    pub subject: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Course {
    /// Creates a course with empty presentation fields.
    pub fn new(
        period: impl Into<String>,
        time: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            period: period.into(),
            time: time.into(),
            subject: subject.into(),
            room: String::new(),
            teacher: String::new(),
            color: String::new(),
            nature: None,
            category: None,
        }
    }

    /// Parsed start time, `None` when `time` is not `HH:MM`.
    pub fn start_time(&self) -> Option<NaiveTime> {
        parse_clock(&self.time)
    }
}

/// Course lists keyed by weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule(BTreeMap<DayKey, Vec<Course>>);

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::canonical()
    }
}

impl WeeklySchedule {
    /// Monday..Friday keys, each with an empty course list.
    pub fn canonical() -> Self {
        Self((1..=5_u32).map(|day| (day.to_string(), Vec::new())).collect())
    }

    /// Returns the courses stored under `day`, or an empty slice.
    pub fn day(&self, day: &str) -> &[Course] {
        self.0.get(day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the courses of one weekday.
    pub fn courses_on(&self, weekday: Weekday) -> &[Course] {
        self.day(&day_key(weekday))
    }

    /// Returns one day's courses sorted by period, numbers before letters.
    pub fn sorted_day(&self, day: &str) -> Vec<&Course> {
        let mut courses = self.day(day).iter().collect::<Vec<_>>();
        courses.sort_by(|a, b| compare_periods(&a.period, &b.period));
        courses
    }

    /// Day keys present in this schedule.
    pub fn day_keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Places `template` into every period of `periods` on `day`.
    ///
    /// A course already occupying one of those periods is replaced. The day
    /// entry is created when missing (weekend keys are not in the default).
    pub fn place_course(&mut self, day: &str, periods: RangeInclusive<u32>, template: &Course) {
        let courses = self.0.entry(day.to_string()).or_default();
        for period in periods {
            let label = period.to_string();
            courses.retain(|course| course.period != label);
            let mut course = template.clone();
            course.period = label;
            courses.push(course);
        }
    }
}

/// Converts a weekday into its schedule key.
pub fn day_key(weekday: Weekday) -> DayKey {
    weekday.num_days_from_sunday().to_string()
}

/// Parses `HH:MM` (leading spaces and trailing text tolerated).
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let caps = CLOCK_RE.captures(value)?;
    let hour = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let minute = caps.get(2)?.as_str().parse::<u32>().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn compare_periods(left: &str, right: &str) -> Ordering {
    match (left.parse::<u32>(), right.parse::<u32>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}
