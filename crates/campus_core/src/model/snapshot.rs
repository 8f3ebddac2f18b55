//! Semester snapshot: the unit of persisted per-term data.
//!
//! # Responsibility
//! - Bundle every per-semester collection into one record.
//! - Provide the single canonical default snapshot.
//!
//! # Invariants
//! - A deserialized snapshot is always fully initialized: missing or `null`
//!   collections become empty, a missing schedule becomes the canonical
//!   five-weekday shape.

use crate::model::entities::{
    AccountingItem, Anniversary, CalendarEvent, ExamBook, GradeItem, HomeworkItem, LearningTask,
    LotteryPool, Note,
};
use crate::model::schedule::WeeklySchedule;
use crate::model::wire::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User-chosen semester label such as `"114-1"`.
pub type SemesterId = String;

/// Snapshots keyed by semester id.
pub type SemesterStore = BTreeMap<SemesterId, SemesterSnapshot>;

/// Reminder toggles; every kind is enabled unless turned off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub course: bool,
    pub daily: bool,
    pub anniversary: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            course: true,
            daily: true,
            anniversary: true,
        }
    }
}

/// All per-semester collections of one user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SemesterSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub schedule: WeeklySchedule,
    #[serde(deserialize_with = "null_as_default")]
    pub grades: Vec<GradeItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub regular_exams: ExamBook,
    #[serde(deserialize_with = "null_as_default")]
    pub midterm_exams: ExamBook,
    #[serde(deserialize_with = "null_as_default")]
    pub calendar_events: Vec<CalendarEvent>,
    #[serde(deserialize_with = "null_as_default")]
    pub accounting: Vec<AccountingItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: Vec<Note>,
    #[serde(deserialize_with = "null_as_default")]
    pub anniversaries: Vec<Anniversary>,
    #[serde(deserialize_with = "null_as_default")]
    pub learning: Vec<LearningTask>,
    #[serde(deserialize_with = "null_as_default")]
    pub homework: Vec<HomeworkItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub lottery: LotteryPool,
    /// `YYYY-MM-DD`, empty when unset.
    #[serde(deserialize_with = "null_as_default")]
    pub start_date: String,
    /// `YYYY-MM-DD`, empty when unset.
    #[serde(deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notification_settings: NotificationSettings,
}

impl SemesterSnapshot {
    /// Whether the snapshot carries no user data at all.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}
