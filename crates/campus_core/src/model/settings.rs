//! Cross-semester settings.
//!
//! # Responsibility
//! - Hold the semester index (display list + active pointer) and user
//!   preferences shared by every semester.
//! - Provide the single canonical default settings constructor.
//!
//! # Invariants
//! - `semester_list` is never empty and holds no duplicates.
//! - `current_semester` is always a member of `semester_list`.
//! - Only `Session` mutates the semester index; the accessors here are
//!   read-only so feature modules cannot break the pairing with the store.

use crate::model::snapshot::SemesterId;
use crate::model::wire::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Title shown when neither the document nor the identity provides one.
pub const DEFAULT_USER_TITLE: &str = "同學";
/// Credits required for graduation unless configured otherwise.
pub const DEFAULT_GRADUATION_TARGET: f64 = 128.0;
/// Payment methods offered to a new user.
pub const DEFAULT_PAYMENT_METHODS: [&str; 6] =
    ["現金", "一卡通", "悠遊卡", "信用卡", "行動支付", "轉帳"];

/// Credit target of one course category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryTarget {
    Total(f64),
    Split(SplitTarget),
}

/// Credit target split by course nature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitTarget {
    #[serde(alias = "必修", default, deserialize_with = "null_as_default")]
    pub required: f64,
    #[serde(alias = "選修", default, deserialize_with = "null_as_default")]
    pub elective: f64,
}

/// Which value of a category target an update addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPart {
    Total,
    Required,
    Elective,
}

impl CategoryTarget {
    /// Credits required across both parts.
    pub fn total(&self) -> f64 {
        match self {
            Self::Total(value) => *value,
            Self::Split(split) => split.required + split.elective,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolInfo {
    pub school: String,
    pub department: String,
}

/// Timing used to derive period start times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeriodConfig {
    #[serde(alias = "classDur")]
    pub class_duration_min: u32,
    #[serde(alias = "breakDur")]
    pub break_duration_min: u32,
    /// `HH:MM` start of the first period.
    #[serde(alias = "startHash")]
    pub day_start_time: String,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            class_duration_min: 50,
            break_duration_min: 10,
            day_start_time: "08:10".to_string(),
        }
    }
}

/// Settings shared by every semester of one user.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSettings {
    pub(crate) semester_list: Vec<SemesterId>,
    pub(crate) current_semester: SemesterId,
    pub user_title: String,
    pub graduation_target: f64,
    pub category_targets: BTreeMap<String, CategoryTarget>,
    pub user_school_info: SchoolInfo,
    pub period_config: PeriodConfig,
    pub payment_methods: Vec<String>,
}

impl GlobalSettings {
    /// Canonical defaults: one semester, which is also the current one.
    pub fn defaults(semester: &str, display_name: Option<&str>) -> Self {
        Self {
            semester_list: vec![semester.to_string()],
            current_semester: semester.to_string(),
            user_title: default_title(display_name),
            graduation_target: DEFAULT_GRADUATION_TARGET,
            category_targets: BTreeMap::new(),
            user_school_info: SchoolInfo::default(),
            period_config: PeriodConfig::default(),
            payment_methods: DEFAULT_PAYMENT_METHODS
                .iter()
                .map(|method| method.to_string())
                .collect(),
        }
    }

    /// Semesters in display order.
    pub fn semester_list(&self) -> &[SemesterId] {
        &self.semester_list
    }

    /// The active semester.
    pub fn current_semester(&self) -> &str {
        &self.current_semester
    }

    /// Whether `semester` is known.
    pub fn has_semester(&self, semester: &str) -> bool {
        self.semester_list.iter().any(|known| known == semester)
    }
}

/// Display name when present and not blank, otherwise the generic title.
pub(crate) fn default_title(display_name: Option<&str>) -> String {
    display_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_USER_TITLE)
        .to_string()
}
