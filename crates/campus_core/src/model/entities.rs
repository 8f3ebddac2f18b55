//! Per-semester record types consumed by feature modules.
//!
//! Field names follow the persisted document, so records written by older
//! clients load unchanged. Optional fields stay `Option` instead of sentinel
//! values; feature modules decide what a missing value means.
//!
//! Numeric fields read `null` (a non-finite number on the wire) as zero, so
//! one damaged record cannot reject a whole document.

use crate::model::wire::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Client-assigned record id (epoch milliseconds at creation).
pub type EntityId = i64;

/// Grade category that is always earned and never averaged.
pub const SELF_STUDY_CATEGORY: &str = "自主學習";

/// One finished course with its final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeItem {
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub credit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,
}

impl GradeItem {
    /// Whether this grade is self-directed study.
    pub fn is_self_study(&self) -> bool {
        self.category.as_deref() == Some(SELF_STUDY_CATEGORY)
    }
}

/// One quiz or exam result recorded under a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Exam records keyed by subject.
pub type ExamBook = BTreeMap<String, Vec<ExamRecord>>;

/// Direction of money movement for one ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    /// Moves `amount` from `method` to `to_method`.
    Transfer,
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingItem {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub method: String,
    /// Serialized as `to_method`, the one snake_case field of the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: EntityId,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anniversary {
    pub id: EntityId,
    pub title: String,
    /// `YYYY-MM-DD`; only month and day matter for recurrence.
    pub date: String,
}

/// Quick note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub content: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkItem {
    pub id: EntityId,
    pub subject: String,
    pub title: String,
    /// Due date, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

/// Self-paced learning goal with progress counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningTask {
    pub id: EntityId,
    pub subject: String,
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: f64,
    #[serde(default)]
    pub unit: String,
}

impl LearningTask {
    /// Completion ratio in `0.0..=1.0`; zero when `total` is not positive.
    pub fn progress(&self) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        (self.current / self.total).clamp(0.0, 1.0)
    }
}

/// Lottery draw options, either one flat list or named categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LotteryPool {
    Items(Vec<String>),
    Categories(BTreeMap<String, Vec<String>>),
}

impl Default for LotteryPool {
    fn default() -> Self {
        Self::Items(Vec::new())
    }
}

impl LotteryPool {
    /// Number of options across all categories.
    pub fn len(&self) -> usize {
        match self {
            Self::Items(items) => items.len(),
            Self::Categories(categories) => categories.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{AccountingItem, GradeItem, LearningTask, LotteryPool, TransactionKind};

    #[test]
    fn accounting_item_uses_type_and_to_method_on_the_wire() {
        let item = AccountingItem {
            date: "2025-09-01".to_string(),
            title: "top-up".to_string(),
            amount: 500.0,
            kind: TransactionKind::Transfer,
            method: "cash".to_string(),
            to_method: Some("card".to_string()),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "transfer");
        assert_eq!(json["to_method"], "card");
    }

    #[test]
    fn lottery_pool_reads_both_shapes() {
        let flat: LotteryPool = serde_json::from_str(r#"["noodles","rice"]"#).unwrap();
        assert_eq!(flat.len(), 2);

        let grouped: LotteryPool =
            serde_json::from_str(r#"{"lunch":["noodles"],"dinner":["hotpot","curry"]}"#).unwrap();
        assert!(matches!(grouped, LotteryPool::Categories(_)));
        assert_eq!(grouped.len(), 3);
    }

    #[test]
    fn learning_progress_is_clamped() {
        let mut task = LearningTask {
            id: 1,
            subject: "English".to_string(),
            content: "vocabulary".to_string(),
            current: 30.0,
            total: 20.0,
            unit: "words".to_string(),
        };
        assert_eq!(task.progress(), 1.0);
        task.total = 0.0;
        assert_eq!(task.progress(), 0.0);
    }

    #[test]
    fn null_numbers_read_as_zero() {
        let task: LearningTask = serde_json::from_str(
            r#"{"id":7,"subject":"Math","content":"drills","current":3,"total":null,"unit":"pages"}"#,
        )
        .unwrap();
        assert_eq!(task.total, 0.0);
        assert_eq!(task.progress(), 0.0);

        let grade: GradeItem =
            serde_json::from_str(r#"{"subject":"Physics","score":null,"credit":3}"#).unwrap();
        assert_eq!(grade.score, 0.0);
        assert_eq!(grade.credit, 3.0);
    }
}
