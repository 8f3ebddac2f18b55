//! Persisted document shape shared by the local cache and the remote store.
//!
//! # Responsibility
//! - Define the wire shape `{allData, semesterList, currentSemester, ...}`.
//! - Validate and normalize a decoded document into settings + store.
//!
//! # Invariants
//! - `lastUpdated` is only ever present on documents read from the remote
//!   store; captured documents never carry it.
//! - `into_state` always yields a semester list equal (as a set) to the
//!   store keys, non-empty, with the current semester a member.

use crate::model::settings::{
    default_title, CategoryTarget, GlobalSettings, PeriodConfig, SchoolInfo,
    DEFAULT_GRADUATION_TARGET,
};
use crate::model::snapshot::{SemesterId, SemesterSnapshot, SemesterStore};
use crate::model::wire::{lenient_millis, null_as_default};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field the remote store stamps with its commit time.
pub const LAST_UPDATED_FIELD: &str = "lastUpdated";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub all_data: BTreeMap<SemesterId, SemesterSnapshot>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub semester_list: Vec<SemesterId>,
    #[serde(default)]
    pub current_semester: Option<SemesterId>,
    #[serde(default)]
    pub graduation_target: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_targets: BTreeMap<String, CategoryTarget>,
    #[serde(default)]
    pub user_school_info: Option<SchoolInfo>,
    #[serde(default)]
    pub period_config: Option<PeriodConfig>,
    #[serde(default)]
    pub payment_methods: Option<Vec<String>>,
    #[serde(default)]
    pub user_title: Option<String>,
    /// Remote commit time in epoch milliseconds.
    #[serde(
        default,
        deserialize_with = "lenient_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<i64>,
}

impl PersistedDocument {
    /// Captures settings + store as a full document without a timestamp.
    pub fn capture(settings: &GlobalSettings, store: &SemesterStore) -> Self {
        Self {
            all_data: store.clone(),
            semester_list: settings.semester_list.clone(),
            current_semester: Some(settings.current_semester.clone()),
            graduation_target: Some(settings.graduation_target),
            category_targets: settings.category_targets.clone(),
            user_school_info: Some(settings.user_school_info.clone()),
            period_config: Some(settings.period_config.clone()),
            payment_methods: Some(settings.payment_methods.clone()),
            user_title: Some(settings.user_title.clone()),
            last_updated: None,
        }
    }

    /// Drops the server-assigned timestamp; local storage cannot hold it.
    pub fn without_timestamp(mut self) -> Self {
        self.last_updated = None;
        self
    }

    /// Top-level JSON fields for a merge write.
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Ok(Map::new()),
        }
    }

    /// Decodes a document from top-level JSON fields.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(fields))
    }

    /// Normalizes this document into settings and store.
    ///
    /// Rules:
    /// - duplicate and blank ids in `semesterList` are dropped, and blank
    ///   store keys with them;
    /// - store keys missing from the list are appended in key order;
    /// - an empty list becomes `[default_semester]`;
    /// - list ids without a snapshot get the default snapshot;
    /// - a current semester outside the list falls back to the first entry;
    /// - a zero or missing graduation target falls back to the default.
    pub fn into_state(
        self,
        default_semester: &str,
        display_name: Option<&str>,
    ) -> (GlobalSettings, SemesterStore) {
        let mut store = self.all_data;
        store.retain(|id, _| !id.trim().is_empty());
        let mut semester_list: Vec<SemesterId> = Vec::with_capacity(self.semester_list.len());
        for id in self.semester_list {
            if !id.trim().is_empty() && !semester_list.contains(&id) {
                semester_list.push(id);
            }
        }
        for id in store.keys() {
            if !semester_list.contains(id) {
                semester_list.push(id.clone());
            }
        }
        if semester_list.is_empty() {
            semester_list.push(default_semester.to_string());
        }
        for id in &semester_list {
            store.entry(id.clone()).or_default();
        }

        let current_semester = self
            .current_semester
            .filter(|id| semester_list.contains(id))
            .unwrap_or_else(|| semester_list[0].clone());

        let mut settings = GlobalSettings::defaults(default_semester, display_name);
        settings.semester_list = semester_list;
        settings.current_semester = current_semester;
        settings.user_title = self
            .user_title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| default_title(display_name));
        settings.graduation_target = self
            .graduation_target
            .filter(|target| *target > 0.0)
            .unwrap_or(DEFAULT_GRADUATION_TARGET);
        settings.category_targets = self.category_targets;
        if let Some(info) = self.user_school_info {
            settings.user_school_info = info;
        }
        if let Some(config) = self.period_config {
            settings.period_config = config;
        }
        if let Some(methods) = self.payment_methods {
            settings.payment_methods = methods;
        }

        (settings, store)
    }
}
