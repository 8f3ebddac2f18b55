//! Settings-page operations over the session.
//!
//! These only mutate in-memory state; callers persist afterwards.

use crate::model::settings::{
    default_title, CategoryTarget, PeriodConfig, SchoolInfo, TargetPart,
    DEFAULT_GRADUATION_TARGET,
};
use crate::service::session::Session;
use chrono::{NaiveDate, NaiveDateTime};

const SECS_PER_DAY: i64 = 24 * 60 * 60;
const LAST_TEACHING_WEEK: i64 = 20;

/// Where today falls relative to the semester start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemesterPhase {
    DaysUntilStart(i64),
    /// 1-based teaching week, at most 20.
    Week(u32),
    Ended,
}

/// Sets the greeting title; a blank title falls back to the default one.
pub fn set_user_title(session: &mut Session, title: &str) {
    let title = title.trim();
    session.settings.user_title = if title.is_empty() {
        let display_name = session.user().and_then(|user| user.display_name.clone());
        default_title(display_name.as_deref())
    } else {
        title.to_string()
    };
}

/// Sets the graduation credit target; non-positive values reset it.
pub fn set_graduation_target(session: &mut Session, target: f64) {
    session.settings.graduation_target = if target.is_finite() && target > 0.0 {
        target
    } else {
        DEFAULT_GRADUATION_TARGET
    };
}

/// Updates one category's credit target.
///
/// A split target keeps its shape when a single part is addressed; every
/// other combination stores `value` as the category total.
pub fn update_category_target(session: &mut Session, category: &str, part: TargetPart, value: f64) {
    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    let targets = &mut session.settings.category_targets;
    match (targets.get_mut(category), part) {
        (Some(CategoryTarget::Split(split)), TargetPart::Required) => split.required = value,
        (Some(CategoryTarget::Split(split)), TargetPart::Elective) => split.elective = value,
        _ => {
            targets.insert(category.to_string(), CategoryTarget::Total(value));
        }
    }
}

/// Appends a payment method; returns `false` for blank or known names.
pub fn add_payment_method(session: &mut Session, name: &str) -> bool {
    let name = name.trim();
    let methods = &mut session.settings.payment_methods;
    if name.is_empty() || methods.iter().any(|known| known == name) {
        return false;
    }
    methods.push(name.to_string());
    true
}

pub fn set_school_info(session: &mut Session, info: SchoolInfo) {
    session.settings.user_school_info = info;
}

pub fn set_period_config(session: &mut Session, config: PeriodConfig) {
    session.settings.period_config = config;
}

/// Stores the current semester's start and end dates (`YYYY-MM-DD` or empty).
pub fn set_semester_dates(session: &mut Session, start: &str, end: &str) {
    let working = session.working_mut();
    working.start_date = start.trim().to_string();
    working.end_date = end.trim().to_string();
}

/// Phase of the semester starting on `start_date` (midnight) as seen at `now`.
///
/// Returns `None` when the start date is empty or not `YYYY-MM-DD`.
pub fn semester_phase(start_date: &str, now: NaiveDateTime) -> Option<SemesterPhase> {
    let start = NaiveDate::parse_from_str(start_date.trim(), "%Y-%m-%d").ok()?;
    let elapsed = (now - start.and_hms_opt(0, 0, 0)?).num_seconds();
    let week_secs = 7 * SECS_PER_DAY;
    let weeks = elapsed.div_euclid(week_secs) + i64::from(elapsed.rem_euclid(week_secs) != 0);

    Some(match weeks {
        w if w <= 0 => SemesterPhase::DaysUntilStart(elapsed.div_euclid(SECS_PER_DAY).abs()),
        w if w <= LAST_TEACHING_WEEK => SemesterPhase::Week(w as u32),
        _ => SemesterPhase::Ended,
    })
}
