//! Grade aggregates for the dashboard and the semester trend chart.

use crate::model::entities::GradeItem;
use crate::model::snapshot::SemesterId;
use crate::service::session::Session;

pub const PASSING_SCORE: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeSummary {
    /// Credit-weighted average; self-study courses are excluded.
    pub weighted_average: f64,
    pub earned_credits: f64,
    pub failed_count: usize,
    /// Earned credits over the graduation target, capped at 100.
    pub progress_percent: f64,
}

/// Summarizes `grades` against `graduation_target`.
pub fn summarize(grades: &[GradeItem], graduation_target: f64) -> GradeSummary {
    let mut earned_credits = 0.0;
    let mut failed_count = 0;
    for grade in grades {
        if grade.score >= PASSING_SCORE || grade.is_self_study() {
            earned_credits += grade.credit;
        } else {
            failed_count += 1;
        }
    }

    let progress_percent = if graduation_target > 0.0 {
        (earned_credits / graduation_target * 100.0).min(100.0)
    } else {
        0.0
    };

    GradeSummary {
        weighted_average: weighted_average(grades).unwrap_or(0.0),
        earned_credits,
        failed_count,
        progress_percent,
    }
}

/// Credit-weighted average, `None` when no counted credits exist.
pub fn weighted_average(grades: &[GradeItem]) -> Option<f64> {
    let (credits, weighted) = grades
        .iter()
        .filter(|grade| !grade.is_self_study())
        .fold((0.0, 0.0), |(credits, weighted), grade| {
            (credits + grade.credit, weighted + grade.score * grade.credit)
        });
    (credits > 0.0).then(|| weighted / credits)
}

/// Current semester summary from the working state.
pub fn current_summary(session: &Session) -> GradeSummary {
    summarize(&session.working().grades, session.settings().graduation_target)
}

/// Per-semester averages in list order; semesters without counted credits
/// are skipped.
pub fn semester_trend(session: &Session) -> Vec<(SemesterId, f64)> {
    session
        .semester_list()
        .iter()
        .filter_map(|id| {
            let snapshot = session.snapshot(id)?;
            weighted_average(&snapshot.grades).map(|average| (id.clone(), average))
        })
        .collect()
}
