//! Timer-driven reminder checks.
//!
//! # Responsibility
//! - Emit course reminders a fixed lead time before class.
//! - Emit one morning briefing per calendar date.
//! - Own the re-armable interval timer the host drives via `tick`.
//!
//! # Invariants
//! - At most one timer generation is live; re-arming cancels the previous one.
//! - Re-arming runs a check immediately.
//! - A course reminder is not repeated for the same day/subject/time within
//!   the dedupe window.
//! - Reminder text carries user content; log events carry only counts.

use crate::config::ReminderConfig;
use crate::model::schedule::{day_key, Course};
use crate::service::session::Session;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use log::info;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Course,
    DailyBriefing,
}

/// One notification ready for the host's delivery channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub kind: ReminderKind,
    pub title: String,
    pub body: String,
}

/// Fixed-interval timer whose due time is polled by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTimer {
    interval: Duration,
    generation: u64,
    next_due: Option<NaiveDateTime>,
}

impl ReminderTimer {
    pub fn new(interval_secs: u64) -> Self {
        let secs = i64::try_from(interval_secs).unwrap_or(i64::MAX).clamp(1, 86_400);
        Self {
            interval: Duration::seconds(secs),
            generation: 0,
            next_due: None,
        }
    }

    /// Starts a new generation due immediately; returns its number.
    pub fn arm(&mut self, now: NaiveDateTime) -> u64 {
        self.generation += 1;
        self.next_due = Some(now);
        self.generation
    }

    pub fn cancel(&mut self) {
        if self.next_due.take().is_some() {
            self.generation += 1;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn next_due(&self) -> Option<NaiveDateTime> {
        self.next_due
    }

    /// Returns whether a check is due at `now`, scheduling the next one.
    pub fn poll(&mut self, now: NaiveDateTime) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

/// Course reminders and the daily briefing.
#[derive(Debug, Clone)]
pub struct ReminderService {
    config: ReminderConfig,
    timer: ReminderTimer,
    sent_courses: BTreeMap<String, NaiveDateTime>,
    briefed_dates: BTreeSet<NaiveDate>,
}

impl ReminderService {
    pub fn new(config: ReminderConfig) -> Self {
        Self {
            config,
            timer: ReminderTimer::new(config.interval_secs),
            sent_courses: BTreeMap::new(),
            briefed_dates: BTreeSet::new(),
        }
    }

    pub fn timer(&self) -> &ReminderTimer {
        &self.timer
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_armed()
    }

    /// Arms a fresh timer and runs the first check right away.
    pub fn start(&mut self, session: &Session, now: NaiveDateTime) -> Vec<Reminder> {
        let generation = self.timer.arm(now);
        info!("event=reminder_arm module=reminder status=ok generation={generation}");
        self.tick(session, now)
    }

    pub fn stop(&mut self) {
        self.timer.cancel();
        info!(
            "event=reminder_arm module=reminder status=skipped reason=stopped generation={}",
            self.timer.generation()
        );
    }

    /// Runs a check when the timer is due; otherwise returns nothing.
    pub fn tick(&mut self, session: &Session, now: NaiveDateTime) -> Vec<Reminder> {
        if !self.timer.poll(now) {
            return Vec::new();
        }
        let reminders = self.check(session, now);
        info!(
            "event=reminder_tick module=reminder status=ok emitted={}",
            reminders.len()
        );
        reminders
    }

    /// One reminder check at `now`, independent of the timer.
    pub fn check(&mut self, session: &Session, now: NaiveDateTime) -> Vec<Reminder> {
        let mut reminders = self.course_reminders(session, now);
        reminders.extend(self.daily_briefing(session, now));
        reminders
    }

    fn course_reminders(&mut self, session: &Session, now: NaiveDateTime) -> Vec<Reminder> {
        let ttl = Duration::seconds(self.config.dedupe_ttl_secs.max(0));
        self.sent_courses.retain(|_, sent_at| now - *sent_at < ttl);

        let snapshot = session.working();
        if !snapshot.notification_settings.course {
            return Vec::new();
        }

        let day = day_key(now.weekday());
        let mut reminders = Vec::new();
        for course in snapshot.schedule.day(&day) {
            let Some(start) = course.start_time() else {
                continue;
            };
            let minutes_left = (now.date().and_time(start) - now).num_seconds().div_euclid(60);
            if minutes_left != self.config.lead_minutes {
                continue;
            }
            let key = format!("{day}_{}_{}", course.subject, course.time);
            if self.sent_courses.contains_key(&key) {
                continue;
            }
            self.sent_courses.insert(key, now);
            reminders.push(course_reminder(course));
        }
        reminders
    }

    fn daily_briefing(&mut self, session: &Session, now: NaiveDateTime) -> Option<Reminder> {
        let snapshot = session.working();
        if !snapshot.notification_settings.daily || now.hour() != self.config.briefing_hour {
            return None;
        }
        let today = now.date();
        if !self.briefed_dates.insert(today) {
            return None;
        }

        let today_iso = today.format("%Y-%m-%d").to_string();
        let mut lines = Vec::new();
        for event in &snapshot.calendar_events {
            if event.start.get(..10) == Some(today_iso.as_str()) {
                lines.push(format!("行事曆：{}", event.title));
            }
        }
        if snapshot.notification_settings.anniversary {
            for anniversary in &snapshot.anniversaries {
                let Ok(date) = NaiveDate::parse_from_str(&anniversary.date, "%Y-%m-%d") else {
                    continue;
                };
                if date.month() == today.month() && date.day() == today.day() {
                    lines.push(format!("紀念日：{} (就是今天！)", anniversary.title));
                }
            }
        }
        let day = day_key(now.weekday());
        if let Some(first) = snapshot
            .schedule
            .day(&day)
            .iter()
            .min_by(|a, b| clock_or_late(a).cmp(clock_or_late(b)))
        {
            lines.push(format!("第一堂課：{} {}", first.time, first.subject));
        }

        if lines.is_empty() {
            return None;
        }
        Some(Reminder {
            kind: ReminderKind::DailyBriefing,
            title: "早安！今日校園快報".to_string(),
            body: lines.join("\n"),
        })
    }
}

fn course_reminder(course: &Course) -> Reminder {
    let room = if course.room.trim().is_empty() {
        "未定"
    } else {
        course.room.as_str()
    };
    Reminder {
        kind: ReminderKind::Course,
        title: format!("上課提醒：{}", course.subject),
        body: format!("時間：{}\n地點：{}", course.time, room),
    }
}

fn clock_or_late(course: &Course) -> &str {
    if course.time.is_empty() {
        "23:59"
    } else {
        &course.time
    }
}
