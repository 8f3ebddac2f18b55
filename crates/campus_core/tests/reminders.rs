use campus_core::model::entities::{Anniversary, CalendarEvent};
use campus_core::model::schedule::Course;
use campus_core::service::reminder::{ReminderKind, ReminderService};
use campus_core::{ReminderConfig, Session};
use chrono::{NaiveDate, NaiveDateTime};

// 2025-09-08 is a Monday (schedule key "1").
fn monday(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 8)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

fn session_with_courses() -> Session {
    let mut session = Session::new("114-1");
    let mut calculus = Course::new("", "08:10", "Calculus");
    calculus.room = "A101".to_string();
    let schedule = &mut session.working_mut().schedule;
    schedule.place_course("1", 1..=1, &calculus);
    schedule.place_course("1", 3..=3, &Course::new("", "10:10", "Economics"));
    session
}

#[test]
fn course_reminder_fires_at_lead_time_once() {
    let session = session_with_courses();
    let mut service = ReminderService::new(ReminderConfig::default());

    let fired = service.check(&session, monday(8, 0, 0));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].kind, ReminderKind::Course);
    assert_eq!(fired[0].title, "上課提醒：Calculus");
    assert_eq!(fired[0].body, "時間：08:10\n地點：A101");

    assert!(service.check(&session, monday(8, 0, 20)).is_empty());
    assert!(service.check(&session, monday(8, 1, 0)).is_empty());
}

#[test]
fn minute_difference_is_floored() {
    let session = session_with_courses();
    let mut service = ReminderService::new(ReminderConfig::default());

    // 10m30s before class still counts as ten minutes.
    let fired = service.check(&session, monday(9, 59, 30));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].title, "上課提醒：Economics");
}

#[test]
fn dedupe_expires_after_ttl() {
    let session = session_with_courses();
    let config = ReminderConfig {
        dedupe_ttl_secs: 30,
        briefing_hour: 6,
        ..ReminderConfig::default()
    };
    let mut service = ReminderService::new(config);

    assert_eq!(service.check(&session, monday(7, 59, 10)).len(), 1);
    assert!(service.check(&session, monday(7, 59, 20)).is_empty());
    assert_eq!(service.check(&session, monday(7, 59, 50)).len(), 1);
}

#[test]
fn disabled_course_toggle_suppresses_reminders() {
    let mut session = session_with_courses();
    session.working_mut().notification_settings.course = false;
    let mut service = ReminderService::new(ReminderConfig::default());
    assert!(service.check(&session, monday(8, 0, 0)).is_empty());
}

#[test]
fn daily_briefing_lists_today_once_per_date() {
    let mut session = session_with_courses();
    let working = session.working_mut();
    working.calendar_events.push(CalendarEvent {
        id: 1,
        title: "Club fair".to_string(),
        start: "2025-09-08".to_string(),
        end: None,
        is_all_day: true,
        start_time: None,
        end_time: None,
    });
    working.calendar_events.push(CalendarEvent {
        id: 2,
        title: "Later".to_string(),
        start: "2025-09-09".to_string(),
        end: None,
        is_all_day: true,
        start_time: None,
        end_time: None,
    });
    working.anniversaries.push(Anniversary {
        id: 3,
        title: "Team founded".to_string(),
        date: "2021-09-08".to_string(),
    });

    let mut service = ReminderService::new(ReminderConfig::default());
    let fired = service.check(&session, monday(7, 5, 0));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].kind, ReminderKind::DailyBriefing);
    assert_eq!(fired[0].title, "早安！今日校園快報");
    assert_eq!(
        fired[0].body,
        "行事曆：Club fair\n紀念日：Team founded (就是今天！)\n第一堂課：08:10 Calculus"
    );

    assert!(service.check(&session, monday(7, 45, 0)).is_empty());
}

#[test]
fn briefing_respects_hour_and_anniversary_toggle() {
    let mut session = Session::new("114-1");
    session.working_mut().anniversaries.push(Anniversary {
        id: 1,
        title: "Birthday".to_string(),
        date: "2004-09-08".to_string(),
    });
    session.working_mut().notification_settings.anniversary = false;

    let mut service = ReminderService::new(ReminderConfig::default());
    assert!(service.check(&session, monday(6, 59, 0)).is_empty());
    assert!(service.check(&session, monday(7, 0, 0)).is_empty());
}

#[test]
fn timer_drives_checks_at_the_configured_interval() {
    let session = session_with_courses();
    let mut service = ReminderService::new(ReminderConfig {
        briefing_hour: 6,
        ..ReminderConfig::default()
    });

    assert!(service.start(&session, monday(7, 59, 0)).is_empty());
    assert!(service.is_running());
    let first_generation = service.timer().generation();

    assert!(service.tick(&session, monday(7, 59, 30)).is_empty());
    let fired = service.tick(&session, monday(8, 0, 0));
    assert_eq!(fired.len(), 1);

    service.start(&session, monday(8, 0, 10));
    assert!(service.timer().generation() > first_generation);

    service.stop();
    assert!(!service.is_running());
    assert!(service.tick(&session, monday(9, 59, 30)).is_empty());
}
