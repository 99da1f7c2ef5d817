//! Work-schedule evaluation
//!
//! Decides whether a given instant falls inside any configured work
//! session. Pure functions only; safe to call concurrently from every
//! loop that holds a configuration snapshot.

use chrono::{DateTime, Datelike, Local, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Time-of-day format used for session bounds (`"08:00"`, `"17:30"`)
pub const SESSION_TIME_FORMAT: &str = "%H:%M";

/// One contiguous work interval within a day.
///
/// Bounds are kept as raw `HH:MM` strings so that a session that fails to
/// parse can be skipped at evaluation time instead of poisoning the whole
/// schedule. Configuration validation rejects malformed sessions up
/// front; the skip path only matters for schedules built by hand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkSession {
    /// Session start, inclusive of nothing: the exact start instant is
    /// not work time
    pub start: String,
    /// Session end, likewise exclusive
    pub end: String,
}

impl WorkSession {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Weekly schedule: lowercase weekday name to ordered session list.
///
/// Days that are absent or map to an empty list are never work time.
pub type WorkSchedule = BTreeMap<String, Vec<WorkSession>>;

/// Lowercase English key for a weekday, matching the configuration keys
pub fn weekday_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parse an `HH:MM` session bound
pub fn parse_session_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, SESSION_TIME_FORMAT).ok()
}

/// Returns true iff `now` lies strictly inside one of the sessions
/// configured for its weekday.
///
/// Bounds are exclusive on both ends: at exactly `start` or exactly `end`
/// the instant counts as outside work hours.
pub fn is_work_time(now: DateTime<Local>, schedule: &WorkSchedule) -> bool {
    let sessions = match schedule.get(weekday_key(now.weekday())) {
        Some(sessions) if !sessions.is_empty() => sessions,
        _ => return false,
    };

    let date = now.date_naive();
    let instant = now.naive_local();

    sessions.iter().any(|session| {
        let (start, end) = match (
            parse_session_time(&session.start),
            parse_session_time(&session.end),
        ) {
            (Some(start), Some(end)) => (date.and_time(start), date.and_time(end)),
            // Malformed session: skip it, keep evaluating the rest
            _ => return false,
        };
        instant > start && instant < end
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn weekday_schedule() -> WorkSchedule {
        let mut schedule = WorkSchedule::new();
        schedule.insert(
            "monday".to_string(),
            vec![
                WorkSession::new("08:00", "12:00"),
                WorkSession::new("13:00", "17:00"),
            ],
        );
        schedule.insert("saturday".to_string(), vec![]);
        schedule
    }

    #[test]
    fn test_weekday_keys_are_lowercase() {
        assert_eq!(weekday_key(Weekday::Mon), "monday");
        assert_eq!(weekday_key(Weekday::Sun), "sunday");
    }

    #[test]
    fn test_parse_session_time() {
        let parsed = parse_session_time("09:30").unwrap();
        assert_eq!(parsed, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(parse_session_time("9h30").is_none());
        assert!(parse_session_time("25:00").is_none());
    }

    #[test]
    fn test_inside_session() {
        // 2025-04-07 is a Monday
        let schedule = weekday_schedule();
        assert!(is_work_time(local(2025, 4, 7, 9, 0, 0), &schedule));
        assert!(is_work_time(local(2025, 4, 7, 14, 30, 0), &schedule));
    }

    #[test]
    fn test_between_sessions() {
        let schedule = weekday_schedule();
        assert!(!is_work_time(local(2025, 4, 7, 12, 30, 0), &schedule));
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let schedule = weekday_schedule();
        assert!(!is_work_time(local(2025, 4, 7, 8, 0, 0), &schedule));
        assert!(!is_work_time(local(2025, 4, 7, 12, 0, 0), &schedule));
        // One second past the boundary counts
        assert!(is_work_time(local(2025, 4, 7, 8, 0, 1), &schedule));
    }

    #[test]
    fn test_absent_day_is_never_work_time() {
        let schedule = weekday_schedule();
        // 2025-04-08 is a Tuesday, which the schedule does not mention
        assert!(!is_work_time(local(2025, 4, 8, 9, 0, 0), &schedule));
    }

    #[test]
    fn test_empty_session_list_is_never_work_time() {
        let schedule = weekday_schedule();
        // 2025-04-12 is a Saturday, present but empty
        assert!(!is_work_time(local(2025, 4, 12, 9, 0, 0), &schedule));
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = WorkSchedule::new();
        assert!(!is_work_time(local(2025, 4, 7, 9, 0, 0), &schedule));
    }

    #[test]
    fn test_malformed_session_is_skipped() {
        let mut schedule = WorkSchedule::new();
        schedule.insert(
            "monday".to_string(),
            vec![
                WorkSession::new("nonsense", "12:00"),
                WorkSession::new("13:00", "17:00"),
            ],
        );
        // The malformed first session never matches
        assert!(!is_work_time(local(2025, 4, 7, 9, 0, 0), &schedule));
        // The valid second session still does
        assert!(is_work_time(local(2025, 4, 7, 14, 0, 0), &schedule));
    }

}
