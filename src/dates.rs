//! Due-date parsing and formatting.
//!
//! The `due` subcommand and the TUI date prompt accept human-friendly input
//! on top of plain ISO dates.

use chrono::{Datelike, Duration, NaiveDate};

/// Parse human-readable due date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow"
/// - weekday names ("friday"), "next monday"
/// - "end of week" / "eow"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" format
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "end of week" | "eow" => {
            // ISO week: Monday start.
            let weekday = today.weekday().num_days_from_monday() as i64;
            return Some(today - Duration::days(weekday) + Duration::days(6));
        }
        _ => {}
    }

    // "in X" patterns
    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }

    // Weekday patterns
    let weekdays = [
        ("monday", 0),
        ("tuesday", 1),
        ("wednesday", 2),
        ("thursday", 3),
        ("friday", 4),
        ("saturday", 5),
        ("sunday", 6),
        ("mon", 0),
        ("tue", 1),
        ("wed", 2),
        ("thu", 3),
        ("fri", 4),
        ("sat", 5),
        ("sun", 6),
    ];

    let current_day = today.weekday().num_days_from_monday() as i32;
    for (day_name, target_day) in weekdays {
        let days_ahead = (target_day + 7 - current_day) % 7;
        if s == day_name {
            // This week's occurrence, today included.
            return Some(today + Duration::days(days_ahead as i64));
        }
        if s == format!("next {}", day_name) {
            let days_to_add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days_to_add as i64));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let days = (d - today).num_days();
            match days {
                0 => "today".into(),
                1 => "tomorrow".into(),
                d if d > 1 => format!("in {}d", d),
                d => format!("{}d late", -d),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thursday() -> NaiveDate {
        // 2026-08-27 is a Thursday.
        NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()
    }

    #[test]
    fn test_parse_simple_keywords() {
        let today = thursday();
        assert_eq!(parse_due_input("today", today), Some(today));
        assert_eq!(
            parse_due_input("Tomorrow", today),
            Some(today + Duration::days(1))
        );
        assert_eq!(
            parse_due_input("eow", today),
            NaiveDate::from_ymd_opt(2026, 8, 30)
        );
    }

    #[test]
    fn test_parse_relative_offsets() {
        let today = thursday();
        assert_eq!(
            parse_due_input("in 3d", today),
            Some(today + Duration::days(3))
        );
        assert_eq!(
            parse_due_input("in 2w", today),
            Some(today + Duration::weeks(2))
        );
    }

    #[test]
    fn test_parse_weekdays() {
        let today = thursday();
        // Coming Monday.
        assert_eq!(
            parse_due_input("monday", today),
            NaiveDate::from_ymd_opt(2026, 8, 31)
        );
        // "next thursday" from a Thursday is a full week out.
        assert_eq!(
            parse_due_input("next thursday", today),
            NaiveDate::from_ymd_opt(2026, 9, 3)
        );
        // A bare weekday matching today resolves to today.
        assert_eq!(parse_due_input("thursday", today), Some(today));
    }

    #[test]
    fn test_parse_iso_and_garbage() {
        let today = thursday();
        assert_eq!(
            parse_due_input("2026-12-24", today),
            NaiveDate::from_ymd_opt(2026, 12, 24)
        );
        assert_eq!(parse_due_input("someday", today), None);
    }

    #[test]
    fn test_format_due_relative() {
        let today = thursday();
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(
            format_due_relative(Some(today + Duration::days(4)), today),
            "in 4d"
        );
        assert_eq!(
            format_due_relative(Some(today - Duration::days(2)), today),
            "2d late"
        );
    }
}
