use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// One row per (employee, calendar day). `date` is the UTC day; the
/// (employee_id, date) unique key enforces at-most-one record per day.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-01-01T09:00:00", format = "date-time", value_type = String)]
    pub clock_in: Option<NaiveDateTime>,
    #[schema(example = "2026-01-01T17:00:00", format = "date-time", value_type = String)]
    pub clock_out: Option<NaiveDateTime>,
    pub break_minutes: i32,
    #[schema(example = 8.0)]
    pub total_work_hours: f64,
    #[schema(example = "present", value_type = String)]
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    OnLeave,
    Holiday,
    Weekend,
}

/// Worked hours between clock-in and clock-out, minus the recorded break,
/// rounded to 2 decimal places. Not clamped: a clock-out before clock-in is
/// inconsistent data and shows up as a negative number rather than being
/// silently corrected.
pub fn compute_work_hours(
    clock_in: NaiveDateTime,
    clock_out: NaiveDateTime,
    break_minutes: i32,
) -> f64 {
    let worked_minutes = (clock_out - clock_in).num_minutes() - break_minutes as i64;
    let hours = worked_minutes as f64 / 60.0;
    (hours * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn eight_hour_day_is_exactly_eight() {
        let hours = compute_work_hours(dt("2024-01-15 09:00:00"), dt("2024-01-15 17:00:00"), 0);
        assert_eq!(hours, 8.00);
    }

    #[test]
    fn break_time_is_deducted() {
        let hours = compute_work_hours(dt("2024-01-15 09:00:00"), dt("2024-01-15 17:30:00"), 30);
        assert_eq!(hours, 8.00);
    }

    #[test]
    fn partial_hours_round_to_two_decimals() {
        // 7h50m = 7.8333... -> 7.83
        let hours = compute_work_hours(dt("2024-01-15 09:10:00"), dt("2024-01-15 17:00:00"), 0);
        assert_eq!(hours, 7.83);
    }

    #[test]
    fn clock_out_before_clock_in_goes_negative() {
        let hours = compute_work_hours(dt("2024-01-15 17:00:00"), dt("2024-01-15 09:00:00"), 0);
        assert_eq!(hours, -8.00);
    }

    #[test]
    fn status_round_trips_kebab_case() {
        assert_eq!(AttendanceStatus::HalfDay.to_string(), "half-day");
        assert_eq!(AttendanceStatus::OnLeave.to_string(), "on-leave");
        assert_eq!(
            AttendanceStatus::from_str("half-day").unwrap(),
            AttendanceStatus::HalfDay
        );
        assert!(AttendanceStatus::from_str("tardy").is_err());
    }
}
