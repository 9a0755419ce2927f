use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "annual", value_type = String)]
    pub leave_type: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 3.0)]
    pub total_days: f64,
    pub reason: Option<String>,
    #[schema(example = "pending", value_type = String)]
    pub status: String,
    pub approver_id: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub approved_at: Option<NaiveDateTime>,
    pub approver_comments: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Personal,
    Unpaid,
    Maternity,
    Paternity,
}

impl LeaveType {
    /// Column holding this type's balance counter on the employees table.
    /// Unpaid leave has no counter, so approval skips the deduction.
    pub fn balance_column(&self) -> Option<&'static str> {
        match self {
            LeaveType::Annual => Some("leave_balance_annual"),
            LeaveType::Sick => Some("leave_balance_sick"),
            LeaveType::Personal => Some("leave_balance_personal"),
            LeaveType::Maternity => Some("leave_balance_maternity"),
            LeaveType::Paternity => Some("leave_balance_paternity"),
            LeaveType::Unpaid => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Approved, rejected and cancelled requests never transition again;
    /// only a pending request can be approved, rejected or cancelled.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// Inclusive day count between the two dates. Recomputed on every create
/// and date update; never trusted from caller input. Order-insensitive.
pub fn total_days(start: NaiveDate, end: NaiveDate) -> f64 {
    ((end - start).num_days().abs() + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn three_day_span_counts_both_endpoints() {
        assert_eq!(total_days(d("2024-01-15"), d("2024-01-17")), 3.0);
    }

    #[test]
    fn single_day_leave_is_one_day() {
        assert_eq!(total_days(d("2024-01-15"), d("2024-01-15")), 1.0);
    }

    #[test]
    fn reversed_dates_use_absolute_span() {
        assert_eq!(total_days(d("2024-01-17"), d("2024-01-15")), 3.0);
    }

    #[test]
    fn span_across_month_boundary() {
        assert_eq!(total_days(d("2024-01-30"), d("2024-02-02")), 4.0);
    }

    #[test]
    fn unpaid_leave_has_no_balance_counter() {
        assert_eq!(LeaveType::Unpaid.balance_column(), None);
        assert_eq!(
            LeaveType::Annual.balance_column(),
            Some("leave_balance_annual")
        );
    }

    #[test]
    fn leave_type_round_trips_lowercase() {
        assert_eq!(LeaveType::Maternity.to_string(), "maternity");
        assert_eq!(LeaveType::from_str("sick").unwrap(), LeaveType::Sick);
        assert!(LeaveType::from_str("sabbatical").is_err());
    }

    #[test]
    fn leave_status_round_trips_lowercase() {
        assert_eq!(LeaveStatus::Pending.to_string(), "pending");
        assert_eq!(
            LeaveStatus::from_str("cancelled").unwrap(),
            LeaveStatus::Cancelled
        );
    }

    #[test]
    fn only_pending_can_transition() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
        assert!(LeaveStatus::Cancelled.is_terminal());
    }
}
