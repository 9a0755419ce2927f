use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678",
        "department_id": 10,
        "designation_id": 3,
        "manager_id": null,
        "hire_date": "2024-01-01",
        "leave_date": null,
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    /// Weak references: no cascade, terminating an employee keeps history.
    #[schema(example = 10)]
    pub department_id: Option<u64>,

    #[schema(example = 3)]
    pub designation_id: Option<u64>,

    pub manager_id: Option<u64>,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub hire_date: NaiveDate,

    #[schema(value_type = Option<String>, format = "date")]
    pub leave_date: Option<NaiveDate>,

    #[schema(example = "active")]
    pub status: String,

    pub leave_balance_annual: f64,
    pub leave_balance_sick: f64,
    pub leave_balance_personal: f64,
    pub leave_balance_maternity: f64,
    pub leave_balance_paternity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EmploymentStatus {
    Active,
    Inactive,
    Terminated,
    OnLeave,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn employment_status_round_trips_kebab_case() {
        assert_eq!(EmploymentStatus::OnLeave.to_string(), "on-leave");
        assert_eq!(
            EmploymentStatus::from_str("terminated").unwrap(),
            EmploymentStatus::Terminated
        );
        assert!(EmploymentStatus::from_str("fired").is_err());
    }
}
