use crate::api::attendance::{
    AttendanceFilter, AttendanceListResponse, AttendanceStatsResponse, ClockReq, ManualEntryReq,
    WeekdayCount,
};
use crate::api::department::DepartmentReq;
use crate::api::designation::DesignationReq;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::leave_request::{
    ApproveReq, CreateLeave, LeaveFilter, LeaveListResponse, LeaveStatsResponse, RejectReq,
    TypeCount, UpcomingQuery, UpdateLeave,
};
use crate::api::notification::{CreateNotification, NotificationFilter};
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::department::Department;
use crate::model::designation::Designation;
use crate::model::employee::{Employee, EmploymentStatus};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::notification::Notification;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS API",
        version = "1.0.0",
        description = r#"
## Human Resource Management System

This API powers an HRMS backend managing core HR operations within an organization.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles; soft delete with re-hire reactivation
- **Attendance Management**
  - Daily clock-in/clock-out, manual backfill entries, worked-hours tracking, stats
- **Leave Management**
  - Apply for leave, approve/reject with balance deduction, view leave history
- **Departments & Designations**
  - Organization lookup tables
- **Notifications**
  - Per-user notifications

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Only authorized roles such as **Admin** or **HR** can access sensitive operations.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::leave_stats,
        crate::api::leave_request::upcoming_leaves,

        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::manual_entry,
        crate::api::attendance::attendance_list,
        crate::api::attendance::attendance_stats,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::designation::create_designation,
        crate::api::designation::list_designations,
        crate::api::designation::get_designation,
        crate::api::designation::update_designation,
        crate::api::designation::delete_designation,

        crate::api::notification::create_notification,
        crate::api::notification::list_notifications,
        crate::api::notification::mark_read
    ),
    components(
        schemas(
            Attendance,
            AttendanceStatus,
            AttendanceFilter,
            AttendanceListResponse,
            AttendanceStatsResponse,
            ClockReq,
            ManualEntryReq,
            WeekdayCount,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            LeaveFilter,
            LeaveListResponse,
            LeaveStatsResponse,
            TypeCount,
            UpcomingQuery,
            CreateLeave,
            UpdateLeave,
            ApproveReq,
            RejectReq,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            Employee,
            EmploymentStatus,
            Department,
            DepartmentReq,
            Designation,
            DesignationReq,
            Notification,
            CreateNotification,
            NotificationFilter
        )
    ),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department lookup APIs"),
        (name = "Designation", description = "Designation lookup APIs"),
        (name = "Notification", description = "Notification APIs"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
