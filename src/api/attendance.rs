use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::attendance::{Attendance, AttendanceStatus, compute_work_hours};
use crate::utils::resolver;
use actix_web::{HttpResponse, web};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct ClockReq {
    /// Target employee (HR/admin acting on someone else); defaults to the
    /// caller's own employee record.
    #[schema(example = 123)]
    pub employee_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct ManualEntryReq {
    #[schema(example = 123)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-01-01T09:00:00", format = "date-time", value_type = Option<String>)]
    pub clock_in: Option<NaiveDateTime>,
    #[schema(example = "2026-01-01T17:00:00", format = "date-time", value_type = Option<String>)]
    pub clock_out: Option<NaiveDateTime>,
    #[schema(example = "present", value_type = String)]
    pub status: AttendanceStatus,
    pub break_minutes: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    /// Filter by calendar day
    pub date: Option<NaiveDate>,
    #[schema(example = 123)]
    /// Filter by employee ID (ignored for employee-role callers)
    pub employee_id: Option<u64>,
    #[schema(example = "present")]
    /// Filter by attendance status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
    Date(NaiveDate),
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<Attendance>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct WeekdayCount {
    #[schema(example = "Mon")]
    pub day: String,
    #[schema(example = 42)]
    pub present: i64,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceStatsResponse {
    #[schema(example = 42)]
    pub present_today: i64,
    #[schema(example = 8)]
    pub absent_today: i64,
    #[schema(example = 50)]
    pub total_employees: i64,
    #[schema(example = 84)]
    pub attendance_rate: i64,
    pub weekly_stats: Vec<WeekdayCount>,
}

/// Percentage of active employees present today, rounded to the nearest
/// integer. Zero when there are no active employees.
fn attendance_rate(present: i64, total_active: i64) -> i64 {
    if total_active <= 0 {
        return 0;
    }
    ((present as f64 / total_active as f64) * 100.0).round() as i64
}

/// Monday and Sunday of the week containing `today`.
fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Fold per-date counts into one bucket per weekday, Monday first.
fn weekday_counts(rows: &[(NaiveDate, i64)], week_start: NaiveDate) -> Vec<WeekdayCount> {
    (0..7)
        .map(|offset| {
            let day = week_start + Duration::days(offset);
            let present = rows
                .iter()
                .filter(|(d, _)| *d == day)
                .map(|(_, c)| *c)
                .sum();
            WeekdayCount {
                day: WEEKDAY_NAMES[offset as usize].to_string(),
                present,
            }
        })
        .collect()
}

async fn fetch_record(pool: &MySqlPool, id: u64) -> Result<Attendance, ApiError> {
    sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, clock_in, clock_out, break_minutes,
               total_work_hours, status, notes
        FROM attendance
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(ApiError::NotFound("Attendance record"))
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    request_body = ClockReq,
    responses(
        (status = 200, description = "Clocked in successfully", body = Attendance),
        (status = 400, description = "Already clocked in today, or no linked employee profile", body = Object, example = json!({
            "message": "Already clocked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee targeting another employee's record"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: Option<web::Json<ClockReq>>,
) -> Result<HttpResponse, ApiError> {
    let explicit = payload.and_then(|p| p.employee_id);
    let employee_id = resolver::resolve_acting_employee_id(&auth, explicit, pool.get_ref()).await?;

    // The day window is [today 00:00Z, tomorrow 00:00Z): one row per UTC day,
    // keyed by the date column. The unique key on (employee_id, date) is the
    // only guard against concurrent double clock-ins.
    let today = Utc::now().date_naive();
    let now = Utc::now().naive_utc();

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, clock_in, status)
        VALUES (?, ?, ?, 'present')
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .bind(now)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::from_clock_in_insert)?;

    let record = fetch_record(pool.get_ref(), result.last_insert_id()).await?;

    tracing::info!(employee_id, "Clocked in");
    Ok(HttpResponse::Ok().json(record))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-out",
    request_body = ClockReq,
    responses(
        (status = 200, description = "Clocked out successfully", body = Attendance),
        (status = 400, description = "No clock-in record for today, or already clocked out", body = Object, example = json!({
            "message": "No clock-in record found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee targeting another employee's record"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: Option<web::Json<ClockReq>>,
) -> Result<HttpResponse, ApiError> {
    let explicit = payload.and_then(|p| p.employee_id);
    let employee_id = resolver::resolve_acting_employee_id(&auth, explicit, pool.get_ref()).await?;

    let today = Utc::now().date_naive();

    let record = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, clock_in, clock_out, break_minutes,
               total_work_hours, status, notes
        FROM attendance
        WHERE employee_id = ? AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(ApiError::NoClockInRecord)?;

    if record.clock_out.is_some() {
        return Err(ApiError::AlreadyClockedOut);
    }
    let clock_in = record.clock_in.ok_or(ApiError::NoClockInRecord)?;

    let now = Utc::now().naive_utc();
    let hours = compute_work_hours(clock_in, now, record.break_minutes);

    sqlx::query(
        r#"
        UPDATE attendance
        SET clock_out = ?, total_work_hours = ?
        WHERE id = ?
        "#,
    )
    .bind(now)
    .bind(hours)
    .bind(record.id)
    .execute(pool.get_ref())
    .await?;

    let updated = fetch_record(pool.get_ref(), record.id).await?;

    tracing::info!(employee_id, hours, "Clocked out");
    Ok(HttpResponse::Ok().json(updated))
}

/// Manual attendance entry (HR/Admin), for backfilling records outside the
/// clock-in/out sequence.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/manual",
    request_body = ManualEntryReq,
    responses(
        (status = 200, description = "Attendance record created", body = Attendance),
        (status = 400, description = "Record already exists for that employee and date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn manual_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ManualEntryReq>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let break_minutes = payload.break_minutes.unwrap_or(0);
    let hours = match (payload.clock_in, payload.clock_out) {
        (Some(ci), Some(co)) => compute_work_hours(ci, co, break_minutes),
        _ => 0.0,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO attendance
            (employee_id, date, clock_in, clock_out, break_minutes, total_work_hours, status, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.date)
    .bind(payload.clock_in)
    .bind(payload.clock_out)
    .bind(break_minutes)
    .bind(hours)
    .bind(payload.status.to_string())
    .bind(&payload.notes)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        if ApiError::is_duplicate_key(&e) {
            ApiError::Validation(
                "An attendance record already exists for this employee and date".into(),
            )
        } else {
            ApiError::Database(e)
        }
    })?;

    let record = fetch_record(pool.get_ref(), result.last_insert_id()).await?;

    tracing::info!(employee_id = payload.employee_id, date = %payload.date, "Manual attendance entry created");
    Ok(HttpResponse::Ok().json(record))
}

/// Attendance history endpoint. Employee-role callers only see their own
/// records; HR/admin see everything unless they filter.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 400, description = "No linked employee profile"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> Result<HttpResponse, ApiError> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let employee_filter =
        resolver::scope_employee_filter(&auth, query.employee_id, pool.get_ref()).await?;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = employee_filter {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(date) = query.date {
        where_sql.push_str(" AND date = ?");
        args.push(FilterValue::Date(date));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, date, clock_in, clock_out, break_minutes,
               total_work_hours, status, notes
        FROM attendance
        {}
        ORDER BY date DESC, clock_in DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Attendance>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Attendance statistics endpoint (HR/Admin), feeds the dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/stats",
    responses(
        (status = 200, description = "Attendance statistics", body = AttendanceStatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let today = Utc::now().date_naive();

    let present_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE date = ? AND status = 'present'",
    )
    .bind(today)
    .fetch_one(pool.get_ref())
    .await?;

    let total_employees =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE status = 'active'")
            .fetch_one(pool.get_ref())
            .await?;

    // Can go negative if attendance rows exist for non-active employees;
    // inconsistent data is surfaced, not corrected.
    let absent_today = total_employees - present_today;

    let (week_start, week_end) = week_bounds(today);

    let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
        r#"
        SELECT date, COUNT(*)
        FROM attendance
        WHERE date BETWEEN ? AND ? AND status = 'present'
        GROUP BY date
        "#,
    )
    .bind(week_start)
    .bind(week_end)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(AttendanceStatsResponse {
        present_today,
        absent_today,
        total_employees,
        attendance_rate: attendance_rate(present_today, total_employees),
        weekly_stats: weekday_counts(&rows, week_start),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn rate_is_rounded_percentage() {
        assert_eq!(attendance_rate(42, 50), 84);
        assert_eq!(attendance_rate(1, 3), 33);
        assert_eq!(attendance_rate(2, 3), 67);
    }

    #[test]
    fn rate_is_zero_without_active_employees() {
        assert_eq!(attendance_rate(0, 0), 0);
        assert_eq!(attendance_rate(5, 0), 0);
    }

    #[test]
    fn week_bounds_are_monday_to_sunday() {
        // 2024-01-17 is a Wednesday
        let (start, end) = week_bounds(d("2024-01-17"));
        assert_eq!(start, d("2024-01-15"));
        assert_eq!(end, d("2024-01-21"));

        // Monday maps to itself
        let (start, _) = week_bounds(d("2024-01-15"));
        assert_eq!(start, d("2024-01-15"));
    }

    #[test]
    fn weekday_counts_fill_missing_days_with_zero() {
        let rows = vec![(d("2024-01-15"), 10), (d("2024-01-17"), 7)];
        let stats = weekday_counts(&rows, d("2024-01-15"));

        assert_eq!(stats.len(), 7);
        assert_eq!(stats[0].day, "Mon");
        assert_eq!(stats[0].present, 10);
        assert_eq!(stats[1].present, 0);
        assert_eq!(stats[2].present, 7);
        assert_eq!(stats[6].day, "Sun");
    }
}
